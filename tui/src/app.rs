//! Main Application
//!
//! The App owns every component and runs the single event loop:
//! - Terminal input and resize events
//! - Player and chat events, each on its own channel
//! - Internal events (update notice, delayed auto-skip)
//! - The animation tick
//!
//! Every source is converted into an [`AppEvent`] and dispatched by
//! [`App::handle_event`]. Background work never touches UI state; it only
//! posts events.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use dopogoto_core::config::MAX_NICKNAME_CHARS;
use dopogoto_core::video::library;
use dopogoto_core::{
    generate_anon_name, sanitize, Album, AppConfig, AudioOutput, Backdrop, Catalog, ChatClient,
    ChatConfig, ChatEvent, Clip, NicknameStore, Player, PlayerConfig, PlayerEvent, UpdateChecker,
};

use crate::events::AppEvent;
use crate::layout::{Screen, MIN_HEIGHT, MIN_WIDTH};
use crate::queue::{Queue, QueuePosition};
use crate::theme::ThemeRegistry;
use crate::widgets::{
    AlbumList, ChatPanel, ChatView, Controls, ControlsView, HelpBar, ListCursor, PlayState,
    TooSmall, TrackList, VideoPanel,
};

/// Left/Right seek step
const SEEK_STEP: Duration = Duration::from_secs(10);

/// `p` restarts the current track instead when it has played this long
const RESTART_THRESHOLD: Duration = Duration::from_secs(3);

/// Pause between a failed track and the automatic skip
const AUTO_SKIP_DELAY: Duration = Duration::from_secs(2);

const SKIP_NOTICE: &str = "Couldn't load — skipping to next";

/// Release page shown in the update notice
const RELEASES_PAGE: &str = "https://github.com/dangerous-person/dopogoto/releases";

/// Spinner advances once per this many ticks
const SPINNER_DIVISOR: u64 = 6;

const CHANNEL_CAPACITY: usize = 64;

/// Which panel receives navigation keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Albums,
    Tracks,
    Chat,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Albums => Self::Tracks,
            Self::Tracks => Self::Chat,
            Self::Chat => Self::Albums,
        }
    }
}

/// Everything the app is built from.
///
/// [`App::new`] assembles this from the environment; tests assemble it by
/// hand without a terminal or audio device.
pub struct AppParts {
    pub albums: Vec<Album>,
    pub clips: Vec<Clip>,
    pub player: Player,
    pub player_rx: mpsc::Receiver<PlayerEvent>,
    pub chat: ChatClient,
    pub nicknames: NicknameStore,
    pub tick_interval: Duration,
    pub update_check: bool,
    /// Terminal size at startup
    pub size: (u16, u16),
    pub rng: StdRng,
}

/// Main application state
pub struct App {
    // === Core State ===
    running: bool,
    size: (u16, u16),
    /// `None` while the terminal is below the minimum size
    screen: Option<Screen>,
    /// Clip size the current layout was computed for
    layout_video: (u16, u16),

    // === Components ===
    albums: Vec<Album>,
    backdrop: Backdrop,
    /// Built-in clip for the "too small" screen
    fallback: Backdrop,
    player: Player,
    chat: ChatClient,
    nicknames: NicknameStore,
    nickname: String,
    themes: ThemeRegistry,

    // === Panels ===
    focus: Focus,
    album_list: ListCursor,
    track_list: ListCursor,
    chat_panel: ChatPanel,
    controls: Controls,
    queue: Queue,

    // === Timing ===
    tick_interval: Duration,
    anim_tick: u64,
    track_anim: u64,
    /// Bumped on every track start; stale auto-skips compare against it
    skip_generation: u64,

    // === Channels ===
    player_rx: mpsc::Receiver<PlayerEvent>,
    chat_tx: mpsc::Sender<ChatEvent>,
    chat_rx: mpsc::Receiver<ChatEvent>,
    app_tx: mpsc::Sender<AppEvent>,
    app_rx: mpsc::Receiver<AppEvent>,

    update_check: bool,
    rng: StdRng,
}

impl App {
    /// Create the app from environment settings and the audio output.
    ///
    /// Without an output every track fails to attach and is skipped.
    pub fn new(config: &AppConfig, output: Option<&AudioOutput>) -> anyhow::Result<Self> {
        let size = crossterm::terminal::size()?;
        let mut rng = StdRng::from_entropy();

        let (player_tx, player_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let mixer = output.map(|output| output.mixer().clone());
        let player = Player::new(PlayerConfig::default(), mixer, player_tx)?;
        let chat = ChatClient::new(ChatConfig::from_env())?;

        let albums = Catalog::builtin()?.shuffled(&mut rng).albums;
        let clips = library::load_or_builtin(config.clips_dir.as_deref());
        info!(
            albums = albums.len(),
            clips = clips.len(),
            audio = output.is_some(),
            "starting"
        );

        Self::from_parts(AppParts {
            albums,
            clips,
            player,
            player_rx,
            chat,
            nicknames: NicknameStore::new(),
            tick_interval: config.tick_interval,
            update_check: config.update_check,
            size,
            rng,
        })
    }

    pub fn from_parts(parts: AppParts) -> anyhow::Result<Self> {
        let backdrop = Backdrop::new(parts.clips)?;
        let fallback = Backdrop::new(vec![Clip::builtin()?])?;
        let nickname = parts.nicknames.load();
        let first_album_len = parts.albums.first().map_or(0, |album| album.tracks.len());

        let (chat_tx, chat_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (app_tx, app_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let mut app = Self {
            running: true,
            size: parts.size,
            screen: None,
            layout_video: (0, 0),
            album_list: ListCursor::new(parts.albums.len()),
            track_list: ListCursor::new(first_album_len),
            albums: parts.albums,
            backdrop,
            fallback,
            player: parts.player,
            chat: parts.chat,
            nicknames: parts.nicknames,
            nickname,
            themes: ThemeRegistry::new(),
            focus: Focus::Albums,
            chat_panel: ChatPanel::default(),
            controls: Controls::default(),
            queue: Queue::default(),
            tick_interval: parts.tick_interval,
            anim_tick: 0,
            track_anim: 0,
            skip_generation: 0,
            player_rx: parts.player_rx,
            chat_tx,
            chat_rx,
            app_tx,
            app_rx,
            update_check: parts.update_check,
            rng: parts.rng,
        };
        app.controls.volume = app.player.volume_level();
        app.relayout();
        Ok(app)
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut terminal_events = EventStream::new();
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.chat.start(self.chat_tx.clone());
        if self.update_check {
            self.spawn_update_check();
        }

        // Render initial frame immediately so the user sees the UI
        self.render(terminal)?;

        while self.running {
            let mut input_closed = false;
            let event = tokio::select! {
                biased;

                maybe_event = terminal_events.next() => match maybe_event {
                    // Only handle Press events (not Release or Repeat)
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        Some(AppEvent::KeyInput(key))
                    }
                    Some(Ok(Event::Resize(width, height))) => {
                        Some(AppEvent::WindowResized { width, height })
                    }
                    Some(Ok(_)) => None,
                    Some(Err(e)) => {
                        warn!(error = %e, "terminal event error");
                        None
                    }
                    None => {
                        input_closed = true;
                        None
                    }
                },
                Some(event) = self.player_rx.recv() => Some(AppEvent::from(event)),
                Some(event) = self.chat_rx.recv() => Some(AppEvent::from(event)),
                Some(event) = self.app_rx.recv() => Some(event),
                _ = ticker.tick() => Some(AppEvent::Tick),
            };

            if input_closed {
                warn!("terminal input closed");
                self.running = false;
            }
            if let Some(event) = event {
                self.handle_event(event);
            }
            self.render(terminal)?;
        }

        self.shutdown().await;
        Ok(())
    }

    /// Stop the audio and the chat connection.
    pub async fn shutdown(&mut self) {
        info!("shutting down");
        self.player.stop();
        self.chat.stop().await;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn spawn_update_check(&self) {
        let tx = self.app_tx.clone();
        tokio::spawn(async move {
            let checker = match UpdateChecker::new(env!("CARGO_PKG_VERSION")) {
                Ok(checker) => checker,
                Err(e) => {
                    debug!(error = %e, "update check unavailable");
                    return;
                }
            };
            match checker.check().await {
                Ok(Some(version)) => {
                    let _ = tx.send(AppEvent::UpdateAvailable { version }).await;
                }
                Ok(None) => {}
                Err(e) => debug!(error = %e, "update check failed"),
            }
        });
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Buffering { title } => {
                self.controls.state = PlayState::Buffering;
                self.controls.title = title;
            }
            AppEvent::TrackStarted { title, duration } => {
                self.controls.state = PlayState::Playing;
                self.controls.title = title;
                self.controls.duration = duration;
                self.controls.position = Duration::ZERO;
            }
            AppEvent::Progress { position, length } => {
                self.controls.position = position;
                if !length.is_zero() {
                    self.controls.duration = length;
                }
            }
            AppEvent::TrackEnded => self.play_next(),
            AppEvent::Error { message } => {
                warn!(error = %message, "track failed, skipping");
                self.controls.state = PlayState::Stopped;
                self.controls.title = SKIP_NOTICE.to_string();
                self.schedule_skip();
            }
            AppEvent::NewMessages(messages) => {
                self.chat_panel.set_messages(messages);
                self.chat_panel.set_offline(false);
            }
            AppEvent::Offline => self.chat_panel.set_offline(true),
            AppEvent::WindowResized { width, height } => {
                self.size = (width, height);
                self.relayout();
            }
            AppEvent::KeyInput(key) => self.handle_key(key),
            AppEvent::Tick => self.tick(),
            AppEvent::UpdateAvailable { version } => {
                self.chat_panel
                    .add_local("[update]", &format!("{version} available — {RELEASES_PAGE}"));
            }
            AppEvent::AutoSkip { generation } => {
                if generation == self.skip_generation {
                    self.play_next();
                } else {
                    debug!(generation, current = self.skip_generation, "stale auto-skip");
                }
            }
        }
    }

    fn schedule_skip(&self) {
        let generation = self.skip_generation;
        let tx = self.app_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(AUTO_SKIP_DELAY).await;
            let _ = tx.send(AppEvent::AutoSkip { generation }).await;
        });
    }

    fn tick(&mut self) {
        self.backdrop.tick(self.tick_interval);
        if self.screen.is_none() {
            self.fallback.tick(self.tick_interval);
        }

        self.anim_tick += 1;
        if self.anim_tick % SPINNER_DIVISOR == 0 && self.controls.state == PlayState::Playing {
            self.track_anim += 1;
        }

        if self.player.is_playing() && self.controls.state != PlayState::Playing {
            self.controls.state = PlayState::Playing;
        }
        self.controls.volume = self.player.volume_level();

        // The backdrop switches clips on its own; a new clip may be a
        // different size.
        if video_size(&self.backdrop) != self.layout_video {
            self.relayout();
        }
    }

    fn relayout(&mut self) {
        let area = Rect::new(0, 0, self.size.0, self.size.1);
        self.layout_video = video_size(&self.backdrop);
        self.screen = Screen::compute(area, self.layout_video);

        if let Some(screen) = self.screen {
            self.album_list.set_visible(Screen::list_rows(screen.albums));
            self.track_list.set_visible(Screen::list_rows(screen.tracks));
            self.chat_panel.set_size(screen.chat.width, screen.chat.height);
        }
    }

    // =========================================================================
    // Keys
    // =========================================================================

    fn handle_key(&mut self, key: KeyEvent) {
        if self.focus == Focus::Chat {
            self.handle_chat_key(key);
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if ctrl => self.quit(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Up if ctrl => self.navigate(ListCursor::top),
            KeyCode::Down if ctrl => self.navigate(ListCursor::bottom),
            KeyCode::Up | KeyCode::Char('k') => self.navigate(ListCursor::up),
            KeyCode::Down | KeyCode::Char('j') => self.navigate(ListCursor::down),
            KeyCode::Enter => self.enter(),
            KeyCode::Char(' ') => self.toggle_pause(),
            KeyCode::Char('n') => self.play_next(),
            KeyCode::Char('p') => self.play_prev(),
            KeyCode::Char('+' | '=') => {
                self.player.volume_up();
                self.controls.volume = self.player.volume_level();
            }
            KeyCode::Char('-') => {
                self.player.volume_down();
                self.controls.volume = self.player.volume_level();
            }
            KeyCode::Char('s') => self.queue.toggle_shuffle(),
            KeyCode::Char('r') => self.queue.toggle_repeat(),
            KeyCode::Char('t') => {
                let theme = self.themes.cycle();
                debug!(theme = theme.name, "theme changed");
            }
            KeyCode::Char('>') => {
                self.backdrop.next_clip();
                self.relayout();
            }
            KeyCode::Left => {
                let target = self.player.position().saturating_sub(SEEK_STEP);
                self.player.seek(target);
            }
            KeyCode::Right => {
                let target = self.player.position() + SEEK_STEP;
                self.player.seek(target);
            }
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.quit(),
            KeyCode::Esc | KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Up if ctrl => self.chat_panel.scroll_top(),
            KeyCode::Down if ctrl => self.chat_panel.scroll_bottom(),
            KeyCode::Up => self.chat_panel.scroll_up(),
            KeyCode::Down => self.chat_panel.scroll_down(),
            KeyCode::Enter => {
                let text = self.chat_panel.take_input();
                if !text.is_empty() {
                    self.submit_chat(text);
                }
            }
            KeyCode::Backspace => self.chat_panel.backspace(),
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.chat_panel.insert_char(c);
            }
            _ => {}
        }
    }

    /// Handle `/nick` and `/reset`, send anything else.
    fn submit_chat(&mut self, text: String) {
        if let Some(rest) = text.strip_prefix("/nick ") {
            let nickname: String = sanitize(rest.trim())
                .chars()
                .take(MAX_NICKNAME_CHARS)
                .collect();
            if !nickname.is_empty() {
                self.set_nickname(nickname);
            }
            return;
        }
        if text == "/reset" {
            let nickname = generate_anon_name(&mut self.rng);
            self.set_nickname(nickname);
            return;
        }
        self.chat.send_message(self.nickname.clone(), text);
    }

    fn set_nickname(&mut self, nickname: String) {
        info!(nickname = %nickname, "nickname changed");
        self.nickname = nickname.clone();
        let store = self.nicknames.clone();
        tokio::spawn(async move {
            if let Err(e) = store.save(&nickname).await {
                warn!(error = %e, "failed to save nickname");
            }
        });
    }

    fn quit(&mut self) {
        self.running = false;
    }

    fn navigate(&mut self, step: fn(&mut ListCursor)) {
        match self.focus {
            Focus::Albums => {
                let before = self.album_list.cursor();
                step(&mut self.album_list);
                if self.album_list.cursor() != before {
                    self.sync_tracks();
                }
            }
            Focus::Tracks => step(&mut self.track_list),
            Focus::Chat => {}
        }
    }

    /// Point the track list at the album under the album cursor.
    fn sync_tracks(&mut self) {
        let len = self
            .albums
            .get(self.album_list.cursor())
            .map_or(0, |album| album.tracks.len());
        self.track_list.reset(len);
    }

    fn enter(&mut self) {
        match self.focus {
            Focus::Albums => self.focus = self.focus.next(),
            Focus::Tracks => {
                if !self.track_list.is_empty() {
                    let position =
                        QueuePosition::new(self.album_list.cursor(), self.track_list.cursor());
                    self.play_track(position);
                }
            }
            Focus::Chat => {}
        }
    }

    fn toggle_pause(&mut self) {
        match self.controls.state {
            PlayState::Stopped | PlayState::Buffering => {}
            PlayState::Playing | PlayState::Paused => {
                self.controls.state = if self.player.toggle_pause() {
                    PlayState::Playing
                } else {
                    PlayState::Paused
                };
            }
        }
    }

    // =========================================================================
    // Playback
    // =========================================================================

    fn play_track(&mut self, position: QueuePosition) {
        let Some(track) = self
            .albums
            .get(position.album)
            .and_then(|album| album.tracks.get(position.track))
        else {
            return;
        };
        let (url, title) = (track.url.clone(), track.title.clone());

        if self.album_list.cursor() != position.album {
            self.album_list.select(position.album);
            self.sync_tracks();
        }
        self.track_list.select(position.track);
        self.queue.set_current(Some(position));
        self.skip_generation += 1;

        self.controls.state = PlayState::Buffering;
        self.controls.title = title.clone();
        self.controls.album_color = Some(self.themes.current().album_color(position.album));
        self.controls.position = Duration::ZERO;
        self.controls.duration = Duration::ZERO;

        info!(album = position.album, track = position.track, title = %title, "play");
        self.player.play_url(&url, &title);
    }

    fn play_next(&mut self) {
        if self.queue.current().is_none() {
            return;
        }
        match self.queue.next(&self.albums, &mut self.rng) {
            Some(position) => self.play_track(position),
            None => {
                info!("end of catalog");
                self.player.stop();
                self.queue.set_current(None);
                self.controls.state = PlayState::Stopped;
                self.controls.title.clear();
                self.controls.position = Duration::ZERO;
                self.controls.duration = Duration::ZERO;
            }
        }
    }

    fn play_prev(&mut self) {
        if self.queue.current().is_none() {
            return;
        }
        if self.player.position() > RESTART_THRESHOLD {
            self.player.seek(Duration::ZERO);
            return;
        }
        if let Some(position) = self.queue.previous(&self.albums) {
            self.play_track(position);
        }
    }

    /// Row of the playing track, when its album is the one on screen.
    fn playing_track(&self) -> Option<usize> {
        self.queue
            .current()
            .filter(|position| position.album == self.album_list.cursor())
            .map(|position| position.track)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        terminal.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    /// Draw the whole screen into `frame`.
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if (area.width, area.height) != self.size {
            self.size = (area.width, area.height);
            self.relayout();
        }

        let theme = self.themes.current();
        frame.render_widget(Block::new().style(Style::new().bg(theme.bg)), area);

        let Some(screen) = self.screen else {
            frame.render_widget(
                TooSmall::new(&mut self.fallback, theme, (MIN_WIDTH, MIN_HEIGHT)),
                area,
            );
            return;
        };

        frame.render_widget(VideoPanel::new(&mut self.backdrop, theme), screen.video);
        frame.render_widget(
            ChatView::new(&self.chat_panel, theme).focused(self.focus == Focus::Chat),
            screen.chat,
        );
        frame.render_widget(
            AlbumList::new(&self.albums, &self.album_list, theme)
                .focused(self.focus == Focus::Albums),
            screen.albums,
        );
        frame.render_widget(
            TrackList::new(self.albums.get(self.album_list.cursor()), &self.track_list, theme)
                .playing(self.playing_track(), self.track_anim)
                .focused(self.focus == Focus::Tracks),
            screen.tracks,
        );
        frame.render_widget(ControlsView::new(&self.controls, theme), screen.controls);
        frame.render_widget(
            HelpBar::new(theme)
                .state(self.controls.state)
                .modes(self.queue.shuffle(), self.queue.repeat())
                .volume(self.controls.volume),
            screen.help,
        );
    }
}

fn video_size(backdrop: &Backdrop) -> (u16, u16) {
    let clamp = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
    (clamp(backdrop.width()), clamp(backdrop.height()))
}

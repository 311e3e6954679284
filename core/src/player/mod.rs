//! Audio Player
//!
//! Streams MP3 tracks from HTTP into the audio output.
//!
//! # Loading a track
//!
//! [`Player::play_url`] returns immediately. A background task downloads the
//! file, decodes it on the blocking pool and attaches it to the output
//! mixer. Starting another track, or [`Player::stop`], cancels a load that is
//! still in flight; a cancelled load reports nothing.
//!
//! # Locking
//!
//! The active sink and its pause flag sit behind one mutex. Attaching,
//! detaching and position reads all take it, so the position poller can
//! never read a sink that `stop` has already released.

mod cancel;
mod decode;
mod download;
mod volume;

pub use cancel::{CancellationSource, CancellationToken};
pub use decode::probe_duration;
pub use download::encode_url;
pub use volume::{Volume, MAX_VOLUME, MIN_VOLUME};

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rodio::mixer::Mixer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use decode::LoadedTrack;

// =============================================================================
// Events and Errors
// =============================================================================

/// Events emitted by the player
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    /// A track load began
    Buffering { title: String },
    /// A track is attached and playing
    TrackStarted { title: String, duration: Duration },
    /// Periodic position report
    Progress { position: Duration, length: Duration },
    /// The current track played to its end
    TrackEnded,
    /// The track could not be loaded
    Error { message: String },
}

/// Track loading and output failures
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The track URL does not parse
    #[error("invalid track url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Network failure or download timeout
    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server did not answer 200
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The payload exceeds the download cap
    #[error("file too large (over {} MB)", .limit >> 20)]
    TooLarge { limit: usize },

    /// The container could not be probed
    #[error("could not read mp3: {0}")]
    Probe(#[from] symphonia::core::errors::Error),

    /// The audio stream could not be decoded
    #[error("decode mp3: {0}")]
    Decode(String),

    /// No usable audio output
    #[error("audio output unavailable: {0}")]
    Output(String),

    /// The decode task panicked or was aborted
    #[error("decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// =============================================================================
// Configuration
// =============================================================================

/// Player configuration
#[derive(Clone, Debug)]
pub struct PlayerConfig {
    /// Largest accepted download
    pub max_download_bytes: usize,
    /// Whole-request timeout for a download
    pub download_timeout: Duration,
    /// Interval between progress reports
    pub poll_interval: Duration,
    /// Starting volume on the `[-5, 0]` scale
    pub initial_volume: f64,
    /// Volume change per step
    pub volume_step: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_download_bytes: 50 << 20,
            download_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(500),
            initial_volume: -1.0,
            volume_step: 0.5,
        }
    }
}

impl PlayerConfig {
    #[must_use]
    pub fn with_max_download_bytes(mut self, bytes: usize) -> Self {
        self.max_download_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

// =============================================================================
// Output Device
// =============================================================================

/// The system audio output. Keep it alive for as long as anything plays.
///
/// The underlying stream is not `Send`; it stays on the thread that opened
/// it and hands out its [`Mixer`] instead.
pub struct AudioOutput {
    stream: OutputStream,
}

impl AudioOutput {
    /// Open the default output device.
    pub fn open() -> Result<Self, PlayerError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::Output(e.to_string()))?;
        // The drop message goes to stderr, which belongs to the UI.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }

    pub fn mixer(&self) -> &Mixer {
        self.stream.mixer()
    }
}

// =============================================================================
// Player
// =============================================================================

#[derive(Default)]
struct Session {
    sink: Option<Sink>,
    length: Duration,
    paused: bool,
    download: Option<CancellationSource>,
    poll: Option<CancellationSource>,
}

struct Inner {
    config: PlayerConfig,
    http: reqwest::Client,
    mixer: Option<Mixer>,
    events: mpsc::Sender<PlayerEvent>,
    session: Mutex<Session>,
    volume: Mutex<Volume>,
}

/// Handle to the audio player. Cheap to clone.
#[derive(Clone)]
pub struct Player {
    inner: Arc<Inner>,
}

impl Player {
    /// Create a player. Without a mixer every track fails with
    /// [`PlayerError::Output`] once decoded.
    pub fn new(
        config: PlayerConfig,
        mixer: Option<Mixer>,
        events: mpsc::Sender<PlayerEvent>,
    ) -> Result<Self, PlayerError> {
        let http = reqwest::Client::builder()
            .timeout(config.download_timeout)
            .build()?;
        let volume = Volume::new(config.initial_volume, config.volume_step);
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                http,
                mixer,
                events,
                session: Mutex::new(Session::default()),
                volume: Mutex::new(volume),
            }),
        })
    }

    /// Stop whatever plays and start loading `url` in the background.
    ///
    /// Must be called within a tokio runtime.
    pub fn play_url(&self, url: &str, title: &str) {
        self.stop();

        let source = CancellationSource::new();
        let token = source.token();
        self.inner.session.lock().download = Some(source);

        let inner = Arc::clone(&self.inner);
        let url = url.to_string();
        let title = title.to_string();
        tokio::spawn(async move { inner.load(url, title, token).await });
    }

    /// Cancel any load, detach the sink and end progress reports.
    pub fn stop(&self) {
        let mut session = self.inner.session.lock();
        if let Some(download) = session.download.take() {
            download.cancel();
        }
        if let Some(poll) = session.poll.take() {
            poll.cancel();
        }
        if let Some(sink) = session.sink.take() {
            sink.stop();
            debug!("track stopped");
        }
        session.paused = false;
        session.length = Duration::ZERO;
    }

    /// Pause or resume. Returns whether audio is playing afterwards.
    pub fn toggle_pause(&self) -> bool {
        let mut session = self.inner.session.lock();
        let Some(sink) = session.sink.as_ref() else {
            return false;
        };
        if session.paused {
            sink.play();
        } else {
            sink.pause();
        }
        session.paused = !session.paused;
        !session.paused
    }

    /// Seek within the current track, clamped to `[0, length)`.
    pub fn seek(&self, position: Duration) {
        let session = self.inner.session.lock();
        let Some(sink) = session.sink.as_ref() else {
            return;
        };
        let target = clamp_position(position, session.length);
        if let Err(e) = sink.try_seek(target) {
            warn!(error = %e, position = ?target, "seek failed");
        }
    }

    pub fn volume_up(&self) -> f64 {
        self.change_volume(Volume::up)
    }

    pub fn volume_down(&self) -> f64 {
        self.change_volume(Volume::down)
    }

    fn change_volume(&self, change: fn(&mut Volume) -> f64) -> f64 {
        let session = self.inner.session.lock();
        let mut volume = self.inner.volume.lock();
        let level = change(&mut volume);
        if let Some(sink) = session.sink.as_ref() {
            sink.set_volume(volume.gain());
        }
        level
    }

    /// Volume on the `0..=10` display scale.
    pub fn volume_level(&self) -> u8 {
        self.inner.volume.lock().display_level()
    }

    pub fn position(&self) -> Duration {
        let session = self.inner.session.lock();
        session.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos)
    }

    pub fn is_playing(&self) -> bool {
        let session = self.inner.session.lock();
        session.sink.as_ref().is_some_and(|sink| !session.paused && !sink.empty())
    }

    /// Whether a decoded track is attached to the output.
    pub fn has_stream(&self) -> bool {
        self.inner.session.lock().sink.is_some()
    }

    /// Whether a track is still being downloaded or decoded.
    pub fn is_loading(&self) -> bool {
        self.inner.session.lock().download.is_some()
    }
}

/// `position` limited to `[0, length)`.
pub fn clamp_position(position: Duration, length: Duration) -> Duration {
    if length.is_zero() {
        return Duration::ZERO;
    }
    position.min(length.saturating_sub(Duration::from_millis(1)))
}

impl Inner {
    async fn emit(&self, event: PlayerEvent) {
        // A closed receiver means the UI is gone.
        let _ = self.events.send(event).await;
    }

    /// Forget the download source of the load owning `token`. A newer load
    /// keeps its own.
    fn finish_download(&self, token: &CancellationToken) {
        let mut session = self.session.lock();
        if session
            .download
            .as_ref()
            .is_some_and(|source| source.issued(token))
        {
            session.download = None;
        }
    }

    async fn load(self: Arc<Self>, url: String, title: String, token: CancellationToken) {
        // Superseded before it ran; the newer load reports instead.
        if token.is_cancelled() {
            return;
        }
        self.emit(PlayerEvent::Buffering {
            title: title.clone(),
        })
        .await;

        let loaded = tokio::select! {
            () = token.cancelled() => {
                debug!(title = %title, "track load cancelled");
                return;
            }
            result = self.fetch_and_decode(&url, &token) => result,
        };

        let track = match loaded {
            Ok(Some(track)) => track,
            Ok(None) => return,
            Err(e) => {
                self.finish_download(&token);
                if !token.is_cancelled() {
                    warn!(error = %e, url = %url, "track failed to load");
                    self.emit(PlayerEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
                }
                return;
            }
        };

        let duration = track.duration;
        let poll_token = match self.attach(track, &token) {
            Ok(Some(poll_token)) => poll_token,
            Ok(None) => return,
            Err(e) => {
                self.finish_download(&token);
                warn!(error = %e, "could not start track");
                self.emit(PlayerEvent::Error {
                    message: e.to_string(),
                })
                .await;
                return;
            }
        };

        info!(title = %title, duration = ?duration, "track started");
        self.emit(PlayerEvent::TrackStarted { title, duration }).await;
        tokio::spawn(Arc::clone(&self).poll(poll_token));
    }

    /// Download and decode. `Ok(None)` means the load was cancelled.
    async fn fetch_and_decode(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<Option<LoadedTrack>, PlayerError> {
        let url = download::encode_url(url)?;
        let data = download::fetch(&self.http, url, self.config.max_download_bytes).await?;
        if token.is_cancelled() {
            return Ok(None);
        }

        let track = tokio::task::spawn_blocking(move || decode::decode(data)).await??;
        if token.is_cancelled() {
            return Ok(None);
        }
        Ok(Some(track))
    }

    /// Attach `track` as the only active sink, unless the load was cancelled
    /// meanwhile. Returns the token of the new progress poller.
    fn attach(
        &self,
        track: LoadedTrack,
        token: &CancellationToken,
    ) -> Result<Option<CancellationToken>, PlayerError> {
        let mut session = self.session.lock();
        // `stop` cancels under this lock, so the check cannot race it.
        if token.is_cancelled() {
            return Ok(None);
        }
        let mixer = self
            .mixer
            .as_ref()
            .ok_or_else(|| PlayerError::Output("no output device".to_string()))?;

        if let Some(old) = session.sink.take() {
            old.stop();
        }
        let sink = Sink::connect_new(mixer);
        sink.set_volume(self.volume.lock().gain());
        sink.append(track.source);

        let poll = CancellationSource::new();
        let poll_token = poll.token();
        session.sink = Some(sink);
        session.length = track.duration;
        session.paused = false;
        session.download = None;
        session.poll = Some(poll);
        Ok(Some(poll_token))
    }

    async fn poll(self: Arc<Self>, token: CancellationToken) {
        let period = self.config.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = token.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let report = {
                let mut session = self.session.lock();
                if token.is_cancelled() {
                    return;
                }
                match session.sink.as_ref() {
                    None => return,
                    // The poll source stays so a `stop` or `play_url` racing
                    // this report still cancels it.
                    Some(sink) if sink.empty() => {
                        session.sink = None;
                        None
                    }
                    Some(sink) => Some(PlayerEvent::Progress {
                        position: sink.get_pos(),
                        length: session.length,
                    }),
                }
            };
            if token.is_cancelled() {
                return;
            }

            match report {
                Some(progress) => self.emit(progress).await,
                None => {
                    debug!("track ended");
                    self.emit(PlayerEvent::TrackEnded).await;
                    return;
                }
            }
        }
    }
}

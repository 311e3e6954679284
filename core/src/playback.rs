//! Backdrop Playback
//!
//! Drives a set of clips on a virtual clock and loops through them forever
//! in shuffled order.
//!
//! Each clip advances one frame per `1 / fps` of accumulated time. When a
//! clip runs out of frames the next clip in the playlist starts from frame 0.
//! The playlist is a random permutation of the clips, redrawn once it has been
//! walked through, so a clip may repeat across permutation boundaries.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::video::{Clip, ColorRun, Decoder, RenderMode};

/// Frame rate assumed for clips that declare none
pub const DEFAULT_FPS: u32 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("no video clips available")]
    NoClips,
}

/// Self-looping video backdrop
pub struct Backdrop {
    clips: Vec<Clip>,
    order: Vec<usize>,
    order_pos: usize,
    current: usize,
    frame: usize,
    frame_time: Duration,
    frame_duration: Duration,
    rng: StdRng,
}

impl Backdrop {
    /// Create a backdrop with an entropy-seeded playlist.
    pub fn new(clips: Vec<Clip>) -> Result<Self, PlaybackError> {
        Self::with_rng(clips, StdRng::from_entropy())
    }

    /// Create a backdrop with a caller-provided RNG (deterministic playlists).
    pub fn with_rng(clips: Vec<Clip>, rng: StdRng) -> Result<Self, PlaybackError> {
        if clips.is_empty() {
            return Err(PlaybackError::NoClips);
        }
        let mut backdrop = Self {
            clips,
            order: Vec::new(),
            order_pos: 0,
            current: 0,
            frame: 0,
            frame_time: Duration::ZERO,
            frame_duration: Duration::ZERO,
            rng,
        };
        backdrop.reshuffle();
        backdrop.pick_clip();
        Ok(backdrop)
    }

    fn reshuffle(&mut self) {
        self.order = (0..self.clips.len()).collect();
        self.order.shuffle(&mut self.rng);
        self.order_pos = 0;
    }

    fn pick_clip(&mut self) {
        if self.order_pos >= self.order.len() {
            self.reshuffle();
        }
        self.current = self.order[self.order_pos];
        self.order_pos += 1;

        self.frame = 0;
        self.frame_time = Duration::ZERO;

        let clip = &mut self.clips[self.current];
        let fps = match clip.decoder.fps() {
            0 => DEFAULT_FPS,
            fps => fps,
        };
        self.frame_duration = Duration::from_secs_f64(1.0 / f64::from(fps));
        clip.decoder.apply_frame(0);
    }

    /// Skip to the next clip in the playlist.
    pub fn next_clip(&mut self) {
        self.pick_clip();
    }

    /// Advance the virtual clock by `delta`.
    pub fn tick(&mut self, delta: Duration) {
        self.frame_time += delta;

        while self.frame_time >= self.frame_duration {
            self.frame_time -= self.frame_duration;
            self.frame += 1;

            let decoder = &mut self.clips[self.current].decoder;
            if self.frame >= decoder.total_frames() {
                self.next_clip();
                return;
            }
            decoder.apply_frame(self.frame);
        }
    }

    /// Render the current frame as ANSI text.
    pub fn render(&mut self, max_width: usize, max_height: usize, mode: RenderMode) -> String {
        let clip = &mut self.clips[self.current];
        clip.renderer
            .render(&clip.decoder, max_width, max_height, mode)
    }

    /// Render the current frame as rows of color runs.
    pub fn render_runs(
        &mut self,
        max_width: usize,
        max_height: usize,
        mode: RenderMode,
    ) -> Vec<Vec<ColorRun>> {
        let clip = &mut self.clips[self.current];
        clip.renderer
            .render_runs(&clip.decoder, max_width, max_height, mode)
    }

    pub fn current_clip(&self) -> &Clip {
        &self.clips[self.current]
    }

    pub fn decoder(&self) -> &Decoder {
        &self.current_clip().decoder
    }

    pub fn clip_index(&self) -> usize {
        self.current
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Native width of the current clip
    pub fn width(&self) -> usize {
        self.decoder().width()
    }

    /// Native height of the current clip
    pub fn height(&self) -> usize {
        self.decoder().height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn clip(name: &str, fps: u32, frames: usize) -> Clip {
        let mut body = vec!["[1,0,0,2]".to_string()];
        body.extend((1..frames).map(|i| format!("[0,0,0,{}]", i)));
        let doc = format!(
            r##"{{"v":1,"w":2,"h":1,"fps":{fps},"chars":"x","palette":["#ffffff"],"frames":[{}]}}"##,
            body.join(",")
        );
        Clip::from_bytes(name, doc.as_bytes()).expect("valid clip")
    }

    fn seeded(clips: Vec<Clip>) -> Backdrop {
        Backdrop::with_rng(clips, StdRng::seed_from_u64(42)).unwrap()
    }

    #[test]
    fn test_empty_clip_list_rejected() {
        assert_eq!(
            Backdrop::new(Vec::new()).err(),
            Some(PlaybackError::NoClips)
        );
    }

    #[test]
    fn test_advances_one_frame_per_period() {
        let mut b = seeded(vec![clip("a", 10, 5)]);
        assert_eq!(b.frame_index(), 0);

        b.tick(Duration::from_millis(50));
        assert_eq!(b.frame_index(), 0);
        b.tick(Duration::from_millis(50));
        assert_eq!(b.frame_index(), 1);
        b.tick(Duration::from_millis(250));
        assert_eq!(b.frame_index(), 3);
        // Delta for frame 3 wrote color 3 into cell 0.
        assert_eq!(b.decoder().buffer()[0].color_idx, 3);
    }

    #[test]
    fn test_zero_fps_defaults_to_thirty() {
        let mut b = seeded(vec![clip("a", 0, 10)]);
        b.tick(Duration::from_millis(34));
        assert_eq!(b.frame_index(), 1);
    }

    #[test]
    fn test_rolls_over_to_next_clip() {
        let mut b = seeded(vec![clip("a", 10, 3), clip("b", 10, 3)]);
        let first = b.clip_index();
        b.tick(Duration::from_millis(300));
        assert_ne!(b.clip_index(), first);
        assert_eq!(b.frame_index(), 0);
        // New clip starts from its keyframe.
        assert_eq!(b.decoder().buffer()[0].color_idx, 0);
    }

    #[test]
    fn test_every_clip_plays_once_per_permutation() {
        let clips = (0..4).map(|i| clip(&format!("c{i}"), 10, 2)).collect();
        let mut b = seeded(clips);
        let mut seen = vec![b.clip_index()];
        for _ in 0..3 {
            b.next_clip();
            seen.push(b.clip_index());
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_single_clip_loops() {
        let mut b = seeded(vec![clip("solo", 10, 2)]);
        for _ in 0..10 {
            b.tick(Duration::from_millis(100));
        }
        assert_eq!(b.clip_index(), 0);
        assert!(b.frame_index() < 2);
    }

    #[test]
    fn test_render_uses_current_clip() {
        let mut b = seeded(vec![clip("a", 10, 1)]);
        assert_eq!(b.render(0, 0, RenderMode::Normal), "\x1b[38;5;231mxx\x1b[0m");
    }
}

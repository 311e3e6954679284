//! Volume scale
//!
//! Volume is an exponent on a base-2 gain: `-5.0` is 1/32 amplitude, `0.0`
//! is unity. The UI shows it as an integer from 0 to 10.

pub const MIN_VOLUME: f64 = -5.0;
pub const MAX_VOLUME: f64 = 0.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Volume {
    level: f64,
    step: f64,
}

impl Volume {
    pub fn new(level: f64, step: f64) -> Self {
        Self {
            level: level.clamp(MIN_VOLUME, MAX_VOLUME),
            step: step.abs(),
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn up(&mut self) -> f64 {
        self.level = (self.level + self.step).min(MAX_VOLUME);
        self.level
    }

    pub fn down(&mut self) -> f64 {
        self.level = (self.level - self.step).max(MIN_VOLUME);
        self.level
    }

    /// Amplitude multiplier for the output sink.
    pub fn gain(&self) -> f32 {
        2f32.powf(self.level as f32)
    }

    /// `0..=10` display level.
    pub fn display_level(&self) -> u8 {
        ((self.level - MIN_VOLUME) * 2.0) as u8
    }
}

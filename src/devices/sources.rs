//! Source devices: switches, clocks and signal generators.
//!
//! Sources have no inputs. Each cycle they report a level; the owning
//! [`Device`](super::Device) turns a change of level into an edge marker.

/// A manually set level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub state: bool,
}

impl Switch {
    pub fn new(state: bool) -> Self {
        Self { state }
    }

    pub fn set(&mut self, state: bool) {
        self.state = state;
    }
}

/// Square wave toggling every `half_period` cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    half_period: u32,
    countdown: u32,
    high: bool,
}

impl Clock {
    /// Create a clock starting LOW. `half_period` must be at least 1.
    pub fn new(half_period: u32) -> Self {
        let half_period = half_period.max(1);
        Self {
            half_period,
            countdown: half_period,
            high: false,
        }
    }

    pub fn half_period(&self) -> u32 {
        self.half_period
    }

    /// Cycles left before the next toggle.
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Advance one cycle and return the level for it.
    pub fn tick(&mut self) -> bool {
        self.countdown -= 1;
        if self.countdown == 0 {
            self.high = !self.high;
            self.countdown = self.half_period;
        }
        self.high
    }

    /// Return to LOW with a full countdown.
    pub fn reset(&mut self) {
        self.countdown = self.half_period;
        self.high = false;
    }
}

/// Replays a fixed bit pattern, one bit per cycle, wrapping around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Siggen {
    waveform: Vec<bool>,
    cursor: usize,
}

impl Siggen {
    /// Create a generator. `waveform` must not be empty.
    pub fn new(waveform: Vec<bool>) -> Self {
        debug_assert!(!waveform.is_empty());
        Self {
            waveform,
            cursor: 0,
        }
    }

    /// Parse a run of `0`/`1` digits.
    pub fn from_bits(bits: &str) -> Option<Self> {
        if bits.is_empty() {
            return None;
        }
        bits.chars()
            .map(|c| match c {
                '0' => Some(false),
                '1' => Some(true),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Self::new)
    }

    pub fn waveform(&self) -> &[bool] {
        &self.waveform
    }

    pub fn tick(&mut self) -> bool {
        let bit = self.waveform[self.cursor];
        self.cursor = (self.cursor + 1) % self.waveform.len();
        bit
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

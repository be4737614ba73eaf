//! LED fade engine
//!
//! Moves the ring color from its previous target to a new one over a
//! requested duration. Channels that rise and channels that fall are
//! animated in separate phases:
//!
//! ```text
//!   request ──► Rising ──(elapsed ≥ d/2)──► Falling ──(elapsed ≥ d/2)──► Idle
//!                 (two-phase: some channels rise, others fall)
//!
//!   request ──► Rising or Falling ──(elapsed ≥ d)──► Idle
//!                 (single-phase: every changing channel moves the same way)
//! ```
//!
//! The engine is driven by calling [`Fader::update`] with a millisecond
//! timestamp; it writes interpolated levels to a [`LightOutput`]. Timing
//! and waiting are the caller's business, which keeps this testable.

use crate::lighting::{set_rgb, FadeRequest};
use crate::traits::{LightChannel, LightOutput};
use crate::Rgb;

/// Current activity of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FadeState {
    /// No transition in progress
    Idle,
    /// Moving channels whose target is above their last value
    Rising,
    /// Moving channels whose target is below their last value
    Falling,
}

/// Fade state machine
#[derive(Debug, Clone)]
pub struct Fader {
    last: Rgb,
    target: Rgb,
    state: FadeState,
    two_phase: bool,
    phase_start_ms: u32,
    phase_duration_ms: u32,
}

impl Default for Fader {
    fn default() -> Self {
        Self::new()
    }
}

impl Fader {
    /// Create an idle engine with the ring off
    pub const fn new() -> Self {
        Self {
            last: Rgb::OFF,
            target: Rgb::OFF,
            state: FadeState::Idle,
            two_phase: false,
            phase_start_ms: 0,
            phase_duration_ms: 0,
        }
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != FadeState::Idle
    }

    /// Color the current (or last) transition ends at
    pub fn target(&self) -> Rgb {
        self.target
    }

    /// Begin a transition
    ///
    /// The previous target becomes the starting color, so a request that
    /// arrives mid-fade redirects from where the last fade was heading
    /// rather than from the color currently shown.
    pub fn start(&mut self, request: FadeRequest, now_ms: u32) {
        self.last = self.target;
        self.target = request.color;

        let pairs = self.last.channels().into_iter().zip(self.target.channels());
        let rising = pairs.clone().any(|(from, to)| to > from);
        let falling = pairs.into_iter().any(|(from, to)| to < from);

        self.two_phase = rising && falling;
        self.state = if rising {
            FadeState::Rising
        } else {
            FadeState::Falling
        };
        self.phase_duration_ms = request.duration_ms as u32;
        if self.two_phase {
            self.phase_duration_ms /= 2;
        }
        self.phase_start_ms = now_ms;
    }

    /// Advance the transition to `now_ms` and write the result
    ///
    /// Returns the state after the update.
    pub fn update<O: LightOutput>(&mut self, now_ms: u32, output: &mut O) -> FadeState {
        if self.state == FadeState::Idle {
            return self.state;
        }

        let elapsed = now_ms.wrapping_sub(self.phase_start_ms);
        if elapsed < self.phase_duration_ms {
            self.write_phase(elapsed, output);
        } else if self.two_phase && self.state == FadeState::Rising {
            self.state = FadeState::Falling;
            self.phase_start_ms = now_ms;
        } else {
            self.last = self.target;
            set_rgb(output, self.target);
            self.state = FadeState::Idle;
        }

        self.state
    }

    /// Write the channels that move in the current phase
    fn write_phase<O: LightOutput>(&self, elapsed: u32, output: &mut O) {
        let channels = LightChannel::RGB
            .into_iter()
            .zip(self.last.channels())
            .zip(self.target.channels());

        for ((channel, from), to) in channels {
            let moves = match self.state {
                FadeState::Rising => from < to,
                FadeState::Falling => from > to,
                FadeState::Idle => false,
            };
            if moves {
                output.set_channel(channel, lerp(from, to, elapsed, self.phase_duration_ms));
            }
        }
    }
}

/// Linear interpolation at `elapsed / duration`, clamped to the endpoints
fn lerp(from: u8, to: u8, elapsed: u32, duration: u32) -> u8 {
    if duration == 0 || elapsed >= duration {
        return to;
    }
    let delta = to as i32 - from as i32;
    // elapsed < duration <= u16::MAX, so the product fits in i32
    (from as i32 + delta * elapsed as i32 / duration as i32) as u8
}

//! Lighting zones and notification sequences

use crate::traits::{LightChannel, LightOutput};
use crate::Rgb;

/// Request for the fade engine: go to `color` over `duration_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FadeRequest {
    pub color: Rgb,
    pub duration_ms: u16,
}

impl FadeRequest {
    pub const fn new(color: Rgb, duration_ms: u16) -> Self {
        Self { color, duration_ms }
    }

    /// Jump to `color` with no fade
    pub const fn immediate(color: Rgb) -> Self {
        Self::new(color, 0)
    }
}

/// Target color and transition time of one lighting zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Zone {
    pub color: Rgb,
    pub delay_ms: u16,
}

impl Zone {
    /// Fade request equivalent to this zone's settings
    pub fn request(&self) -> FadeRequest {
        FadeRequest::new(self.color, self.delay_ms)
    }
}

/// The portal's three lighting zones
///
/// Only `left` drives the ring LEDs. `right` and `trap` are recorded for
/// hosts that read them back but are not animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Zones {
    pub left: Zone,
    pub right: Zone,
    pub trap: Zone,
}

/// One step of a notification sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifyStep {
    /// Set a channel level
    Level(LightChannel, u8),
    /// Suppress the output's idle auto-reset
    KeepAwake,
}

/// Applied when the portal is created
pub const STARTUP_SEQUENCE: &[NotifyStep] = &[
    NotifyStep::Level(LightChannel::Backlight, 0xFF),
    NotifyStep::KeepAwake,
    NotifyStep::Level(LightChannel::Red, 0),
    NotifyStep::Level(LightChannel::Blue, 0),
    NotifyStep::Level(LightChannel::Green, 0),
    NotifyStep::KeepAwake,
];

/// Applied when the portal is torn down
pub const TEARDOWN_SEQUENCE: &[NotifyStep] = &[
    NotifyStep::Level(LightChannel::Red, 0),
    NotifyStep::Level(LightChannel::Green, 0),
    NotifyStep::Level(LightChannel::Blue, 0),
    NotifyStep::Level(LightChannel::Backlight, 0xFF),
];

/// Play a notification sequence on an output
pub fn apply_sequence<O: LightOutput>(output: &mut O, sequence: &[NotifyStep]) {
    for step in sequence {
        match *step {
            NotifyStep::Level(channel, level) => output.set_channel(channel, level),
            NotifyStep::KeepAwake => output.keep_awake(),
        }
    }
}

/// Set all three ring channels at once
pub fn set_rgb<O: LightOutput>(output: &mut O, color: Rgb) {
    for (channel, level) in LightChannel::RGB.into_iter().zip(color.channels()) {
        output.set_channel(channel, level);
    }
}

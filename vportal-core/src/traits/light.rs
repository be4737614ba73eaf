//! Lighting traits

use crate::lighting::FadeRequest;

/// Individually addressable light outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightChannel {
    Red,
    Green,
    Blue,
    /// Display backlight
    Backlight,
}

impl LightChannel {
    /// The three ring color channels in R, G, B order
    pub const RGB: [LightChannel; 3] = [LightChannel::Red, LightChannel::Green, LightChannel::Blue];
}

/// Trait for light hardware
///
/// Implementations that do not drive a given channel should ignore it.
pub trait LightOutput {
    /// Set a channel to a level (0 = off, 255 = full)
    fn set_channel(&mut self, channel: LightChannel, level: u8);

    /// Keep the output from being reset by an idle timeout
    ///
    /// Default is a no-op for outputs without auto-reset.
    fn keep_awake(&mut self) {}
}

/// Sending side of the link to the LED fade engine
///
/// The dispatcher hands over a complete request; the engine picks up the
/// latest one on its own schedule.
pub trait LedLink {
    /// Ask the engine to fade toward a new color
    fn request(&mut self, request: FadeRequest);
}

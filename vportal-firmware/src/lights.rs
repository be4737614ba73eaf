//! PWM light outputs
//!
//! Ring LEDs and backlight are driven by RP2040 PWM slices with `top = 255`,
//! so a compare value equals the channel level.

use embassy_rp::pwm::{Config as PwmConfig, Pwm};

use vportal_core::lighting::FadeRequest;
use vportal_core::traits::{LedLink, LightChannel, LightOutput};

use crate::channels::LED_REQUEST;

/// PWM top value, one count per level step
const PWM_TOP: u16 = 0xFF;

fn pwm_config() -> PwmConfig {
    let mut config = PwmConfig::default();
    config.top = PWM_TOP;
    config.compare_a = 0;
    config.compare_b = 0;
    config
}

/// Ring RGB output: red/green on one slice's A/B, blue on another's A
pub struct PwmRgb {
    red_green: Pwm<'static>,
    red_green_config: PwmConfig,
    blue: Pwm<'static>,
    blue_config: PwmConfig,
}

impl PwmRgb {
    pub fn new(mut red_green: Pwm<'static>, mut blue: Pwm<'static>) -> Self {
        let red_green_config = pwm_config();
        let blue_config = pwm_config();
        red_green.set_config(&red_green_config);
        blue.set_config(&blue_config);
        Self {
            red_green,
            red_green_config,
            blue,
            blue_config,
        }
    }
}

impl LightOutput for PwmRgb {
    fn set_channel(&mut self, channel: LightChannel, level: u8) {
        match channel {
            LightChannel::Red => {
                self.red_green_config.compare_a = level as u16;
                self.red_green.set_config(&self.red_green_config);
            }
            LightChannel::Green => {
                self.red_green_config.compare_b = level as u16;
                self.red_green.set_config(&self.red_green_config);
            }
            LightChannel::Blue => {
                self.blue_config.compare_a = level as u16;
                self.blue.set_config(&self.blue_config);
            }
            LightChannel::Backlight => {}
        }
    }
}

/// Backlight output on a single PWM channel
pub struct PwmBacklight {
    pwm: Pwm<'static>,
    config: PwmConfig,
}

impl PwmBacklight {
    pub fn new(mut pwm: Pwm<'static>) -> Self {
        let config = pwm_config();
        pwm.set_config(&config);
        Self { pwm, config }
    }
}

impl LightOutput for PwmBacklight {
    fn set_channel(&mut self, channel: LightChannel, level: u8) {
        if channel == LightChannel::Backlight {
            self.config.compare_a = level as u16;
            self.pwm.set_config(&self.config);
        }
    }
}

/// Hands fade requests to the LED task
pub struct SignalLedLink;

impl LedLink for SignalLedLink {
    fn request(&mut self, request: FadeRequest) {
        LED_REQUEST.signal(request);
    }
}

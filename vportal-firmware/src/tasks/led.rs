//! LED fade task
//!
//! Owns the ring output and the fade engine. While idle the task sleeps on
//! the request and shutdown signals; while a fade runs it ticks at the
//! configured interval and checks both signals without blocking.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Ticker};

use vportal_core::fader::{FadeState, Fader};

use crate::channels::{LED_REQUEST, LED_SHUTDOWN, LED_STOPPED};
use crate::lights::PwmRgb;

#[embassy_executor::task]
pub async fn led_task(mut output: PwmRgb, tick_ms: u16) {
    info!("LED task started ({}ms tick)", tick_ms);

    let mut fader = Fader::new();
    let start = Instant::now();
    let now_ms = || start.elapsed().as_millis() as u32;

    'run: loop {
        match select(LED_REQUEST.wait(), LED_SHUTDOWN.wait()).await {
            Either::First(request) => {
                trace!("Fade to {:?} over {}ms", request.color, request.duration_ms);
                fader.start(request, now_ms());
            }
            Either::Second(()) => break 'run,
        }

        let mut ticker = Ticker::every(Duration::from_millis(tick_ms as u64));
        loop {
            if LED_SHUTDOWN.try_take().is_some() {
                break 'run;
            }
            if let Some(request) = LED_REQUEST.try_take() {
                trace!("Fade redirected to {:?}", request.color);
                fader.start(request, now_ms());
            }
            if fader.update(now_ms(), &mut output) == FadeState::Idle {
                trace!("Fade complete");
                break;
            }
            ticker.next().await;
        }
    }

    info!("LED task stopped");
    LED_STOPPED.signal(output);
}

//! Portal task
//!
//! Owns the [`Portal`] and serializes all access to it: host requests,
//! token events from the companion link, and the unsolicited status timer.
//! Library errors are logged here and answered with an empty reply.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_time::{Duration, Ticker};

use vportal_core::lighting::{apply_sequence, TEARDOWN_SEQUENCE};
use vportal_core::slots::{LoadOutcome, SlotError};
use vportal_core::tag::ClassicTag;
use vportal_core::token::TokenDescriptor;
use vportal_core::{Portal, RequestError, Response, FRAME_SIZE};
use vportal_protocol::{Opcode, StatusReport};

use crate::channels::{
    PortalEvent, LED_SHUTDOWN, LED_STOPPED, PORTAL_EVENTS, REPLIES, REQUESTS,
};
use crate::lights::{PwmBacklight, SignalLedLink};

type FirmwarePortal = Portal<ClassicTag, SignalLedLink, PwmBacklight>;

#[embassy_executor::task]
pub async fn portal_task(backlight: PwmBacklight, status_interval_ms: u16) {
    info!("Portal task started");

    let mut portal: FirmwarePortal = Portal::new(SignalLedLink, backlight);
    let mut status_ticker = Ticker::every(Duration::from_millis(status_interval_ms as u64));

    loop {
        match select3(
            REQUESTS.receive(),
            PORTAL_EVENTS.receive(),
            status_ticker.next(),
        )
        .await
        {
            Either3::First(frame) => {
                let reply = handle_request(&mut portal, &frame);
                if !reply.is_empty() {
                    REPLIES.send(reply).await;
                }
            }
            Either3::Second(PortalEvent::TokenPlaced(descriptor)) => {
                handle_placed(&mut portal, descriptor);
            }
            Either3::Second(PortalEvent::TokenRemoved(slot)) => match portal.unload(slot) {
                Ok(()) => info!("Token removed from slot {}", slot),
                Err(e) => warn!("Cannot remove token from slot {}: {:?}", slot, e),
            },
            Either3::Second(PortalEvent::Shutdown) => break,
            Either3::Third(()) => {
                if let Some(reply) = portal.poll_status() {
                    dump_if_changed(&portal, &reply);
                    REPLIES.send(reply).await;
                }
            }
        }
    }

    info!("Portal shutting down");
    LED_SHUTDOWN.signal(());
    let mut ring = LED_STOPPED.wait().await;
    apply_sequence(&mut ring, TEARDOWN_SEQUENCE);
    portal.teardown();
    info!("Portal stopped");
}

/// Run one request through the dispatcher
fn handle_request(portal: &mut FirmwarePortal, frame: &[u8; FRAME_SIZE]) -> Response {
    match portal.process(frame) {
        Ok(reply) => {
            trace!("Request {=u8:#x} -> {} byte reply", frame[0], reply.len());
            if frame[0] == Opcode::Status.as_u8() {
                dump_if_changed(portal, &reply);
            }
            reply
        }
        Err(RequestError::UnknownOpcode(opcode)) => {
            warn!("Unknown opcode {=u8:#x}", opcode);
            Response::empty()
        }
        Err(e) => {
            warn!("Rejected request: {:?}", e);
            Response::empty()
        }
    }
}

/// Assign a detected token to a slot
fn handle_placed(portal: &mut FirmwarePortal, descriptor: TokenDescriptor<ClassicTag>) {
    let uid = descriptor.uid;
    match portal.load(descriptor) {
        Ok(LoadOutcome::AlreadyLoaded(slot)) => {
            debug!("Token {:?} already in slot {}", uid, slot);
        }
        Ok(LoadOutcome::Placed { slot, placement }) => {
            info!("Token {:?} placed in slot {} ({:?})", uid, slot, placement);
        }
        Err(SlotError::TableFull) => {
            warn!("No free slot for token {:?}, dropped", uid);
        }
        Err(e) => {
            warn!("Cannot place token {:?}: {:?}", uid, e);
        }
    }
}

/// Log every slot when a status report carried a change
fn dump_if_changed(portal: &FirmwarePortal, reply: &Response) {
    let Some(report) = StatusReport::parse(reply.as_bytes()) else {
        return;
    };
    if !report.any_changed() {
        return;
    }

    debug!("Status {} reported changes", report.sequence());
    for (index, slot) in portal.slots().iter().enumerate() {
        debug!(
            "  slot {}: uid={:?} loaded={} changed={} label={=str}",
            index,
            slot.uid(),
            report.is_loaded(index),
            report.is_changed(index),
            slot.label()
        );
    }
}

//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use vportal_core::lighting::FadeRequest;
use vportal_core::tag::ClassicTag;
use vportal_core::token::TokenDescriptor;
use vportal_core::{Response, FRAME_SIZE};

use crate::lights::PwmRgb;

/// Channel capacity for host request frames
const REQUEST_CHANNEL_SIZE: usize = 4;

/// Channel capacity for replies to the host
const REPLY_CHANNEL_SIZE: usize = 4;

/// Channel capacity for token events
const EVENT_CHANNEL_SIZE: usize = 2;

/// Events from the companion link
pub enum PortalEvent {
    /// A token was detected on the reader
    TokenPlaced(TokenDescriptor<ClassicTag>),
    /// The token in this slot left the reader
    TokenRemoved(usize),
    /// Stop the portal and restore lighting
    Shutdown,
}

/// Request frames from the host
pub static REQUESTS: Channel<CriticalSectionRawMutex, [u8; FRAME_SIZE], REQUEST_CHANNEL_SIZE> =
    Channel::new();

/// Replies and unsolicited status reports for the host
pub static REPLIES: Channel<CriticalSectionRawMutex, Response, REPLY_CHANNEL_SIZE> =
    Channel::new();

/// Token placement/removal and shutdown requests
pub static PORTAL_EVENTS: Channel<CriticalSectionRawMutex, PortalEvent, EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Latest ring color request (a newer request replaces an unread one)
pub static LED_REQUEST: Signal<CriticalSectionRawMutex, FadeRequest> = Signal::new();

/// Stop the LED task
pub static LED_SHUTDOWN: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// LED task has exited; carries the ring output back to the owner
pub static LED_STOPPED: Signal<CriticalSectionRawMutex, PwmRgb> = Signal::new();

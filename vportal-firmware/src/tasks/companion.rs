//! Companion link receive task
//!
//! The tag reader lives on a companion board that reports token arrivals
//! and removals over UART. Each message is postcard-encoded and COBS-framed,
//! terminated by a zero byte.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;
use heapless::Vec;
use serde::Deserialize;

use vportal_core::tag::{ClassicTag, CLASSIC_1K_BLOCKS};
use vportal_core::token::{Label, TokenDescriptor, Uid};
use vportal_core::Block;

use crate::channels::{PortalEvent, PORTAL_EVENTS};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Largest encoded message: a full 1K image plus header and COBS overhead
const MAX_MESSAGE_SIZE: usize = 1152;

/// Messages sent by the companion board
#[derive(Debug, Deserialize)]
enum CompanionMessage {
    /// A token was read; carries its complete tag image
    TokenPlaced {
        uid: [u8; 4],
        label: Label,
        blocks: Vec<Block, CLASSIC_1K_BLOCKS>,
    },
    /// The token in a slot was lifted
    TokenRemoved { slot: u8 },
    /// Stop the portal
    Shutdown,
}

impl CompanionMessage {
    fn into_event(self) -> Option<PortalEvent> {
        match self {
            CompanionMessage::TokenPlaced { uid, label, blocks } => {
                let tag = ClassicTag::from_blocks(&blocks)?;
                Some(PortalEvent::TokenPlaced(TokenDescriptor::placed(
                    Uid(uid),
                    label,
                    tag,
                )))
            }
            CompanionMessage::TokenRemoved { slot } => {
                Some(PortalEvent::TokenRemoved(slot as usize))
            }
            CompanionMessage::Shutdown => Some(PortalEvent::Shutdown),
        }
    }
}

#[embassy_executor::task]
pub async fn companion_task(mut rx: BufferedUartRx) {
    info!("Companion task started");

    let mut message: Vec<u8, MAX_MESSAGE_SIZE> = Vec::new();
    let mut overflowed = false;
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("Companion UART read error: {:?}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            if byte != 0 {
                if !overflowed && message.push(byte).is_err() {
                    warn!("Companion message too long, discarding");
                    overflowed = true;
                }
                continue;
            }

            // Delimiter: the buffered message is complete
            if !overflowed && !message.is_empty() {
                handle_message(&mut message).await;
            }
            message.clear();
            overflowed = false;
        }
    }
}

/// Decode one COBS frame and forward it to the portal task
async fn handle_message(encoded: &mut [u8]) {
    let decoded: CompanionMessage = match postcard::from_bytes_cobs(encoded) {
        Ok(message) => message,
        Err(_) => {
            warn!("Undecodable companion message ({} bytes)", encoded.len());
            return;
        }
    };

    match decoded.into_event() {
        Some(event) => PORTAL_EVENTS.send(event).await,
        None => warn!("Companion tag image rejected"),
    }
}

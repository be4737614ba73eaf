//! Host UART receive task
//!
//! Reads fixed-size request frames from the host and queues them for the
//! portal task.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::{Read, ReadExactError};

use vportal_core::FRAME_SIZE;

use crate::channels::REQUESTS;

#[embassy_executor::task]
pub async fn host_rx_task(mut rx: BufferedUartRx) {
    info!("Host RX task started");

    let mut frame = [0u8; FRAME_SIZE];

    loop {
        match rx.read_exact(&mut frame).await {
            Ok(()) => {
                trace!("RX frame {=u8:#x}", frame[0]);
                REQUESTS.send(frame).await;
            }
            Err(ReadExactError::UnexpectedEof) => {
                warn!("Host UART closed mid-frame");
            }
            Err(ReadExactError::Other(e)) => {
                warn!("Host UART read error: {:?}", e);
            }
        }
    }
}

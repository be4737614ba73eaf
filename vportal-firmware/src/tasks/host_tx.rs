//! Host UART transmit task
//!
//! Sends replies and status reports as zero-padded frames.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::REPLIES;

#[embassy_executor::task]
pub async fn host_tx_task(mut tx: BufferedUartTx) {
    info!("Host TX task started");

    loop {
        let reply = REPLIES.receive().await;
        if let Err(e) = tx.write_all(&reply.to_frame()).await {
            warn!("Failed to send reply: {:?}", e);
        } else {
            trace!("TX {} byte reply", reply.len());
        }
    }
}

//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod companion;
pub mod host_rx;
pub mod host_tx;
pub mod led;
pub mod portal;

pub use companion::companion_task;
pub use host_rx::host_rx_task;
pub use host_tx::host_tx_task;
pub use led::led_task;
pub use portal::portal_task;

//! VPortal - Toys-to-Life Portal Firmware
//!
//! Main firmware binary for RP2040-based portal boards. The host talks to
//! the portal over UART0 in fixed 32-byte frames; the tag reader companion
//! board reports tokens over UART1.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::lights::{PwmBacklight, PwmRgb};

mod channels;
mod config;
mod lights;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static HOST_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static HOST_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static COMPANION_TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static COMPANION_RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("VPortal firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    // Host link: UART0 on GPIO0 (TX) / GPIO1 (RX)
    let host_tx_buf = HOST_TX_BUF.init([0u8; 256]);
    let host_rx_buf = HOST_RX_BUF.init([0u8; 256]);
    let host_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let host_uart = host_uart.into_buffered(Irqs, host_tx_buf, host_rx_buf);
    let (host_tx, host_rx) = host_uart.split();

    // Companion link: UART1 on GPIO4 (TX) / GPIO5 (RX), receive only
    let companion_tx_buf = COMPANION_TX_BUF.init([0u8; 16]);
    let companion_rx_buf = COMPANION_RX_BUF.init([0u8; 1024]);
    let companion_uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, UartConfig::default());
    let companion_uart = companion_uart.into_buffered(Irqs, companion_tx_buf, companion_rx_buf);
    let (_companion_tx, companion_rx) = companion_uart.split();

    info!("UARTs initialized");

    // Ring LEDs: red/green on slice 3 (GPIO6/7), blue on slice 4 (GPIO8)
    // Backlight: slice 5 (GPIO10)
    let red_green = Pwm::new_output_ab(p.PWM_SLICE3, p.PIN_6, p.PIN_7, PwmConfig::default());
    let blue = Pwm::new_output_a(p.PWM_SLICE4, p.PIN_8, PwmConfig::default());
    let backlight = Pwm::new_output_a(p.PWM_SLICE5, p.PIN_10, PwmConfig::default());
    let ring = PwmRgb::new(red_green, blue);
    let backlight = PwmBacklight::new(backlight);

    info!("PWM outputs initialized");

    spawner.spawn(tasks::led_task(ring, config.fade_tick_ms)).unwrap();
    spawner
        .spawn(tasks::portal_task(backlight, config.status_interval_ms))
        .unwrap();
    spawner.spawn(tasks::host_rx_task(host_rx)).unwrap();
    spawner.spawn(tasks::host_tx_task(host_tx)).unwrap();
    spawner.spawn(tasks::companion_task(companion_rx)).unwrap();

    info!("All tasks spawned, portal running");
}

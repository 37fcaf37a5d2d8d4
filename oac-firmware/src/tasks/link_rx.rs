//! Link UART receive task
//!
//! Polls the UART, reassembles frames and dispatches every message.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::{Duration, Ticker};
use portable_atomic::Ordering;

use oac_hal::UartRx;
use oac_hal_rp2040::LinkRx;
use oac_protocol::Reassembler;

use crate::channels::LINK_SUSPENDED;
use crate::tasks::tick::now_ms;
use crate::LinkDispatcher;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Poll period; well under the inter-byte timeout
const POLL_INTERVAL_MS: u64 = 5;

/// Link RX task - receives and parses frames from the host
#[embassy_executor::task]
pub async fn link_rx_task(mut rx: LinkRx<BufferedUartRx>, dispatcher: &'static LinkDispatcher) {
    info!("Link RX task started");

    let mut reassembler = Reassembler::new();
    let mut buf = [0u8; RX_BUF_SIZE];
    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));

    loop {
        ticker.next().await;

        let n = match rx.read_available(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };

        // The host is powering down; whatever is on the line is not a message
        if LINK_SUSPENDED.load(Ordering::Acquire) {
            if reassembler.is_filling() {
                reassembler.reset();
            }
            continue;
        }

        let now_ms = now_ms();
        if let Err(e) = reassembler.poll(now_ms) {
            debug!("Partial frame dropped: {:?}", e);
        }

        let mut pending = &buf[..n];
        while !pending.is_empty() {
            let (outcome, rest) = reassembler.feed_bytes(pending, now_ms);
            match outcome {
                Ok(Some(message)) => {
                    trace!("RX: {:?}", message);
                    dispatcher.dispatch(&message);
                }
                Ok(None) => {}
                Err(e) => {
                    debug!("Frame dropped: {:?}", e);
                }
            }
            pending = rest;
        }
    }
}

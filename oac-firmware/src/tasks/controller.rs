//! Main controller task
//!
//! Owns the power manager. Feeds it host messages, button presses and
//! ticks, then flushes whatever it queued for the host.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use portable_atomic::Ordering;

use crate::channels::{BUTTON_CHANNEL, INBOX, LINK_SUSPENDED};
use crate::tasks::tick::{now_ms, TICK_SIGNAL};
use crate::{DevicePowerManager, LinkDispatcher};

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(
    mut manager: DevicePowerManager,
    dispatcher: &'static LinkDispatcher,
) {
    info!("Controller task started in {:?}", manager.state());

    loop {
        match select3(INBOX.receive(), BUTTON_CHANNEL.receive(), TICK_SIGNAL.wait()).await {
            Either3::First(message) => {
                manager.handle_message(&message, now_ms());
            }
            Either3::Second(press) => {
                debug!("Button: {:?}", press);
                manager.handle_button(press, now_ms());
            }
            Either3::Third(now_ms) => {
                manager.tick(now_ms);
            }
        }

        LINK_SUSPENDED.store(manager.link_suspended(), Ordering::Release);
        flush_outbox(&mut manager, dispatcher);
    }
}

/// Send everything the manager queued for the host
fn flush_outbox(manager: &mut DevicePowerManager, dispatcher: &LinkDispatcher) {
    if manager.link_suspended() {
        return;
    }

    while let Some(message) = manager.pop_outgoing() {
        if let Err(e) = dispatcher.send(&message) {
            warn!("Link write failed: {:?}", e);
        }
    }
}

//! UI tick task
//!
//! Re-enters the cooperative UI loop once per tick. All display, touch
//! and sound work happens inside `on_update`; nothing else touches the
//! session.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::board::Session;

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 10;

/// Consecutive failed updates before the link is considered dead
const MAX_FAILURES: u32 = 100;

#[embassy_executor::task]
pub async fn ui_task(mut session: Session) {
    info!("UI task started");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let mut failures = 0u32;

    loop {
        ticker.next().await;

        match session.on_update() {
            Ok(()) => failures = 0,
            Err(e) => {
                failures += 1;
                warn!("UI update failed: {}", Debug2Format(&e));
                if failures >= MAX_FAILURES {
                    error!("display link lost, stopping UI");
                    return;
                }
            }
        }
    }
}

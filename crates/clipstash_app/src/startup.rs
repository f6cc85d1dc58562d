//! Startup sequencing helpers.

use crate::error::HistoryError;
use std::thread;
use std::time::{Duration, Instant};

/// Poll `condition` until it holds or `timeout` elapses.
///
/// # Errors
/// [`HistoryError::ConditionTimeout`] naming `what` when the deadline passes.
pub fn wait_until<F>(
    what: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut condition: F,
) -> Result<(), HistoryError>
where
    F: FnMut() -> bool,
{
    let started = Instant::now();
    loop {
        if condition() {
            return Ok(());
        }
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            return Err(HistoryError::ConditionTimeout {
                what: what.to_string(),
                waited_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            });
        }
        thread::sleep(poll_interval.min(timeout - elapsed));
    }
}

//! Bounded exponential-backoff retry for clipboard writes.

use super::ClipboardIo;
use crate::error::HistoryError;
use clipstash_core::Config;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Attempt budget and backoff base for clipboard writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.copy_retries,
            Duration::from_millis(config.copy_base_delay_ms),
        )
    }

    /// Wait after failed attempt `attempt` (0-based): `base * 2^attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Write `text`, retrying transient failures with exponential backoff.
///
/// Blocks the calling thread for the backoff waits; run it off the UI loop.
///
/// # Errors
/// [`HistoryError::ClipboardWriteFailed`] carrying the attempt count and the
/// last underlying cause once every attempt failed.
pub fn write_with_retry(
    clipboard: &mut dyn ClipboardIo,
    text: &str,
    policy: RetryPolicy,
) -> Result<(), HistoryError> {
    let mut last_error = String::new();
    for attempt in 0..policy.max_attempts {
        match clipboard.write_text(text) {
            Ok(()) => {
                if attempt > 0 {
                    debug!(attempt = attempt + 1, "clipboard write succeeded after retry");
                }
                return Ok(());
            }
            Err(err) => {
                warn!(
                    attempt = attempt + 1,
                    max = policy.max_attempts,
                    "clipboard write failed: {}",
                    err
                );
                last_error = err.to_string();
                if attempt + 1 < policy.max_attempts {
                    thread::sleep(policy.delay_after(attempt));
                }
            }
        }
    }
    Err(HistoryError::ClipboardWriteFailed {
        attempts: policy.max_attempts,
        last_error,
    })
}

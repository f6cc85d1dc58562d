//! Errors surfaced by the backend worker, cache layer and clipboard plumbing.
//!
//! Values cross thread boundaries inside events, so the type is `Clone` and
//! carries rendered messages instead of source errors.

use clipstash_core::AppError;
use thiserror::Error;

/// Error taxonomy for the history layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("History store is not ready yet")]
    StoreNotReady,

    #[error("{operation} failed: {message}")]
    QueryFailed { operation: String, message: String },

    #[error("Backend worker is unavailable")]
    BackendDisconnected,

    #[error("Clipboard is unavailable: {0}")]
    ClipboardApiUnavailable(String),

    #[error("Clipboard access failed: {0}")]
    ClipboardAccess(String),

    #[error("Copy failed after {attempts} attempts: {last_error}")]
    ClipboardWriteFailed { attempts: u32, last_error: String },

    #[error("Timed out after {waited_ms}ms waiting for {what}")]
    ConditionTimeout { what: String, waited_ms: u64 },
}

impl HistoryError {
    /// Wrap a store error raised while running `operation`.
    pub fn store(operation: &str, err: AppError) -> Self {
        Self::QueryFailed {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}

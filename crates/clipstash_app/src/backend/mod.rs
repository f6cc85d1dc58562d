//! Backend worker wiring for the history cache.
//!
//! This module exposes the command/event protocol plus the worker spawn helper
//! used by the cache loop.

mod protocol;
mod worker;

pub use protocol::{CoreCmd, CoreEvent, MutationAck, MutationId, QueryRequest, RequestId};
pub use worker::{spawn_backend, spawn_backend_with_store, BackendHandle};

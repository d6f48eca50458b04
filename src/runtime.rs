//! Runtime for executing chat submissions
//!
//! Owns the I/O around the pure state machine: history storage, the
//! completion client and the presenter.

mod executor;
mod session;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{ChatRuntime, Finished};
pub use session::Session;
pub use traits::*;

use crate::db::Database;

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime<P> = ChatRuntime<Database, ServiceLlmClient, P>;

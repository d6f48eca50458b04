//! Submission state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! Each submission walks `Idle → Submitting → AwaitingResponse →
//! {Succeeded, Failed} → Idle`.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, Outcome};
pub use state::{RequestToken, SubmissionState};
pub use transition::transition;

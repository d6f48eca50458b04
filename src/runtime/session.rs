//! Per-session conversation state

use crate::history::HistoryStore;
use crate::llm::{Conversation, Turn};
use crate::runtime::SlotStore;
use crate::state_machine::RequestToken;

/// The live conversation plus request bookkeeping.
///
/// Owned by whatever drives the UI loop and lent to the runtime for each
/// operation.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(super) conversation: Conversation,
    next_token: u64,
    latest_token: Option<RequestToken>,
}

impl Session {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            conversation,
            next_token: 1,
            latest_token: None,
        }
    }

    /// Load from storage, falling back to the default conversation
    pub fn init<S: SlotStore>(history: &HistoryStore<S>) -> Self {
        Self::new(history.load())
    }

    pub fn conversation(&self) -> &[Turn] {
        &self.conversation
    }

    /// Token of the most recently issued request
    pub fn latest_token(&self) -> Option<RequestToken> {
        self.latest_token
    }

    pub(super) fn allocate_token(&mut self) -> RequestToken {
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        token
    }

    pub(super) fn mark_issued(&mut self, token: RequestToken) {
        self.latest_token = Some(token);
    }
}

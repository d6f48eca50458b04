//! Conversation history persistence and trimming

use crate::llm::{Conversation, Turn};
use crate::runtime::SlotStore;
use crate::system_prompt::default_system_turn;

/// Name of the slot holding the serialized conversation
pub const STORAGE_KEY: &str = "chat_history_v1";

/// Number of most recent turns kept by [`trim`]
pub const RETAINED_TURNS: usize = 20;

/// How the pinned system turn interacts with the retained window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimPolicy {
    /// Pinned system turn plus the last turns of the remainder. The system
    /// turn is never duplicated.
    #[default]
    PinnedWindow,
    /// Pinned system turn plus the last turns of the whole list. The system
    /// turn shows up twice while it is still inside the window.
    Literal,
}

impl TrimPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pinned" | "pinned_window" => Some(Self::PinnedWindow),
            "literal" => Some(Self::Literal),
            _ => None,
        }
    }
}

/// Bound a conversation to the pinned system turn plus the most recent
/// [`RETAINED_TURNS`] turns.
pub fn trim(conversation: Conversation, policy: TrimPolicy) -> Conversation {
    let pinned = conversation.first().filter(|t| t.is_system()).cloned();

    let window_source: &[Turn] = match (policy, pinned.is_some()) {
        (TrimPolicy::PinnedWindow, true) => &conversation[1..],
        _ => &conversation,
    };
    let start = window_source.len().saturating_sub(RETAINED_TURNS);

    pinned
        .into_iter()
        .chain(window_source[start..].iter().cloned())
        .collect()
}

/// Loads and saves the conversation in one named slot.
///
/// Neither operation fails to the caller: reads degrade to the default
/// conversation and writes are logged and dropped.
pub struct HistoryStore<S: SlotStore> {
    store: S,
    key: String,
}

impl<S: SlotStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn default_conversation() -> Conversation {
        vec![default_system_turn()]
    }

    pub fn load(&self) -> Conversation {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return Self::default_conversation(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Could not read chat history");
                return Self::default_conversation();
            }
        };

        match serde_json::from_str::<Conversation>(&raw) {
            Ok(conversation) => {
                tracing::debug!(key = %self.key, turns = conversation.len(), "Loaded chat history");
                conversation
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Could not parse chat history");
                Self::default_conversation()
            }
        }
    }

    pub fn save(&self, conversation: &[Turn]) {
        let raw = match serde_json::to_string(conversation) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Could not serialize chat history");
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &raw) {
            tracing::warn!(key = %self.key, error = %e, "Could not save chat history");
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn store(&self) -> &S {
        &self.store
    }
}

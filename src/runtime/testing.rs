//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::llm::{Completion, CompletionRequest, LlmError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

// ============================================================================
// Memory Slot Store
// ============================================================================

/// In-memory slot storage with switchable failures
#[derive(Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail, as a broken storage backend would
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail, as an exhausted quota would
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl SlotStore for MemorySlotStore {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err("storage unavailable".to_string());
        }
        Ok(self.slots.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err("quota exceeded".to_string());
        }
        self.slots
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<Completion, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: Completion) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::transport("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Recording Presenter
// ============================================================================

/// Everything the runtime asked the presenter to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Message {
        handle: MessageHandle,
        sender: Sender,
        body: MessageBody,
    },
    Typing(MessageHandle),
    Removed(MessageHandle),
    Status {
        text: String,
        is_error: bool,
    },
    InputReset,
}

/// Presenter that records calls instead of drawing anything
#[derive(Default)]
pub struct RecordingPresenter {
    events: Vec<PresenterEvent>,
    removed: HashSet<MessageHandle>,
    next_handle: u64,
    controls: Controls,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_controls(&mut self, controls: Controls) {
        self.controls = controls;
    }

    pub fn events(&self) -> &[PresenterEvent] {
        &self.events
    }

    /// Messages still on screen, in render order
    pub fn transcript(&self) -> Vec<(Sender, MessageBody)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Message {
                    handle,
                    sender,
                    body,
                } if !self.removed.contains(handle) => Some((*sender, body.clone())),
                _ => None,
            })
            .collect()
    }

    /// Typing placeholders not yet removed
    pub fn visible_typing(&self) -> Vec<MessageHandle> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Typing(handle) if !self.removed.contains(handle) => Some(*handle),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<(String, bool)> {
        self.events.iter().rev().find_map(|e| match e {
            PresenterEvent::Status { text, is_error } => Some((text.clone(), *is_error)),
            _ => None,
        })
    }

    pub fn input_resets(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PresenterEvent::InputReset))
            .count()
    }

    fn allocate(&mut self) -> MessageHandle {
        self.next_handle += 1;
        MessageHandle(self.next_handle)
    }
}

impl Presenter for RecordingPresenter {
    fn append_message(&mut self, sender: Sender, body: MessageBody) -> MessageHandle {
        let handle = self.allocate();
        self.events.push(PresenterEvent::Message {
            handle,
            sender,
            body,
        });
        handle
    }

    fn show_typing(&mut self) -> MessageHandle {
        let handle = self.allocate();
        self.events.push(PresenterEvent::Typing(handle));
        handle
    }

    fn remove(&mut self, handle: MessageHandle) {
        self.removed.insert(handle);
        self.events.push(PresenterEvent::Removed(handle));
    }

    fn show_status(&mut self, text: &str, is_error: bool) {
        self.events.push(PresenterEvent::Status {
            text: text.to_string(),
            is_error,
        });
    }

    fn controls(&self) -> Controls {
        self.controls
    }

    fn reset_input(&mut self) {
        self.events.push(PresenterEvent::InputReset);
    }
}

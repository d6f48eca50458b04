//! Chat runtime executor
//!
//! Runs the submission state machine and executes its effects against the
//! history store, the completion client and the presenter.

use super::session::Session;
use super::traits::{LlmClient, MessageBody, MessageHandle, Presenter, Sender, SlotStore};
use crate::format::format;
use crate::history::{trim, HistoryStore, TrimPolicy};
use crate::llm::{CompletionRequest, RequestParameters, Role};
use crate::state_machine::{
    transition, Effect, Event, Outcome, RequestToken, SubmissionState,
};
use std::sync::Arc;

/// Per-submission scratch space filled in while executing effects
#[derive(Debug, Default)]
struct SubmissionSlots {
    typing: Option<MessageHandle>,
    request: Option<CompletionRequest>,
}

/// A submitted request waiting for the network
#[derive(Debug)]
pub struct InFlight {
    token: RequestToken,
    state: SubmissionState,
    typing: Option<MessageHandle>,
    request: CompletionRequest,
}

impl InFlight {
    #[allow(dead_code)] // Used in tests
    pub fn token(&self) -> RequestToken {
        self.token
    }

    #[allow(dead_code)] // Used in tests
    pub fn request(&self) -> &CompletionRequest {
        &self.request
    }

    /// Perform the outbound call. This is the only suspension point of a
    /// submission; it borrows nothing from the runtime so several may be
    /// pending at once.
    pub async fn run<L: LlmClient + ?Sized>(self, llm: &L) -> Finished {
        let result = llm.complete(&self.request).await;
        Finished {
            token: self.token,
            state: self.state,
            typing: self.typing,
            outcome: Outcome::classify(result),
        }
    }
}

/// A request whose outcome is known but not yet applied
#[derive(Debug)]
pub struct Finished {
    token: RequestToken,
    state: SubmissionState,
    typing: Option<MessageHandle>,
    outcome: Outcome,
}

impl Finished {
    #[allow(dead_code)] // Used in tests
    pub fn token(&self) -> RequestToken {
        self.token
    }

    #[allow(dead_code)] // Used in tests
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }
}

/// Generic chat runtime that can work with any storage, LLM, and presenter
pub struct ChatRuntime<S, L, P>
where
    S: SlotStore,
    L: LlmClient + 'static,
    P: Presenter,
{
    history: HistoryStore<S>,
    llm_client: Arc<L>,
    presenter: P,
    model: String,
    trim_policy: TrimPolicy,
}

impl<S, L, P> ChatRuntime<S, L, P>
where
    S: SlotStore,
    L: LlmClient + 'static,
    P: Presenter,
{
    pub fn new(
        history: HistoryStore<S>,
        llm_client: L,
        presenter: P,
        model: impl Into<String>,
        trim_policy: TrimPolicy,
    ) -> Self {
        Self {
            history,
            llm_client: Arc::new(llm_client),
            presenter,
            model: model.into(),
            trim_policy,
        }
    }

    pub fn llm_client(&self) -> Arc<L> {
        Arc::clone(&self.llm_client)
    }

    #[allow(dead_code)] // Used in tests
    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    #[allow(dead_code)] // Used in tests
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Render persisted user and assistant turns into the transcript
    pub fn replay(&mut self, session: &Session) {
        for turn in session.conversation() {
            match turn.role {
                Role::User => {
                    self.presenter
                        .append_message(Sender::User, MessageBody::Text(turn.content.clone()));
                }
                Role::Assistant => {
                    self.presenter.append_message(
                        Sender::Assistant,
                        MessageBody::Markup(format(&turn.content)),
                    );
                }
                Role::System => {}
            }
        }
    }

    /// Record a submission and prepare its request.
    ///
    /// Returns `None` when the input is blank (nothing happens at all) or
    /// the state machine rejected the submission.
    pub fn submit(&mut self, session: &mut Session, input: &str) -> Option<InFlight> {
        let token = session.allocate_token();
        let mut slots = SubmissionSlots::default();

        let state = self.step(
            session,
            &SubmissionState::Idle,
            Event::Submit {
                text: input.to_string(),
                token,
            },
            &mut slots,
        )?;
        if state == SubmissionState::Idle {
            tracing::debug!("Ignoring blank submission");
            return None;
        }

        let state = self.step(session, &state, Event::Dispatched, &mut slots)?;
        let request = slots.request.take()?;
        session.mark_issued(token);

        tracing::info!(
            token = %token,
            messages = request.messages.len(),
            temperature = request.params.temperature,
            max_output_tokens = request.params.max_output_tokens,
            "Submitting chat request"
        );

        Some(InFlight {
            token,
            state,
            typing: slots.typing,
            request,
        })
    }

    /// Apply a finished request to the session and the transcript
    pub fn finish(&mut self, session: &mut Session, finished: Finished) {
        let Finished {
            token,
            state,
            typing,
            outcome,
        } = finished;

        if session.latest_token() != Some(token) {
            tracing::debug!(
                token = %token,
                latest = ?session.latest_token(),
                "Completion arrived after a newer submission"
            );
        }

        match &outcome {
            Outcome::Success { text } => {
                tracing::info!(token = %token, chars = text.len(), "Chat request succeeded");
            }
            Outcome::Failure { kind, message } => {
                tracing::warn!(token = %token, kind = kind.as_str(), error = %message, "Chat request failed");
            }
        }

        let mut slots = SubmissionSlots {
            typing,
            request: None,
        };
        if let Some(state) = self.step(session, &state, Event::Completed { outcome }, &mut slots)
        {
            self.step(session, &state, Event::Settled, &mut slots);
        }
    }

    /// Submit, wait for the answer and apply it
    #[allow(dead_code)] // Used in tests
    pub async fn send(&mut self, session: &mut Session, input: &str) -> Option<Outcome> {
        let in_flight = self.submit(session, input)?;
        let llm = self.llm_client();
        let finished = in_flight.run(llm.as_ref()).await;
        let outcome = finished.outcome().clone();
        self.finish(session, finished);
        Some(outcome)
    }

    /// One transition plus its effects. `None` if the transition was invalid.
    fn step(
        &mut self,
        session: &mut Session,
        state: &SubmissionState,
        event: Event,
        slots: &mut SubmissionSlots,
    ) -> Option<SubmissionState> {
        let result = match transition(state, event) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Rejected submission event");
                return None;
            }
        };

        for effect in result.effects {
            self.execute_effect(session, effect, slots);
        }

        Some(result.new_state)
    }

    fn execute_effect(&mut self, session: &mut Session, effect: Effect, slots: &mut SubmissionSlots) {
        match effect {
            Effect::AppendTurn(turn) => session.conversation.push(turn),
            Effect::TrimHistory => {
                let conversation = std::mem::take(&mut session.conversation);
                session.conversation = trim(conversation, self.trim_policy);
            }
            Effect::PersistHistory => self.history.save(&session.conversation),
            Effect::RenderMessage { sender, body } => {
                self.presenter.append_message(sender, body);
            }
            Effect::ShowTyping => slots.typing = Some(self.presenter.show_typing()),
            Effect::RemoveTyping => {
                if let Some(handle) = slots.typing.take() {
                    self.presenter.remove(handle);
                }
            }
            Effect::ShowStatus { text, is_error } => self.presenter.show_status(&text, is_error),
            Effect::RequestCompletion => {
                let controls = self.presenter.controls();
                slots.request = Some(CompletionRequest {
                    messages: session.conversation.clone(),
                    params: RequestParameters {
                        model: self.model.clone(),
                        temperature: controls.temperature,
                        max_output_tokens: controls.max_output_tokens,
                    },
                });
            }
            Effect::ResetInput => self.presenter.reset_input(),
        }
    }
}

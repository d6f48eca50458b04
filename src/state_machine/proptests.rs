//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::transition;
use super::*;
use crate::llm::LlmErrorKind;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_token() -> impl Strategy<Value = RequestToken> {
    (0u64..1000).prop_map(RequestToken)
}

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Transport),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::Api),
        Just(LlmErrorKind::Unexpected),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        "[a-zA-Z:<>& \n]{1,60}".prop_map(|text| Outcome::Success { text }),
        (arb_error_kind(), "[a-zA-Z ]{0,30}")
            .prop_map(|(kind, message)| Outcome::Failure { kind, message }),
    ]
}

fn arb_state() -> impl Strategy<Value = SubmissionState> {
    prop_oneof![
        Just(SubmissionState::Idle),
        arb_token().prop_map(|token| SubmissionState::Submitting { token }),
        arb_token().prop_map(|token| SubmissionState::AwaitingResponse { token }),
        arb_token().prop_map(|token| SubmissionState::Succeeded { token }),
        (arb_token(), arb_error_kind())
            .prop_map(|(token, kind)| SubmissionState::Failed { token, kind }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        ("[ a-z\t\n]{0,20}", arb_token()).prop_map(|(text, token)| Event::Submit { text, token }),
        Just(Event::Dispatched),
        arb_outcome().prop_map(|outcome| Event::Completed { outcome }),
        Just(Event::Settled),
    ]
}

fn count_appends(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::AppendTurn(_)))
        .count()
}

proptest! {
    /// Whitespace-only input never produces effects
    #[test]
    fn prop_blank_input_is_noop(text in "[ \t\n]{0,10}", token in arb_token()) {
        let result = transition(&SubmissionState::Idle, Event::Submit { text, token }).unwrap();
        prop_assert_eq!(result.new_state, SubmissionState::Idle);
        prop_assert!(result.effects.is_empty());
    }

    /// Non-blank input appends exactly one user turn and issues no request yet
    #[test]
    fn prop_submit_appends_once(text in "[a-z]{1,10}[ a-z]{0,10}", token in arb_token()) {
        let result = transition(&SubmissionState::Idle, Event::Submit { text, token }).unwrap();
        prop_assert_eq!(count_appends(&result.effects), 1);
        prop_assert!(!result.effects.contains(&Effect::RequestCompletion));
    }

    /// Failures never mutate or persist the conversation
    #[test]
    fn prop_failure_leaves_history_alone(token in arb_token(), kind in arb_error_kind(), message in "[a-z ]{0,20}") {
        let result = transition(
            &SubmissionState::AwaitingResponse { token },
            Event::Completed { outcome: Outcome::Failure { kind, message } },
        ).unwrap();
        prop_assert_eq!(count_appends(&result.effects), 0);
        prop_assert!(!result.effects.contains(&Effect::PersistHistory));
        prop_assert!(result.effects.contains(&Effect::RemoveTyping));
    }

    /// The token survives every successful transition until Idle
    #[test]
    fn prop_token_is_preserved(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, event) {
            match (state.token(), result.new_state.token()) {
                (Some(before), Some(after)) => prop_assert_eq!(before, after),
                (Some(_), None) => prop_assert!(state.is_finished()),
                _ => {}
            }
        }
    }

    /// Only the dispatch transition issues a request
    #[test]
    fn prop_single_request_per_submission(state in arb_state(), event in arb_event()) {
        let dispatched = matches!(event, Event::Dispatched);
        if let Ok(result) = transition(&state, event) {
            let requests = result.effects.iter().filter(|e| **e == Effect::RequestCompletion).count();
            prop_assert_eq!(requests, usize::from(dispatched));
        }
    }
}

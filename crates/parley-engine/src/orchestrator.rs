//! Send lifecycle as an explicit state machine.
//!
//! ```text
//! Idle --Submit(non-empty)--> Sending --Completed--> Success --Settle--> Idle
//!                                    \--Failed-----> Failed  --Settle--> Idle
//! ```
//!
//! [`transition`] is pure: it returns the next state and the effects the
//! widget must apply, in order. Pairs not drawn above change nothing.

use crate::client::{ChatResponse, RequestError};
use crate::message::Message;

/// Lifecycle state of the send control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendState {
    /// Accepting input.
    #[default]
    Idle,
    /// A request is in flight.
    Sending,
    /// The last request produced a reply.
    Success,
    /// The last request failed.
    Failed,
}

/// Input to the state machine.
#[derive(Debug)]
pub enum SendEvent {
    /// The user asked to send this text.
    Submit(String),
    /// The backend replied.
    Completed(ChatResponse),
    /// The request failed.
    Failed(RequestError),
    /// Return to idle after an outcome has been shown.
    Settle,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append the user's message to the transcript.
    RenderUser(String),
    /// Empty the input field.
    ClearInput,
    /// Disable the input field and send control.
    LockControls,
    /// Append the loading placeholder.
    ShowPlaceholder,
    /// Arm the request deadline.
    StartTimer,
    /// Issue the network request for this text.
    Dispatch(String),
    /// Remove the loading placeholder.
    RemovePlaceholder,
    /// Append the bot's reply.
    RenderBot(Message),
    /// Display an error message.
    ShowError(String),
    /// Re-enable the input field and send control.
    UnlockControls,
    /// Disarm the request deadline.
    CancelTimer,
}

/// Compute the next state and its effects.
pub fn transition(state: SendState, event: SendEvent) -> (SendState, Vec<Effect>) {
    match (state, event) {
        (SendState::Idle, SendEvent::Submit(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return (SendState::Idle, Vec::new());
            }
            (
                SendState::Sending,
                vec![
                    Effect::RenderUser(text.to_string()),
                    Effect::ClearInput,
                    Effect::LockControls,
                    Effect::ShowPlaceholder,
                    Effect::StartTimer,
                    Effect::Dispatch(text.to_string()),
                ],
            )
        }
        (SendState::Sending, SendEvent::Completed(response)) => (
            SendState::Success,
            vec![
                Effect::RemovePlaceholder,
                Effect::RenderBot(Message::bot(
                    response.response,
                    response.sources,
                    response.thinking_log,
                )),
                Effect::UnlockControls,
                Effect::CancelTimer,
            ],
        ),
        (SendState::Sending, SendEvent::Failed(error)) => (
            SendState::Failed,
            vec![
                Effect::RemovePlaceholder,
                Effect::ShowError(error.user_message()),
                Effect::UnlockControls,
                Effect::CancelTimer,
            ],
        ),
        (SendState::Success | SendState::Failed, SendEvent::Settle) => {
            (SendState::Idle, Vec::new())
        }
        (state, _) => (state, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TIMEOUT_MESSAGE;
    use crate::message::{Phase, Step};
    use std::time::Duration;

    fn response(text: &str) -> ChatResponse {
        ChatResponse {
            response: text.to_string(),
            sources: vec!["https://en.wikipedia.org/x".into()],
            thinking_log: vec![Step::new(1, Phase::Searching, "look")],
        }
    }

    #[test]
    fn test_submit_starts_sending() {
        let (state, effects) = transition(SendState::Idle, SendEvent::Submit("  hello \n".into()));
        assert_eq!(state, SendState::Sending);
        assert_eq!(
            effects,
            vec![
                Effect::RenderUser("hello".into()),
                Effect::ClearInput,
                Effect::LockControls,
                Effect::ShowPlaceholder,
                Effect::StartTimer,
                Effect::Dispatch("hello".into()),
            ]
        );
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        for text in ["", "   ", "\n\t"] {
            let (state, effects) = transition(SendState::Idle, SendEvent::Submit(text.into()));
            assert_eq!(state, SendState::Idle);
            assert!(effects.is_empty());
        }
    }

    #[test]
    fn test_completion_renders_bot_message() {
        let (state, effects) =
            transition(SendState::Sending, SendEvent::Completed(response("Paris")));
        assert_eq!(state, SendState::Success);
        assert_eq!(effects[0], Effect::RemovePlaceholder);
        match &effects[1] {
            Effect::RenderBot(message) => {
                assert_eq!(message.text, "Paris");
                assert_eq!(message.sources.len(), 1);
                assert_eq!(message.step_log.len(), 1);
            }
            other => panic!("unexpected effect {other:?}"),
        }
        assert_eq!(&effects[2..], &[Effect::UnlockControls, Effect::CancelTimer]);
    }

    #[test]
    fn test_failure_shows_error() {
        let (state, effects) = transition(
            SendState::Sending,
            SendEvent::Failed(RequestError::Timeout(Duration::from_secs(30))),
        );
        assert_eq!(state, SendState::Failed);
        assert_eq!(
            effects,
            vec![
                Effect::RemovePlaceholder,
                Effect::ShowError(TIMEOUT_MESSAGE.into()),
                Effect::UnlockControls,
                Effect::CancelTimer,
            ]
        );
    }

    #[test]
    fn test_outcomes_settle_to_idle() {
        for state in [SendState::Success, SendState::Failed] {
            let (next, effects) = transition(state, SendEvent::Settle);
            assert_eq!(next, SendState::Idle);
            assert!(effects.is_empty());
        }
    }

    #[test]
    fn test_submit_while_sending_is_ignored() {
        let (state, effects) = transition(SendState::Sending, SendEvent::Submit("again".into()));
        assert_eq!(state, SendState::Sending);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_late_completion_when_idle_is_ignored() {
        let (state, effects) = transition(SendState::Idle, SendEvent::Completed(response("late")));
        assert_eq!(state, SendState::Idle);
        assert!(effects.is_empty());
    }
}

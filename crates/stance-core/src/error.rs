//! Core error taxonomy

use thiserror::Error;

use crate::condition::Condition;
use crate::message::Message;
use crate::thesis::ThesisId;

/// Failures the core recovers into typed values.
///
/// None of these are fatal; the transport layer picks the status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Thesis {0} not found in catalog")]
    ThesisNotFound(ThesisId),

    #[error("Malformed transcript: {0}")]
    MalformedTranscript(String),

    #[error("Condition {0} does not permit continuation")]
    ContinuationNotPermitted(Condition),

    #[error("Position {0} outside 0-100")]
    InvalidPosition(i64),
}

impl CoreError {
    /// Name of the component that raised the error
    pub fn component(&self) -> &'static str {
        match self {
            CoreError::ThesisNotFound(_) => "thesis_catalog",
            CoreError::MalformedTranscript(_) => "conversation",
            CoreError::ContinuationNotPermitted(_) => "condition",
            CoreError::InvalidPosition(_) => "session",
        }
    }

    /// Render as an error-role message, the shape clients already display
    pub fn to_message(&self) -> Message {
        Message::error(format!("{} Error: {}", self.component(), self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_carries_component() {
        let msg = CoreError::ThesisNotFound(ThesisId::from("999")).to_message();
        assert!(msg.is_error());
        assert_eq!(msg.content, "thesis_catalog Error: Thesis 999 not found in catalog");
    }
}

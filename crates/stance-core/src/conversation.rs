//! Conversation state transformer
//!
//! Turns a prior transcript plus the current request's stance into the
//! ordered message list sent to the model.
//!
//! Replay rule: the first user message is the framing message and is always
//! re-rendered from the position and statement of the *current* request. A
//! caller that sends evolving values instead of the original ones rewrites
//! what the model sees as the opening turn. The rewrite is logged at debug
//! level whenever it changes the stored text.

use tracing::debug;

use crate::condition::Condition;
use crate::error::CoreError;
use crate::message::{Message, Role};
use crate::prompt::{build_initial, framing_message, system_instruction};
use crate::session::Position;
use crate::thesis::Thesis;

/// Produce the outbound message list for the next model call.
///
/// - Empty `prior`: `[system, user]` from the prompt builder.
/// - Otherwise: a copy of `prior` with the condition's system instruction
///   inserted at index 0 when missing, and the first user message's content
///   replaced by a fresh framing message. Every other message is untouched.
///
/// Fails with [`CoreError::MalformedTranscript`] when `prior` has no user
/// message or carries a system message anywhere but index 0.
pub fn advance(
    condition: Condition,
    thesis: &Thesis,
    prior: &[Message],
    position: Position,
    statement: &str,
) -> Result<Vec<Message>, CoreError> {
    if prior.is_empty() {
        let initial = build_initial(condition, thesis, position, statement);
        return Ok(vec![
            Message::system(initial.system_instruction),
            Message::user(initial.first_user_message),
        ]);
    }

    validate(prior)?;

    let mut messages = Vec::with_capacity(prior.len() + 1);
    if prior[0].role != Role::System {
        messages.push(Message::system(system_instruction(condition, thesis, position)));
    }
    messages.extend_from_slice(prior);

    let framing = framing_message(position, statement);
    let replaced = rewrite_first_user(&mut messages, framing).ok_or_else(|| {
        CoreError::MalformedTranscript("history contains no user message".to_string())
    })?;

    debug!(
        condition = %condition,
        thesis = %thesis.id,
        len = messages.len(),
        replaced_index = replaced.index,
        framing_changed = replaced.changed,
        "Advanced transcript"
    );

    Ok(messages)
}

/// Where the framing rewrite landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewrite {
    pub index: usize,
    /// Whether the previous content differed from the new framing
    pub changed: bool,
}

/// Replace the content of the first user message with `framing`.
///
/// Tie-break is first match in order. Returns `None` when there is no user
/// message, leaving `messages` unchanged.
pub fn rewrite_first_user(messages: &mut [Message], framing: String) -> Option<Rewrite> {
    let index = messages.iter().position(|m| m.role == Role::User)?;
    let slot = &mut messages[index];
    let changed = slot.content != framing;
    slot.content = framing;
    Some(Rewrite { index, changed })
}

fn validate(prior: &[Message]) -> Result<(), CoreError> {
    if let Some(index) = prior
        .iter()
        .skip(1)
        .position(|m| m.role == Role::System)
    {
        return Err(CoreError::MalformedTranscript(format!(
            "system message at index {}",
            index + 1
        )));
    }
    if !prior.iter().any(|m| m.role == Role::User) {
        return Err(CoreError::MalformedTranscript(
            "history contains no user message".to_string(),
        ));
    }
    Ok(())
}

//! Response assembler

use crate::condition::Condition;
use crate::message::Message;
use crate::thesis::Thesis;

/// Position of a model answer within its conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    First,
    Continuation,
}

/// Build the message returned to the participant from raw model output.
///
/// Pre-surfacing conditions get the static blocks prepended, on the first
/// turn only:
///
/// ```text
/// PRO:\n<pro>\n\nKONTRA:\n<contra>\n\n<model output>
/// ```
///
/// Everything else is passed through verbatim.
pub fn assemble(condition: Condition, thesis: &Thesis, turn: Turn, model_output: &str) -> Message {
    if condition.pre_surfaces_arguments() && turn == Turn::First {
        Message::assistant(with_arguments(&thesis.pro, &thesis.contra, model_output))
    } else {
        Message::assistant(model_output)
    }
}

fn with_arguments(pro: &str, contra: &str, model_output: &str) -> String {
    let mut content =
        String::with_capacity(pro.len() + contra.len() + model_output.len() + 20);
    content.push_str("PRO:\n");
    content.push_str(pro);
    content.push_str("\n\nKONTRA:\n");
    content.push_str(contra);
    content.push_str("\n\n");
    content.push_str(model_output);
    content
}

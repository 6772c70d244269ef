//! # Stance Core
//!
//! Core types and rules for the thesis-stance study:
//! - [`ThesisCatalog`]: the fixed theses with their PRO/KONTRA blocks
//! - [`Condition`]: the experimental arms and what differs between them
//! - [`prompt`]: system instructions and the framing message per arm
//! - [`conversation::advance`]: how a transcript becomes the next model input
//! - [`assembler::assemble`]: how model output becomes the participant-facing answer
//!
//! Nothing in this crate performs I/O; every function is deterministic in its
//! inputs and safe to call concurrently.

pub mod assembler;
pub mod condition;
pub mod conversation;
pub mod error;
pub mod message;
pub mod prompt;
pub mod session;
pub mod thesis;

pub use assembler::{assemble, Turn};
pub use condition::{persuasive_anchor, Condition};
pub use conversation::{advance, rewrite_first_user, Rewrite};
pub use error::CoreError;
pub use message::{Message, Role, Transcript};
pub use prompt::{build_initial, framing_message, system_instruction, InitialPrompt};
pub use session::{Position, SessionVariables};
pub use thesis::{Thesis, ThesisCatalog, ThesisId};

//! Experimental conditions
//!
//! Each condition is one arm of the study. The arm decides which instruction
//! template the model gets, whether the static PRO/KONTRA blocks are shown to
//! the participant, whether the model steers toward a hidden stance, and
//! whether the conversation may continue after the first answer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::Position;

/// An experimental arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    /// Group A: static arguments plus one personalised neutral answer
    NeutralSingleTurn,
    /// Group B: static arguments, then a free neutral discussion
    NeutralMultiTurn,
    /// Group C: model writes its own arguments and argues toward a hidden anchor
    Persuasive,
    /// Researcher sandbox: model writes its own arguments, free discussion
    Exploratory,
}

impl Condition {
    pub fn all() -> [Condition; 4] {
        [
            Condition::NeutralSingleTurn,
            Condition::NeutralMultiTurn,
            Condition::Persuasive,
            Condition::Exploratory,
        ]
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Condition::NeutralSingleTurn => "neutral-single-turn",
            Condition::NeutralMultiTurn => "neutral-multi-turn",
            Condition::Persuasive => "persuasive",
            Condition::Exploratory => "exploratory",
        }
    }

    /// Whether the static PRO/KONTRA blocks are prepended to the first answer
    pub fn pre_surfaces_arguments(&self) -> bool {
        matches!(
            self,
            Condition::NeutralSingleTurn | Condition::NeutralMultiTurn
        )
    }

    pub fn allows_continuation(&self) -> bool {
        matches!(self, Condition::NeutralMultiTurn | Condition::Exploratory)
    }

    /// Hidden target stance the model argues toward.
    ///
    /// Only the persuasive arm has one: it always pulls toward the extreme the
    /// participant does not already lean to.
    pub fn internal_anchor(&self, position: Position) -> Option<u8> {
        match self {
            Condition::Persuasive => Some(persuasive_anchor(position)),
            _ => None,
        }
    }

    /// Component name used in provider-failure diagnostics
    pub fn error_tag(&self) -> &'static str {
        match self {
            Condition::Exploratory => "api_tester",
            _ => "api_interface",
        }
    }
}

/// Below the midpoint the anchor is full agreement (100), otherwise none (0)
pub fn persuasive_anchor(position: Position) -> u8 {
    if position.value() < Position::MIDPOINT {
        Position::MAX
    } else {
        Position::MIN
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

//! Per-request session variables

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::thesis::ThesisId;

/// Participant's self-rated agreement with the thesis, 0 (none) to 100 (full)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Position(u8);

impl Position {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;
    pub const MIDPOINT: u8 = 50;

    pub fn new(value: i64) -> Result<Self, CoreError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(CoreError::InvalidPosition(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Position {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Position> for u8 {
    fn from(p: Position) -> Self {
        p.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything one request carries about the participant's stance.
///
/// Built fresh per request and never persisted by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionVariables {
    pub thesis_id: ThesisId,
    pub position: Position,
    /// Free-text justification of the position
    pub statement: String,
    /// Opaque correlation token, forwarded to the provider as metadata only
    pub participant_id: Option<String>,
}

impl SessionVariables {
    pub fn new(
        thesis_id: impl Into<ThesisId>,
        position: i64,
        statement: impl Into<String>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            thesis_id: thesis_id.into(),
            position: Position::new(position)?,
            statement: statement.into(),
            participant_id: None,
        })
    }

    pub fn with_participant(mut self, participant_id: Option<String>) -> Self {
        self.participant_id = participant_id.filter(|p| !p.trim().is_empty());
        self
    }
}

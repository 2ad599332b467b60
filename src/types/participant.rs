//! Participant-related types
//!
//! A participant is someone at the table who may share the cost of orders.
//! Participants are addressed by an opaque [`ParticipantId`]; names are kept
//! unique case-insensitively by the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum participant name length, in characters, after trimming
pub const MAX_NAME_CHARS: usize = 30;

/// Participant identifier
///
/// Allocated from a monotonically increasing counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u32);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Opaque identifier
    pub id: ParticipantId,

    /// Display name, trimmed, unique ignoring case
    pub name: String,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Participant {
            id,
            name: name.into(),
        }
    }

    /// Case-folded form of the name used for uniqueness checks and ordering
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }
}

/// Fold a name for case-insensitive comparison
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

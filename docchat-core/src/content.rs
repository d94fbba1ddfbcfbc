//! Conversation content types.

use serde::{Deserialize, Serialize};

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human asking questions.
    User,
    /// The generation service answering them.
    Assistant,
}

/// One message in the ordered session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who authored this turn.
    pub role: Role,
    /// The turn's text content.
    pub content: String,
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A retrieved text span supplied to the generation service to ground
/// its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingDoc {
    /// The grounding text.
    pub text: String,
}

impl GroundingDoc {
    /// Create a grounding document from text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

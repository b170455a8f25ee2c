use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The side that authored a message.
///
/// No other speakers exist in a conversation. The assistant side is
/// spelled `bot`, as the backend spells it; `assistant` is accepted when
/// decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The signed-in end user.
    User,
    /// The recommendation assistant.
    #[serde(rename = "bot", alias = "assistant")]
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "bot"),
        }
    }
}

/// A single entry in a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// The message body.
    pub content: String,
    /// Who wrote it.
    pub role: Role,
}

impl Message {
    /// Creates a user-authored message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            role: Role::User,
        }
    }

    /// Creates an assistant-authored message.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            role: Role::Assistant,
        }
    }
}

use movli_model::{Message, Role};
use serde::{Deserialize, Serialize};

pub const HISTORY_PATH: &str = "/api/chat/history";
pub const CHAT_PATH: &str = "/api/chat";

// ------------------------------
// Types received from the server
// ------------------------------

/// The backend's speaker names. These are the canonical spelling and
/// are mapped onto [`Role`] explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    #[serde(alias = "assistant")]
    Bot,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct HistoryRecord {
    pub role: WireRole,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatRequest<'a> {
    pub prompt: &'a str,
}

// -----------
// Conversions
// -----------

impl From<WireRole> for Role {
    #[inline]
    fn from(role: WireRole) -> Self {
        match role {
            WireRole::User => Role::User,
            WireRole::Bot => Role::Assistant,
        }
    }
}

impl From<HistoryRecord> for Message {
    #[inline]
    fn from(record: HistoryRecord) -> Self {
        Message {
            content: record.content,
            role: record.role.into(),
        }
    }
}

#[inline]
pub fn map_history(records: Vec<HistoryRecord>) -> Vec<Message> {
    records.into_iter().map(Message::from).collect()
}

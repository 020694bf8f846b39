use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::{ASSISTANT_LABEL, USER_LABEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => USER_LABEL,
            Role::Assistant => ASSISTANT_LABEL,
        }
    }
}

/// One conversation turn. Handed out by reference only, so it is never edited after append.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Position in the log, assigned by the log.
    pub ordinal: usize,
    pub role: Role,
    /// Stage the message was produced in.
    pub stage: usize,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only, ordered record of one session's turns.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its ordinal.
    pub fn append(&mut self, role: Role, stage: usize, text: impl Into<String>) -> usize {
        let ordinal = self.messages.len();
        self.messages.push(Message {
            ordinal,
            role,
            stage,
            text: text.into(),
            created_at: Utc::now(),
        });
        ordinal
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, ordinal: usize) -> Option<&Message> {
        self.messages.get(ordinal)
    }

    /// Every message strictly before `ordinal`.
    pub fn before(&self, ordinal: usize) -> &[Message] {
        &self.messages[..ordinal.min(self.messages.len())]
    }

    /// The most recent message of `role` recorded for `stage`.
    pub fn last_for_stage(&self, role: Role, stage: usize) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == role && m.stage == stage)
    }
}

/// Flattens messages into `label：text` lines, oldest first.
pub fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}：{}", m.role.label(), m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

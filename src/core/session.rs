use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::message::{Message, MessageRole};

/// Oldest messages are dropped once the log grows past this.
pub const MAX_MESSAGES: usize = 50;

/// Matches self-introductions like "i'm Alice", "im bob", "my name is Kai",
/// "call me Ray". Deliberately loose: "I'm sorry" captures "sorry" too, and
/// that is accepted as the cost of not maintaining a stopword list.
static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|\s)(?:i'?m|i am|my name is|call me)\s+([a-zA-Z]+)")
        .unwrap()
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub last_art_prompt: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            user_name: None,
            last_art_prompt: None,
        }
    }

    /// Append a message to the log. The first user message that introduces a
    /// name fills `user_name`; once set it never changes. The log keeps only
    /// the newest [`MAX_MESSAGES`] entries.
    pub fn record(&mut self, role: MessageRole, content: impl Into<String>) {
        let content = content.into();

        if role == MessageRole::User && self.user_name.is_none() {
            self.user_name = extract_user_name(&content);
        }

        self.messages.push(Message::new(role, content));
        if self.messages.len() > MAX_MESSAGES {
            let excess = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..excess);
            tracing::debug!(dropped = excess, "session log truncated");
        }
        self.updated_at = Utc::now();
    }

    pub fn set_last_art_prompt(&mut self, prompt: impl Into<String>) {
        self.last_art_prompt = Some(prompt.into());
        self.updated_at = Utc::now();
    }

    /// The newest `n` messages in chronological order.
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub fn extract_user_name(text: &str) -> Option<String> {
    NAME_PATTERN
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

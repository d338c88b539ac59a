//! Conversation Messages
//!
//! Standard message format used across the mentor system, plus the persisted
//! [`Exchange`] record (one user message and the reply it received).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a message sender
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt/instructions
    System,
    /// User input
    User,
    /// Assistant (LLM) response
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text content
    pub content: String,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Estimate token count (rough approximation)
    pub fn estimate_tokens(&self) -> u32 {
        // ~4 characters per token is a rough estimate
        (self.content.len() / 4) as u32 + 4 // +4 for role overhead
    }
}

/// A persisted chat exchange: one user message and the mentor's reply.
///
/// This is the unit the dashboard lists and the mentor replays as context.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exchange {
    /// Unique identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: String,

    /// What the user asked
    pub user_message: String,

    /// What the mentor replied
    pub ai_response: String,

    /// When the exchange completed
    pub created_at: DateTime<Utc>,
}

impl Exchange {
    /// Record a completed exchange
    pub fn new(
        user_id: impl Into<String>,
        user_message: impl Into<String>,
        ai_response: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            user_message: user_message.into(),
            ai_response: ai_response.into(),
            created_at: Utc::now(),
        }
    }

    /// Expand into the user/assistant message pair for provider context
    pub fn to_messages(&self) -> [Message; 2] {
        [
            Message::user(&self.user_message),
            Message::assistant(&self.ai_response),
        ]
    }
}

/// Conversation history with utility methods
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,

    /// Maximum context length (in estimated tokens)
    #[serde(default = "default_max_context")]
    max_context_tokens: u32,
}

fn default_max_context() -> u32 {
    8192
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        let mut conv = Self::new();
        conv.push(Message::system(prompt));
        conv
    }

    /// Add a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Replay persisted exchanges (oldest first) as context
    pub fn push_exchanges<'a>(&mut self, exchanges: impl IntoIterator<Item = &'a Exchange>) {
        for exchange in exchanges {
            let [user, assistant] = exchange.to_messages();
            self.push(user);
            self.push(assistant);
        }
    }

    /// Get all messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the last message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Estimate total tokens in conversation
    pub fn estimate_tokens(&self) -> u32 {
        self.messages.iter().map(|m| m.estimate_tokens()).sum()
    }

    /// Truncate to fit within the token limit, preserving the system prompt
    /// and the most recent messages
    pub fn truncate_to_fit(&mut self) {
        while self.estimate_tokens() > self.max_context_tokens && self.messages.len() > 2 {
            // Find first non-system message and remove it
            if let Some(pos) = self.messages.iter().position(|m| m.role != Role::System) {
                // Don't remove the very last message
                if pos < self.messages.len() - 1 {
                    self.messages.remove(pos);
                } else {
                    break;
                }
            } else {
                break;
            }
        }
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn test_exchange_to_messages() {
        let exchange = Exchange::new("user-1", "What is virtue?", "Virtue is the only good.");
        let [user, assistant] = exchange.to_messages();
        assert_eq!(user.role, Role::User);
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.content, "Virtue is the only good.");
    }

    #[test]
    fn test_conversation_replays_exchanges_in_order() {
        let mut conv = Conversation::with_system_prompt("You are Marcus.");
        let exchanges = vec![
            Exchange::new("user-1", "first", "reply one"),
            Exchange::new("user-1", "second", "reply two"),
        ];
        conv.push_exchanges(&exchanges);
        conv.push(Message::user("third"));

        assert_eq!(conv.len(), 6);
        assert_eq!(conv.messages()[1].content, "first");
        assert_eq!(conv.messages()[4].content, "reply two");
        assert!(conv.last().unwrap().role == Role::User);
    }

    #[test]
    fn test_truncation_keeps_system_and_latest() {
        let mut conv = Conversation {
            messages: Vec::new(),
            max_context_tokens: 40,
        };
        conv.push(Message::system("You are Marcus."));
        for i in 0..10 {
            conv.push(Message::user(format!("message number {}", i)));
        }

        conv.truncate_to_fit();

        assert_eq!(conv.messages()[0].role, Role::System);
        assert_eq!(conv.last().unwrap().content, "message number 9");
        assert!(conv.estimate_tokens() <= 40 || conv.len() == 2);
    }
}

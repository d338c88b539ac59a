//! # memento-core
//!
//! Persona chat engine with a provider-agnostic LLM abstraction.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Mentor                                │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────────────┐ │
//! │  │   Persona   │  │ Conversation │  │   LlmProvider       │ │
//! │  │   Prompt    │──│   Assembly   │──│   (Strategy)        │ │
//! │  └─────────────┘  └──────────────┘  └─────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Ollama, OpenAI, Anthropic,
//! or any other provider without changing the mentor logic. The mentor
//! assembles a persona system prompt plus the user's recent exchanges into a
//! single completion request; persisted exchanges live behind
//! [`history::ChatHistoryStore`].

pub mod provider;
pub mod persona;
pub mod message;
pub mod history;
pub mod error;

pub use error::{CoreError, Result};
pub use history::{ChatHistoryStore, MemoryChatHistory};
pub use message::{Conversation, Exchange, Message, Role};
pub use persona::{Mentor, MentorBuilder, PersonaConfig};
pub use provider::LlmProvider;

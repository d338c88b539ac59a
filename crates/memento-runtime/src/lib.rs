//! # memento-runtime
//!
//! Runtime LLM providers for Memento.
//!
//! ## Providers
//!
//! - **Ollama** (default): Local LLM inference via Ollama
//! - **OpenAI** (coming soon): OpenAI API integration
//! - **Anthropic** (coming soon): Claude API integration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use memento_runtime::OllamaProvider;
//!
//! let provider = OllamaProvider::from_env();
//! let mentor = MentorBuilder::new()
//!     .provider(Arc::new(provider))
//!     .system_prompt(MARCUS_PROMPT)
//!     .build()?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::OllamaProvider;

// Re-export core types for convenience
pub use memento_core::{CoreError, LlmProvider, Mentor, MentorBuilder, Message, Result, Role};

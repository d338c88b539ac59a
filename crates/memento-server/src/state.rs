//! Application State

use std::sync::Arc;

use memento_billing::{MemoryProfileStore, StripeClient};
use memento_core::{LlmProvider, MemoryChatHistory};
use memento_practice::MemoryPracticeStore;

use crate::auth::{AuthKeys, MemoryUserStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// LLM provider (Ollama, etc.)
    pub provider: Arc<dyn LlmProvider>,

    /// Registered users and credentials
    pub users: Arc<MemoryUserStore>,

    /// JWT signing/verification keys
    pub auth: Arc<AuthKeys>,

    /// Profile rows with payment flags
    pub profiles: Arc<MemoryProfileStore>,

    /// Virtue and journal entries
    pub practice: Arc<MemoryPracticeStore>,

    /// Marcus chat history
    pub history: Arc<MemoryChatHistory>,

    /// Stripe client (optional - None if not configured)
    pub stripe: Option<Arc<StripeClient>>,
}

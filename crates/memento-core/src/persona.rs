//! Persona Mentor
//!
//! Assembles the persona system prompt and the user's recent exchanges into
//! a single completion request. Memento's chat has no tool calls, so a turn
//! is: build context, complete, persist the exchange.

use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::message::{Conversation, Exchange, Message};
use crate::provider::{CompletionStream, GenerationOptions, LlmProvider};

/// Mentor configuration
#[derive(Clone, Debug)]
pub struct PersonaConfig {
    /// System prompt establishing the persona
    pub system_prompt: String,

    /// Extra context notes appended to the system prompt (e.g. the user's
    /// latest virtue focus)
    pub context_notes: Vec<String>,

    /// How many recent exchanges to replay as context
    pub max_context_exchanges: usize,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            context_notes: Vec::new(),
            max_context_exchanges: 10,
            generation: GenerationOptions::default(),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a thoughtful Stoic mentor.
Answer briefly, concretely, and with equanimity. Draw on Stoic practice —
the dichotomy of control, the view from above, negative visualization —
only where it serves the question. Never lecture; converse."#;

/// The persona mentor
pub struct Mentor {
    provider: Arc<dyn LlmProvider>,
    config: PersonaConfig,
}

impl Mentor {
    /// Create a new mentor
    pub fn new(provider: Arc<dyn LlmProvider>, config: PersonaConfig) -> Self {
        Self { provider, config }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>) -> Self {
        Self::new(provider, PersonaConfig::default())
    }

    /// Build the full system prompt including context notes
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        for note in &self.config.context_notes {
            prompt.push_str("\n\n");
            prompt.push_str(note);
        }

        prompt
    }

    /// Assemble the conversation for a turn.
    ///
    /// `recent` may be in any order; it is replayed chronologically, capped
    /// at `max_context_exchanges`, then trimmed to the context budget.
    fn assemble(&self, recent: &[Exchange], message: &str) -> Conversation {
        let mut exchanges: Vec<&Exchange> = recent.iter().collect();
        exchanges.sort_by_key(|e| e.created_at);

        let skip = exchanges
            .len()
            .saturating_sub(self.config.max_context_exchanges);

        let mut conversation = Conversation::with_system_prompt(self.build_system_prompt());
        conversation.push_exchanges(exchanges.into_iter().skip(skip));
        conversation.push(Message::user(message));
        conversation.truncate_to_fit();
        conversation
    }

    /// Produce a reply to `message`, given the user's recent exchanges
    pub async fn reply(&self, recent: &[Exchange], message: &str) -> Result<String> {
        let conversation = self.assemble(recent, message);

        tracing::debug!(
            context_messages = conversation.len(),
            model = %self.config.generation.model,
            "Requesting mentor completion"
        );

        let completion = self
            .provider
            .complete(conversation.messages(), &self.config.generation)
            .await?;

        Ok(completion.content)
    }

    /// Produce a streaming reply to `message`
    pub async fn reply_stream(
        &self,
        recent: &[Exchange],
        message: &str,
    ) -> Result<CompletionStream> {
        let conversation = self.assemble(recent, message);

        self.provider
            .complete_stream(conversation.messages(), &self.config.generation)
            .await
    }

    /// One-shot question with no prior history
    pub async fn ask(&self, question: &str) -> Result<String> {
        self.reply(&[], question).await
    }

    /// Get configuration
    pub fn config(&self) -> &PersonaConfig {
        &self.config
    }
}

/// Builder for Mentor configuration
pub struct MentorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    config: PersonaConfig,
}

impl Default for MentorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MentorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            config: PersonaConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn context_note(mut self, note: impl Into<String>) -> Self {
        self.config.context_notes.push(note.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    pub fn max_context_exchanges(mut self, max: usize) -> Self {
        self.config.max_context_exchanges = max;
        self
    }

    pub fn build(self) -> Result<Mentor> {
        let provider = self
            .provider
            .ok_or_else(|| CoreError::Config("Provider is required".into()))?;

        Ok(Mentor::new(provider, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::provider::{Completion, FinishReason, ModelInfo};
    use async_trait::async_trait;

    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> Result<Completion> {
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(Completion {
                content: format!("echo: {}", last),
                model: options.model.clone(),
                usage: None,
                truncated: false,
                finish_reason: Some(FinishReason::Stop),
            })
        }

        async fn complete_stream(
            &self,
            _messages: &[Message],
            _options: &GenerationOptions,
        ) -> Result<CompletionStream> {
            Err(CoreError::Provider("streaming not supported".into()))
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_assemble_orders_and_caps_context() {
        let mentor = MentorBuilder::new()
            .provider(Arc::new(EchoProvider))
            .system_prompt("You are Marcus.")
            .max_context_exchanges(2)
            .build()
            .unwrap();

        // Newest-first, as stores return them
        let mut recent = vec![
            Exchange::new("u", "third", "r3"),
            Exchange::new("u", "second", "r2"),
            Exchange::new("u", "first", "r1"),
        ];
        recent[0].created_at = chrono::Utc::now();
        recent[1].created_at = chrono::Utc::now() - chrono::Duration::minutes(1);
        recent[2].created_at = chrono::Utc::now() - chrono::Duration::minutes(2);

        let conversation = mentor.assemble(&recent, "now");

        // system + 2 exchanges (2 msgs each) + current user message
        assert_eq!(conversation.len(), 6);
        assert_eq!(conversation.messages()[0].role, Role::System);
        assert_eq!(conversation.messages()[1].content, "second");
        assert_eq!(conversation.last().unwrap().content, "now");
    }

    #[tokio::test]
    async fn test_reply_uses_latest_message() {
        let mentor = Mentor::with_defaults(Arc::new(EchoProvider));
        let reply = mentor.ask("What is justice?").await.unwrap();
        assert_eq!(reply, "echo: What is justice?");
    }

    #[test]
    fn test_builder_requires_provider() {
        assert!(MentorBuilder::new().build().is_err());
    }

    #[test]
    fn test_context_notes_append_to_prompt() {
        let mentor = MentorBuilder::new()
            .provider(Arc::new(EchoProvider))
            .system_prompt("Base.")
            .context_note("Today's focus: temperance.")
            .build()
            .unwrap();

        let prompt = mentor.build_system_prompt();
        assert!(prompt.starts_with("Base."));
        assert!(prompt.contains("temperance"));
    }
}

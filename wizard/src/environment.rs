//! Environments injected into the wizard reducers
//!
//! Production implementations live here; tests swap in
//! `feastflow_testing` mocks.

use feastflow_anthropic::{AnthropicClient, ClaudeError, MessagesRequest, types::Message};
use feastflow_core::{
    environment::{Clock, SystemClock},
    generation::{GenerationError, GenerationPrompt, TextGenerator},
};
use futures::future::BoxFuture;
use rand::{Rng, distributions::Alphanumeric};
use std::sync::Arc;

use crate::config::{GenerationConfig, WizardConfig};

/// Text generator backed by the Anthropic Messages API
#[derive(Clone, Debug)]
pub struct AnthropicTextGenerator {
    client: Arc<AnthropicClient>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicTextGenerator {
    /// Create a generator from a client and generation settings
    #[must_use]
    pub fn new(client: AnthropicClient, config: &GenerationConfig) -> Self {
        Self {
            client: Arc::new(client),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Create a generator when an API key is configured
    ///
    /// # Errors
    ///
    /// Returns `ClaudeError::MissingApiKey` if no key is configured, or
    /// `ClaudeError::ClientBuild` if the HTTP client cannot be built.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, ClaudeError> {
        let key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ClaudeError::MissingApiKey)?;
        let client = AnthropicClient::new(key).with_timeout(config.timeout())?;
        Ok(Self::new(client, config))
    }
}

impl TextGenerator for AnthropicTextGenerator {
    fn generate(
        &self,
        prompt: GenerationPrompt,
    ) -> BoxFuture<'static, Result<String, GenerationError>> {
        let client = Arc::clone(&self.client);
        let request = MessagesRequest::new(vec![Message::user(prompt.user)])
            .with_system(prompt.system)
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        Box::pin(async move {
            let response = client
                .messages(request)
                .await
                .map_err(|e| GenerationError::Failed(e.to_string()))?;
            let text = response.text();
            if text.is_empty() {
                Err(GenerationError::Empty)
            } else {
                Ok(text)
            }
        })
    }
}

/// Dependencies of the content reducer
#[derive(Clone)]
pub struct ContentEnvironment {
    /// Live generator, if configured
    pub generator: Option<Arc<dyn TextGenerator>>,
    /// Generation settings (timeout, labeling)
    pub config: GenerationConfig,
}

impl ContentEnvironment {
    /// Create an environment
    #[must_use]
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, config: GenerationConfig) -> Self {
        Self { generator, config }
    }

    /// Environment for the configured deployment
    ///
    /// Uses the Anthropic generator when an API key is set, templates otherwise.
    #[must_use]
    pub fn from_config(config: &WizardConfig) -> Self {
        let generator = match AnthropicTextGenerator::from_config(&config.generation) {
            Ok(generator) => Some(Arc::new(generator) as Arc<dyn TextGenerator>),
            Err(error) => {
                tracing::info!(
                    %error,
                    "Live generation disabled, content will come from templates"
                );
                None
            },
        };
        Self::new(generator, config.generation.clone())
    }
}

impl std::fmt::Debug for ContentEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentEnvironment")
            .field("live", &self.generator.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Source of random reference codes (booking ids, invite links)
pub trait ReferenceSource: Send + Sync {
    /// `len` random uppercase alphanumeric characters
    fn reference(&self, len: usize) -> String;
}

/// [`ReferenceSource`] backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomReferences;

impl ReferenceSource for RandomReferences {
    fn reference(&self, len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect()
    }
}

/// Dependencies of the booking reducer
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Confirmation timestamps
    pub clock: Arc<dyn Clock>,
    /// Booking ids and invite links
    pub references: Arc<dyn ReferenceSource>,
}

impl BookingEnvironment {
    /// Create an environment
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, references: Arc<dyn ReferenceSource>) -> Self {
        Self { clock, references }
    }
}

impl Default for BookingEnvironment {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomReferences))
    }
}

/// Dependencies of the event creation reducer
#[derive(Clone)]
pub struct CreateEventEnvironment {
    /// Content drafting
    pub content: ContentEnvironment,
    /// Publication timestamps
    pub clock: Arc<dyn Clock>,
}

impl CreateEventEnvironment {
    /// Create an environment
    #[must_use]
    pub fn new(content: ContentEnvironment, clock: Arc<dyn Clock>) -> Self {
        Self { content, clock }
    }
}

impl std::fmt::Debug for CreateEventEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateEventEnvironment")
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

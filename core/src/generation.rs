//! Text generation collaborator
//!
//! The content assistant can ask an external service to write an event title,
//! description, or marketing copy. The core only knows the shape of that
//! exchange: a system prompt and a user prompt go in, text or an error comes
//! out. Callers must be ready to fall back when it fails.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `(system prompt, user prompt)` pair sent to a text generator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPrompt {
    /// Instructions describing the assistant's role
    pub system: String,
    /// The concrete request
    pub user: String,
}

impl GenerationPrompt {
    /// Create a prompt
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Why a generation attempt produced no usable text
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// No generator is configured (e.g. no API key)
    #[error("text generation is not configured")]
    Unavailable,

    /// The generator did not answer within the allotted time
    #[error("text generation timed out after {0} ms")]
    TimedOut(u64),

    /// The generator answered with nothing usable
    #[error("text generation returned empty content")]
    Empty,

    /// The generator failed
    #[error("text generation failed: {0}")]
    Failed(String),
}

/// An external text generation service
///
/// Implementations make a single attempt per call. Retries, timeouts, and
/// fallbacks belong to the caller.
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt
    fn generate(
        &self,
        prompt: GenerationPrompt,
    ) -> BoxFuture<'static, Result<String, GenerationError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl TextGenerator for Echo {
        fn generate(
            &self,
            prompt: GenerationPrompt,
        ) -> BoxFuture<'static, Result<String, GenerationError>> {
            Box::pin(async move { Ok(prompt.user) })
        }
    }

    #[test]
    fn test_generator_object_safety() {
        let generator: Box<dyn TextGenerator> = Box::new(Echo);
        let text = tokio_test::block_on(generator.generate(GenerationPrompt::new("sys", "hello")));
        assert_eq!(text, Ok("hello".to_string()));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GenerationError::TimedOut(250).to_string(),
            "text generation timed out after 250 ms"
        );
        assert_eq!(
            GenerationError::Unavailable.to_string(),
            "text generation is not configured"
        );
    }
}

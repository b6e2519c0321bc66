//! Two-tier generation: live generator first, templates on any failure

use feastflow_core::generation::{GenerationError, GenerationPrompt, TextGenerator};
use std::sync::Arc;
use std::time::Duration;

use super::{ContentKind, GeneratedContent, GenerationContext, fallback};

/// Draft content, trying the generator once within `timeout`
///
/// Never fails: no generator, an error, an empty reply, or a timeout all
/// produce template content instead.
pub async fn generate_with_fallback(
    generator: Option<Arc<dyn TextGenerator>>,
    kind: ContentKind,
    context: GenerationContext,
    prompt: GenerationPrompt,
    timeout: Duration,
) -> GeneratedContent {
    let Some(generator) = generator else {
        tracing::debug!(%kind, "No text generator configured, using templates");
        return GeneratedContent::fallback(fallback::generate(kind, &context));
    };

    let error = match tokio::time::timeout(timeout, generator.generate(prompt)).await {
        Ok(Ok(text)) if !text.trim().is_empty() => {
            tracing::debug!(%kind, "Live generation succeeded");
            return GeneratedContent::live(text.trim());
        },
        Ok(Ok(_)) => GenerationError::Empty,
        Ok(Err(error)) => error,
        Err(_) => GenerationError::TimedOut(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
    };

    tracing::warn!(%kind, %error, "Live generation failed, using templates");
    GeneratedContent::fallback(fallback::generate(kind, &context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentSource, prompts};
    use feastflow_testing::{Reply, ScriptedGenerator};

    fn context() -> GenerationContext {
        GenerationContext::new("Food Festival", "Koramangala", "Harvest Table")
    }

    async fn run(generator: Option<ScriptedGenerator>, timeout_ms: u64) -> GeneratedContent {
        let generator = generator.map(|g| Arc::new(g) as Arc<dyn TextGenerator>);
        generate_with_fallback(
            generator,
            ContentKind::Title,
            context(),
            prompts::prompt_for(ContentKind::Title, &context()),
            Duration::from_millis(timeout_ms),
        )
        .await
    }

    #[tokio::test]
    async fn test_live_reply_is_trimmed() {
        let generator = ScriptedGenerator::replying(["  Harvest Table Night \n"]);
        let content = run(Some(generator), 500).await;
        assert_eq!(content, GeneratedContent::live("Harvest Table Night"));
    }

    #[tokio::test]
    async fn test_failures_fall_back_to_templates() {
        let expected = fallback::generate(ContentKind::Title, &context());

        for generator in [
            None,
            Some(ScriptedGenerator::failing()),
            Some(ScriptedGenerator::replying(["   "])),
            Some(ScriptedGenerator::new([Reply::Fail(GenerationError::Failed(
                "overloaded".into(),
            ))])),
        ] {
            let content = run(generator, 500).await;
            assert_eq!(content.source, ContentSource::Fallback);
            assert_eq!(content.text, expected);
        }
    }

    #[tokio::test]
    async fn test_stalled_generator_times_out() {
        let started = std::time::Instant::now();
        let content = run(Some(ScriptedGenerator::stalled()), 50).await;
        assert_eq!(content.source, ContentSource::Fallback);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}

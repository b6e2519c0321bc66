//! Content reducer
//!
//! Each kind has at most one request in flight. A new request for a kind
//! replaces the running one, and a result that arrives for anything but the
//! latest request is dropped.

use feastflow_core::{
    SmallVec, effect::Effect, generation::GenerationPrompt, reducer::Reducer, smallvec,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    ContentKind, GeneratedContent, GeneratedContentResult, GenerationContext, SourceLabeling,
    generate_with_fallback, prompts,
};
use crate::environment::ContentEnvironment;

/// Content intents and results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentAction {
    /// Draft content of a kind
    Generate {
        /// Kind to draft
        kind: ContentKind,
        /// What it is about
        context: GenerationContext,
        /// Prompt to send instead of the default one for the kind
        prompt: Option<GenerationPrompt>,
    },
    /// A draft finished (produced by the generation effect)
    Generated {
        /// Kind drafted
        kind: ContentKind,
        /// Request this answers
        request_id: u64,
        /// The draft
        content: GeneratedContent,
    },
    /// Abandon the in-flight request for a kind
    Cancel {
        /// Kind to cancel
        kind: ContentKind,
    },
    /// Replace content with the user's own text
    Overwrite {
        /// Kind to replace
        kind: ContentKind,
        /// New text
        text: String,
    },
    /// Drop content (and any request in flight) for one kind, or all when `None`
    Clear {
        /// Kind to clear
        kind: Option<ContentKind>,
    },
}

impl ContentAction {
    /// Draft with the default prompt for the kind
    #[must_use]
    pub const fn generate(kind: ContentKind, context: GenerationContext) -> Self {
        Self::Generate {
            kind,
            context,
            prompt: None,
        }
    }
}

/// Drafted content and requests in flight
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentState {
    /// Latest content per kind
    pub results: GeneratedContentResult,
    pending: BTreeMap<ContentKind, u64>,
    next_request_id: u64,
}

impl ContentState {
    /// Whether a request for this kind is in flight
    #[must_use]
    pub fn is_generating(&self, kind: ContentKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// Whether any request is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Whether `request_id` is the latest request for `kind`
    #[must_use]
    pub fn is_current(&self, kind: ContentKind, request_id: u64) -> bool {
        self.pending.get(&kind) == Some(&request_id)
    }

    /// Text for a kind
    #[must_use]
    pub fn text(&self, kind: ContentKind) -> Option<&str> {
        self.results.get(kind).map(|c| c.text.as_str())
    }

    /// Text for a kind with its provenance label
    #[must_use]
    pub fn labelled(
        &self,
        kind: ContentKind,
        labeling: SourceLabeling,
    ) -> Option<(&str, &'static str)> {
        self.results
            .get(kind)
            .map(|c| (c.text.as_str(), labeling.label(c.source)))
    }

    fn cancel(&mut self, kind: ContentKind) -> Option<Effect<ContentAction>> {
        self.pending
            .remove(&kind)
            .map(|_| Effect::Cancel(kind.effect_id()))
    }
}

/// Reducer for [`ContentState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentReducer;

impl Reducer for ContentReducer {
    type State = ContentState;
    type Action = ContentAction;
    type Environment = ContentEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ContentAction::Generate {
                kind,
                context,
                prompt,
            } => {
                state.next_request_id += 1;
                let request_id = state.next_request_id;
                let replaced = state.pending.insert(kind, request_id);
                tracing::debug!(%kind, request_id, replaced = ?replaced, "Content requested");

                let prompt = prompt.unwrap_or_else(|| prompts::prompt_for(kind, &context));
                let generator = env.generator.clone();
                let timeout = env.config.timeout();

                smallvec![Effect::Cancellable {
                    id: kind.effect_id(),
                    future: Box::pin(async move {
                        let content =
                            generate_with_fallback(generator, kind, context, prompt, timeout).await;
                        Some(ContentAction::Generated {
                            kind,
                            request_id,
                            content,
                        })
                    }),
                }]
            },
            ContentAction::Generated {
                kind,
                request_id,
                content,
            } => {
                if state.is_current(kind, request_id) {
                    state.pending.remove(&kind);
                    tracing::info!(
                        %kind,
                        request_id,
                        label = env.config.source_labeling.label(content.source),
                        "Content ready"
                    );
                    state.results.insert(kind, content);
                } else {
                    tracing::debug!(%kind, request_id, "Dropped stale content");
                }
                smallvec![Effect::None]
            },
            ContentAction::Cancel { kind } => match state.cancel(kind) {
                Some(effect) => {
                    tracing::debug!(%kind, "Content request cancelled");
                    smallvec![effect]
                },
                None => smallvec![Effect::None],
            },
            ContentAction::Overwrite { kind, text } => {
                let cancel = state.cancel(kind);
                state.results.insert(kind, GeneratedContent::manual(text));
                smallvec![cancel.unwrap_or(Effect::None)]
            },
            ContentAction::Clear { kind } => {
                let kinds: Vec<ContentKind> =
                    kind.map_or_else(|| ContentKind::ALL.to_vec(), |k| vec![k]);
                let mut effects: SmallVec<[Effect<ContentAction>; 4]> = SmallVec::new();
                for kind in kinds {
                    state.results.remove(kind);
                    if let Some(effect) = state.cancel(kind) {
                        effects.push(effect);
                    }
                }
                if effects.is_empty() {
                    effects.push(Effect::None);
                }
                effects
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::content::ContentSource;
    use feastflow_testing::{ReducerTest, assertions};

    fn env() -> ContentEnvironment {
        ContentEnvironment::new(None, GenerationConfig::default())
    }

    fn context() -> GenerationContext {
        GenerationContext::new("Food Festival", "Koramangala", "")
    }

    #[test]
    fn test_generate_starts_cancellable_request() {
        ReducerTest::new(ContentReducer)
            .with_env(env())
            .given_state(ContentState::default())
            .when_action(ContentAction::generate(ContentKind::Title, context()))
            .then_state(|state| {
                assert!(state.is_generating(ContentKind::Title));
                assert!(state.is_current(ContentKind::Title, 1));
            })
            .then_effects(|effects| {
                assertions::assert_has_cancellable_effect(effects, "content-title");
            })
            .run();
    }

    #[test]
    fn test_stale_result_is_dropped() {
        ReducerTest::new(ContentReducer)
            .with_env(env())
            .given_state(ContentState::default())
            .when_actions([
                ContentAction::generate(ContentKind::Title, context()),
                ContentAction::generate(ContentKind::Title, context()),
                ContentAction::Generated {
                    kind: ContentKind::Title,
                    request_id: 1,
                    content: GeneratedContent::live("First"),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.text(ContentKind::Title), None);
                assert!(state.is_current(ContentKind::Title, 2));
            })
            .run();
    }

    #[test]
    fn test_latest_result_is_kept_and_labelled() {
        ReducerTest::new(ContentReducer)
            .with_env(env())
            .given_state(ContentState::default())
            .when_actions([
                ContentAction::generate(ContentKind::Title, context()),
                ContentAction::Generated {
                    kind: ContentKind::Title,
                    request_id: 1,
                    content: GeneratedContent::fallback("Taste of Koramangala"),
                },
            ])
            .then_state(|state| {
                assert!(!state.is_busy());
                assert_eq!(
                    state.labelled(ContentKind::Title, SourceLabeling::Disclose),
                    Some(("Taste of Koramangala", "Generated from smart templates"))
                );
            })
            .run();
    }

    #[test]
    fn test_cancel_emits_cancel_effect_only_when_pending() {
        ReducerTest::new(ContentReducer)
            .with_env(env())
            .given_state(ContentState::default())
            .when_actions([
                ContentAction::generate(ContentKind::Marketing, context()),
                ContentAction::Cancel {
                    kind: ContentKind::Marketing,
                },
            ])
            .then_state(|state| assert!(!state.is_busy()))
            .then_effects(|effects| {
                assertions::assert_has_cancel_effect(effects, "content-marketing");
            })
            .run();

        ReducerTest::new(ContentReducer)
            .with_env(env())
            .given_state(ContentState::default())
            .when_action(ContentAction::Cancel {
                kind: ContentKind::Marketing,
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_overwrite_and_clear() {
        ReducerTest::new(ContentReducer)
            .with_env(env())
            .given_state(ContentState::default())
            .when_actions([
                ContentAction::Overwrite {
                    kind: ContentKind::Description,
                    text: "Our own words".into(),
                },
                ContentAction::Overwrite {
                    kind: ContentKind::Title,
                    text: "Our title".into(),
                },
                ContentAction::Clear {
                    kind: Some(ContentKind::Title),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.text(ContentKind::Title), None);
                let kept = state.results.get(ContentKind::Description).map(|c| c.source);
                assert_eq!(kept, Some(ContentSource::Manual));
            })
            .run();
    }
}

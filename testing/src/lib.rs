//! # Feastflow Testing
//!
//! Testing utilities and helpers for Feastflow wizards.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (clock, text generator)
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use feastflow_testing::{ScriptedGenerator, test_clock};
//! use feastflow_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_title_generation() {
//!     let generator = ScriptedGenerator::replying(["Harvest Table Night"]);
//!     let env = ContentEnvironment::new(Arc::new(generator), config);
//!     let store = Store::new(ContentState::default(), ContentReducer, env);
//!
//!     store.send(ContentAction::Generate { kind: ContentKind::Title, context }).await?;
//! }
//! ```

use chrono::{DateTime, Utc};
use feastflow_core::environment::Clock;

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use feastflow_core::generation::{GenerationError, GenerationPrompt, TextGenerator};
    use futures::future::BoxFuture;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use feastflow_testing::mocks::FixedClock;
    /// use feastflow_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which never happens.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// One scripted answer from a [`ScriptedGenerator`]
    #[derive(Debug, Clone)]
    pub enum Reply {
        /// Answer immediately with this text
        Text(String),
        /// Answer with this text after a delay
        Delayed(Duration, String),
        /// Fail with this error
        Fail(GenerationError),
        /// Never answer
        Stall,
    }

    /// Text generator that plays back a script
    ///
    /// Each call consumes the next [`Reply`]. Once the script runs out every
    /// call fails with [`GenerationError::Unavailable`]. Prompts are recorded
    /// so tests can check what was asked.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedGenerator {
        script: Arc<Mutex<VecDeque<Reply>>>,
        prompts: Arc<Mutex<Vec<GenerationPrompt>>>,
    }

    impl ScriptedGenerator {
        /// Create a generator with the given script
        #[must_use]
        pub fn new(script: impl IntoIterator<Item = Reply>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into_iter().collect())),
                prompts: Arc::default(),
            }
        }

        /// Create a generator that answers with these texts in order
        #[must_use]
        pub fn replying<I, T>(texts: I) -> Self
        where
            I: IntoIterator<Item = T>,
            T: Into<String>,
        {
            Self::new(texts.into_iter().map(|t| Reply::Text(t.into())))
        }

        /// Create a generator that always fails
        #[must_use]
        pub fn failing() -> Self {
            Self::default()
        }

        /// Create a generator that never answers
        #[must_use]
        pub fn stalled() -> Self {
            Self::new(std::iter::repeat_n(Reply::Stall, 64))
        }

        /// Prompts received so far
        #[must_use]
        pub fn prompts(&self) -> Vec<GenerationPrompt> {
            self.prompts
                .lock()
                .map(|p| p.clone())
                .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
        }

        /// Number of calls received so far
        #[must_use]
        pub fn calls(&self) -> usize {
            self.prompts().len()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(
            &self,
            prompt: GenerationPrompt,
        ) -> BoxFuture<'static, Result<String, GenerationError>> {
            match self.prompts.lock() {
                Ok(mut prompts) => prompts.push(prompt),
                Err(poisoned) => poisoned.into_inner().push(prompt),
            }
            let next = match self.script.lock() {
                Ok(mut script) => script.pop_front(),
                Err(poisoned) => poisoned.into_inner().pop_front(),
            };

            Box::pin(async move {
                match next {
                    Some(Reply::Text(text)) => Ok(text),
                    Some(Reply::Delayed(delay, text)) => {
                        tokio::time::sleep(delay).await;
                        Ok(text)
                    },
                    Some(Reply::Fail(error)) => Err(error),
                    Some(Reply::Stall) => futures::future::pending().await,
                    None => Err(GenerationError::Unavailable),
                }
            })
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, Reply, ScriptedGenerator, test_clock};

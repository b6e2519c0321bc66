//! Configuration
//!
//! Environment-based configuration with validation. Secrets are read from the
//! process environment and never serialized.
//!
//! # Example
//!
//! ```no_run
//! use feastflow_wizard::config::WizardConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads FEASTFLOW_ENV (defaults to development) and the overrides
//! let config = WizardConfig::from_env()?;
//! println!("Generation timeout: {:?}", config.generation.timeout());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::content::SourceLabeling;

/// Configuration error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid environment value
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// An override could not be parsed
    #[error("Failed to parse {var}: {reason}")]
    Parse {
        /// Variable name
        var: String,
        /// What was wrong
        reason: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    Development,
    /// Pre-production
    Staging,
    /// Production
    Production,
}

impl Environment {
    /// Parse an environment name
    ///
    /// # Errors
    ///
    /// Returns error if the name is not recognised
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }

    /// Check if this is production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Content generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model used for live generation
    pub model: String,
    /// Maximum tokens per reply
    pub max_tokens: u32,
    /// Sampling temperature (0.0-1.0)
    pub temperature: f32,
    /// How long to wait for the live generator before using templates
    pub timeout_ms: u64,
    /// How content provenance is shown
    pub source_labeling: SourceLabeling,
    /// Anthropic API key (from environment variable for security)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl GenerationConfig {
    /// Validate generation configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation("model cannot be empty".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Validation("max_tokens must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(
                "temperature must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation("timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Whether live generation can be attempted
    #[must_use]
    pub fn live_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: feastflow_anthropic::messages::DEFAULT_MODEL.to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_ms: 8_000,
            source_labeling: SourceLabeling::Disclose,
            api_key: None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Content generation configuration
    pub generation: GenerationConfig,
}

impl WizardConfig {
    /// Load configuration from the process environment
    ///
    /// Reads `FEASTFLOW_ENV` (defaults to "development"), the
    /// `FEASTFLOW_GENERATION_TIMEOUT_MS`, `FEASTFLOW_MODEL`, and
    /// `FEASTFLOW_SOURCE_LABELING` overrides, and `ANTHROPIC_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns error if configuration cannot be loaded or is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns error if configuration cannot be loaded or is invalid
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("FEASTFLOW_ENV")
            .map_or(Ok(Environment::Development), |s| Environment::parse(&s))?;
        let mut config = Self::load(environment);
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults for an environment, before overrides and secrets
    #[must_use]
    pub fn load(environment: Environment) -> Self {
        let mut config = Self {
            environment,
            generation: GenerationConfig::default(),
        };

        // Environment-specific overrides
        match environment {
            Environment::Development => {
                config.generation.timeout_ms = 10_000;
            },
            Environment::Staging => {
                config.generation.timeout_ms = 8_000;
            },
            Environment::Production => {
                config.generation.timeout_ms = 5_000;
            },
        }

        config
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("FEASTFLOW_GENERATION_TIMEOUT_MS") {
            self.generation.timeout_ms =
                raw.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::Parse {
                    var: "FEASTFLOW_GENERATION_TIMEOUT_MS".to_string(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(model) = lookup("FEASTFLOW_MODEL") {
            self.generation.model = model;
        }
        if let Some(raw) = lookup("FEASTFLOW_SOURCE_LABELING") {
            self.generation.source_labeling =
                raw.parse().map_err(|reason| ConfigError::Parse {
                    var: "FEASTFLOW_SOURCE_LABELING".to_string(),
                    reason,
                })?;
        }

        // Secrets
        self.generation.api_key = lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty());
        if self.generation.api_key.is_none() && self.environment.is_production() {
            tracing::warn!("ANTHROPIC_API_KEY not set, content will come from templates");
        }

        Ok(())
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first validation failure
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generation.validate()
    }
}

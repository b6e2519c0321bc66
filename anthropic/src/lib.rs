//! # Anthropic Claude API Client
//!
//! Minimal client for the Anthropic Messages API, used to draft event
//! titles, descriptions, and marketing copy.
//!
//! ## Example
//!
//! ```no_run
//! use feastflow_anthropic::{AnthropicClient, MessagesRequest};
//! use feastflow_anthropic::types::Message;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create client from ANTHROPIC_API_KEY environment variable
//!     let client = AnthropicClient::from_env()?;
//!
//!     let request = MessagesRequest::new(vec![
//!         Message::user("Suggest a title for a harvest dinner")
//!     ])
//!     .with_system("You write short, catchy event titles.");
//!
//!     let response = client.messages(request).await?;
//!     println!("{}", response.text());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod messages;
pub mod types;

// Re-export main types for convenience
pub use client::AnthropicClient;
pub use error::ClaudeError;
pub use messages::{MessagesRequest, MessagesResponse};
pub use types::{ContentBlock, Message, Role, StopReason, Usage};

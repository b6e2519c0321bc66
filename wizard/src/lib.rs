//! Feastflow Wizards
//!
//! Multi-step flows for the events feature: booking a dinner + event bundle,
//! creating an event, and the smart prompt assistant that drafts event copy.
//!
//! ## Architecture
//!
//! - **Flow definitions** ([`flow`]): steps, field rules, and a decision table
//!   choosing the next step, checked once when built
//! - **Sessions** ([`session`]): one serializable value per flow instance,
//!   owned by the caller
//! - **Reducers**: [`reducer::WizardReducer`] handles field edits and
//!   navigation for any flow; [`booking`], [`create_event`], and
//!   [`prompt_wizard`] embed it and add their own intents
//! - **Content** ([`content`]): live generation with a strict timeout and a
//!   deterministic template fallback, keyed per kind with last-write-wins
//!
//! ## Example
//!
//! ```ignore
//! use feastflow_runtime::Store;
//! use feastflow_wizard::booking::{BookingAction, BookingReducer, Package};
//! use feastflow_wizard::environment::BookingEnvironment;
//!
//! let reducer = BookingReducer::new()?;
//! let store = Store::new(reducer.initial_state(), reducer, BookingEnvironment::default());
//! store.send(BookingAction::SelectPackage(Package::Bundle)).await?;
//! ```

#![allow(clippy::format_push_string, clippy::missing_const_for_fn)]

pub mod booking;
pub mod config;
pub mod content;
pub mod create_event;
pub mod environment;
pub mod flow;
pub mod prompt_wizard;
pub mod reducer;
pub mod session;

pub use config::{ConfigError, WizardConfig};
pub use flow::{FieldCheck, FieldRule, FlowDefinition, FlowError, Guard};
pub use reducer::{WizardAction, WizardReducer, WizardState};
pub use session::{FieldError, FieldMap, StepOutcome, StepView, ValidationErrors, WizardSession};

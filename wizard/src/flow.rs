//! Flow definitions
//!
//! A flow is data: an ordered set of steps, the field rules each step must
//! satisfy before the user may move on, and a decision table choosing the
//! next step from what has been collected so far. Definitions are checked
//! once when built so that a running session can never reach a step the flow
//! does not declare.
//!
//! ```ignore
//! let flow = FlowDefinition::builder("booking")
//!     .step(Step::Package, "Choose a package", |s| {
//!         s.field(FieldRule::new("packageType").required().one_of(["bundle", "event-only"]))
//!             .when(Guard::equals("packageType", "bundle"), Step::Timing)
//!             .otherwise(Step::Form)
//!     })
//!     .step(Step::Timing, "Pick a dinner slot", |s| s.otherwise(Step::Form))
//!     .step(Step::Form, "Your details", |s| s)
//!     .terminal(Step::Form)
//!     .build()?;
//! ```

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

use crate::session::{FieldError, FieldMap, ValidationErrors};

/// Identifier of a step within a flow
///
/// Implemented for any small `Copy` enum that can be serialized.
pub trait StepId:
    Copy + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> StepId for T where
    T: Copy + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Errors in a flow definition or in finalizing a session against it
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// The flow declares no steps
    #[error("flow {0:?} declares no steps")]
    Empty(String),

    /// A step is declared twice
    #[error("step {0} is declared more than once")]
    DuplicateStep(String),

    /// The entry, terminal, or a transition target is not a declared step
    #[error("step {0} is referenced but never declared")]
    UnknownStep(String),

    /// No terminal step was declared
    #[error("flow {0:?} has no terminal step")]
    MissingTerminal(String),

    /// The terminal step has outgoing transitions
    #[error("terminal step {0} must not have transitions")]
    TerminalHasTransitions(String),

    /// A non-terminal step could end up with no next step
    #[error("step {0} needs an unconditional fallback transition")]
    MissingFallback(String),

    /// The session has not reached the terminal step
    #[error("flow is not complete, current step is {0}")]
    Incomplete(String),

    /// Collected data cannot be turned into the finished result
    #[error("field {field} is invalid: {reason}")]
    InvalidField {
        /// Field name
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

/// A single check applied to a field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCheck {
    /// The field must be present and not null
    Required,
    /// A present string must contain something other than whitespace
    NonBlank,
    /// A present value must be one of these strings
    OneOf(Vec<String>),
    /// A present value must be a whole number of at least 1 (number or numeric string)
    PositiveInteger,
    /// A present whole number must not exceed this
    AtMost(u64),
    /// A present value must look like an email address
    Email,
    /// A present value must look like a phone number
    Phone,
    /// A present value must be `true` or `false`
    Boolean,
    /// A present value must be a list whose items all carry these non-blank keys
    EachHas(Vec<String>),
}

impl FieldCheck {
    /// Run the check, returning a human readable message on failure
    ///
    /// Every check except [`FieldCheck::Required`] passes when the value is absent.
    ///
    /// # Errors
    ///
    /// Returns the failure message.
    pub fn check(&self, value: Option<&Value>) -> Result<(), String> {
        let value = match value {
            None | Some(Value::Null) => {
                return if matches!(self, Self::Required) {
                    Err("is required".to_string())
                } else {
                    Ok(())
                };
            },
            Some(value) => value,
        };

        match self {
            Self::Required => Ok(()),
            Self::NonBlank => match value {
                Value::String(s) if s.trim().is_empty() => Err("must not be blank".to_string()),
                _ => Ok(()),
            },
            Self::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => Ok(()),
                _ => Err(format!("must be one of: {}", allowed.join(", "))),
            },
            Self::PositiveInteger => {
                if positive_integer(value).is_some() {
                    Ok(())
                } else {
                    Err("must be a whole number of at least 1".to_string())
                }
            },
            Self::AtMost(max) => match positive_integer(value) {
                Some(n) if n > *max => Err(format!("must be at most {max}")),
                _ => Ok(()),
            },
            Self::Email => match value.as_str() {
                Some(s) if is_email(s) => Ok(()),
                _ => Err("must be a valid email address".to_string()),
            },
            Self::Phone => match value.as_str() {
                Some(s) if is_phone(s) => Ok(()),
                _ => Err("must be a valid phone number".to_string()),
            },
            Self::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err("must be true or false".to_string())
                }
            },
            Self::EachHas(keys) => {
                let Some(items) = value.as_array() else {
                    return Err("must be a list".to_string());
                };
                for (index, item) in items.iter().enumerate() {
                    for key in keys {
                        let present = item
                            .get(key)
                            .and_then(Value::as_str)
                            .is_some_and(|s| !s.trim().is_empty());
                        if !present {
                            return Err(format!("entry {} is missing {key}", index + 1));
                        }
                    }
                }
                Ok(())
            },
        }
    }
}

/// Read a positive integer from a number or a numeric string
#[must_use]
pub fn positive_integer(value: &Value) -> Option<u64> {
    let n = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    (n >= 1).then_some(n)
}

fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_phone(s: &str) -> bool {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')');
    let digits = s.chars().filter(char::is_ascii_digit).count();
    s.chars().all(allowed) && (10..=15).contains(&digits)
}

/// Rules for one field of a step
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    field: String,
    checks: Vec<FieldCheck>,
}

impl FieldRule {
    /// A field with no checks yet (optional, shown on the step)
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            checks: Vec::new(),
        }
    }

    /// Add a check
    #[must_use]
    pub fn check(mut self, check: FieldCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// Shorthand for [`FieldCheck::Required`]
    #[must_use]
    pub fn required(self) -> Self {
        self.check(FieldCheck::Required)
    }

    /// Shorthand for required non-blank text
    #[must_use]
    pub fn required_text(self) -> Self {
        self.required().check(FieldCheck::NonBlank)
    }

    /// Shorthand for [`FieldCheck::OneOf`]
    #[must_use]
    pub fn one_of<I, T>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.check(FieldCheck::OneOf(allowed.into_iter().map(Into::into).collect()))
    }

    /// Field name
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Checks in evaluation order
    #[must_use]
    pub fn checks(&self) -> &[FieldCheck] {
        &self.checks
    }

    /// First failing check, if any
    #[must_use]
    pub fn evaluate(&self, data: &FieldMap) -> Option<FieldError> {
        let value = data.get(&self.field);
        self.checks.iter().find_map(|check| {
            check
                .check(value)
                .err()
                .map(|message| FieldError::new(self.field.clone(), message))
        })
    }
}

/// Condition under which a transition applies
#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    /// Always applies
    Always,
    /// Applies when the field holds exactly this value
    FieldEquals(String, Value),
    /// Applies when the field is `true`
    FieldTruthy(String),
}

impl Guard {
    /// Guard on a field holding a given value
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::FieldEquals(field.into(), value.into())
    }

    /// Guard on a boolean field being `true`
    #[must_use]
    pub fn truthy(field: impl Into<String>) -> Self {
        Self::FieldTruthy(field.into())
    }

    /// Whether the guard holds for the collected data
    #[must_use]
    pub fn matches(&self, data: &FieldMap) -> bool {
        match self {
            Self::Always => true,
            Self::FieldEquals(field, expected) => data.get(field) == Some(expected),
            Self::FieldTruthy(field) => data.get(field).and_then(Value::as_bool) == Some(true),
        }
    }
}

/// One row of a step's decision table
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    /// When this row applies
    pub guard: Guard,
    /// Where it leads
    pub target: S,
}

/// A declared step
#[derive(Debug, Clone, PartialEq)]
pub struct StepDefinition<S> {
    id: S,
    title: String,
    fields: Vec<FieldRule>,
    transitions: Vec<Transition<S>>,
}

impl<S: StepId> StepDefinition<S> {
    /// Step identifier
    #[must_use]
    pub fn id(&self) -> S {
        self.id
    }

    /// Display title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Field rules, in display order
    #[must_use]
    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    /// Decision table rows, first match wins
    #[must_use]
    pub fn transitions(&self) -> &[Transition<S>] {
        &self.transitions
    }

    /// Validate collected data against every field rule of this step
    ///
    /// # Errors
    ///
    /// Returns one error per failing field.
    pub fn validate(&self, data: &FieldMap) -> Result<(), ValidationErrors> {
        let errors: Vec<FieldError> = self.fields.iter().filter_map(|r| r.evaluate(data)).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::from(errors))
        }
    }
}

/// Builder for one step, handed to [`FlowBuilder::step`]
#[derive(Debug)]
pub struct StepBuilder<S> {
    fields: Vec<FieldRule>,
    transitions: Vec<Transition<S>>,
}

impl<S> StepBuilder<S> {
    /// Declare a field on this step
    #[must_use]
    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    /// Add a guarded transition
    #[must_use]
    pub fn when(mut self, guard: Guard, target: S) -> Self {
        self.transitions.push(Transition { guard, target });
        self
    }

    /// Add the unconditional fallback transition
    #[must_use]
    pub fn otherwise(self, target: S) -> Self {
        self.when(Guard::Always, target)
    }
}

/// A validated, immutable flow
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDefinition<S> {
    name: String,
    steps: Vec<StepDefinition<S>>,
    entry: S,
    terminal: S,
}

impl<S: StepId> FlowDefinition<S> {
    /// Start building a flow
    #[must_use]
    pub fn builder(name: impl Into<String>) -> FlowBuilder<S> {
        FlowBuilder {
            name: name.into(),
            steps: Vec::new(),
            entry: None,
            terminal: None,
        }
    }

    /// Flow name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry step
    #[must_use]
    pub const fn entry(&self) -> S {
        self.entry
    }

    /// Terminal step
    #[must_use]
    pub const fn terminal(&self) -> S {
        self.terminal
    }

    /// Declared steps in order
    #[must_use]
    pub fn steps(&self) -> &[StepDefinition<S>] {
        &self.steps
    }

    /// Look up a step
    #[must_use]
    pub fn step(&self, id: S) -> Option<&StepDefinition<S>> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Whether the flow declares this step
    #[must_use]
    pub fn contains(&self, id: S) -> bool {
        self.step(id).is_some()
    }

    /// 1-based position of a step in declaration order
    #[must_use]
    pub fn position(&self, id: S) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id).map(|i| i + 1)
    }

    /// Branch resolution: the step after `current` given the collected data
    ///
    /// Returns `None` for the terminal step and for undeclared steps.
    #[must_use]
    pub fn resolve_next(&self, current: S, data: &FieldMap) -> Option<S> {
        self.step(current)?
            .transitions
            .iter()
            .find(|t| t.guard.matches(data))
            .map(|t| t.target)
    }

    /// Validate collected data against a step's rules
    ///
    /// Undeclared steps have no rules and always pass.
    ///
    /// # Errors
    ///
    /// Returns one error per failing field.
    pub fn validate_step(&self, id: S, data: &FieldMap) -> Result<(), ValidationErrors> {
        self.step(id).map_or(Ok(()), |step| step.validate(data))
    }
}

/// Builder for [`FlowDefinition`]
#[derive(Debug)]
pub struct FlowBuilder<S> {
    name: String,
    steps: Vec<StepDefinition<S>>,
    entry: Option<S>,
    terminal: Option<S>,
}

impl<S: StepId> FlowBuilder<S> {
    /// Declare a step; the first declared step is the entry unless overridden
    #[must_use]
    pub fn step<F>(mut self, id: S, title: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(StepBuilder<S>) -> StepBuilder<S>,
    {
        let built = configure(StepBuilder {
            fields: Vec::new(),
            transitions: Vec::new(),
        });
        self.steps.push(StepDefinition {
            id,
            title: title.into(),
            fields: built.fields,
            transitions: built.transitions,
        });
        self
    }

    /// Override the entry step
    #[must_use]
    pub const fn entry(mut self, id: S) -> Self {
        self.entry = Some(id);
        self
    }

    /// Declare the terminal step
    #[must_use]
    pub const fn terminal(mut self, id: S) -> Self {
        self.terminal = Some(id);
        self
    }

    /// Check the definition and freeze it
    ///
    /// # Errors
    ///
    /// Returns a [`FlowError`] when the flow is empty, a step is declared
    /// twice, a referenced step is undeclared, the terminal step has
    /// transitions, or a non-terminal step lacks an unconditional fallback.
    pub fn build(self) -> Result<FlowDefinition<S>, FlowError> {
        let first = self
            .steps
            .first()
            .map(|s| s.id)
            .ok_or_else(|| FlowError::Empty(self.name.clone()))?;
        let entry = self.entry.unwrap_or(first);
        let terminal = self
            .terminal
            .ok_or_else(|| FlowError::MissingTerminal(self.name.clone()))?;

        let mut declared = HashSet::new();
        for step in &self.steps {
            if !declared.insert(step.id) {
                return Err(FlowError::DuplicateStep(format!("{:?}", step.id)));
            }
        }

        for id in [entry, terminal] {
            if !declared.contains(&id) {
                return Err(FlowError::UnknownStep(format!("{id:?}")));
            }
        }

        for step in &self.steps {
            if let Some(t) = step.transitions.iter().find(|t| !declared.contains(&t.target)) {
                return Err(FlowError::UnknownStep(format!("{:?}", t.target)));
            }
            if step.id == terminal {
                if !step.transitions.is_empty() {
                    return Err(FlowError::TerminalHasTransitions(format!("{:?}", step.id)));
                }
            } else if !step.transitions.iter().any(|t| t.guard == Guard::Always) {
                return Err(FlowError::MissingFallback(format!("{:?}", step.id)));
            }
        }

        Ok(FlowDefinition {
            name: self.name,
            steps: self.steps,
            entry,
            terminal,
        })
    }
}

//! Wizard sessions
//!
//! A [`WizardSession`] is one user's pass through a [`FlowDefinition`]. It is
//! a plain value owned by the caller: the flow it runs against is passed into
//! every operation, so a session can be serialized and restored by the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::flow::{FlowDefinition, StepId};

/// Collected field values, keyed by field name
pub type FieldMap = serde_json::Map<String, Value>;

/// One failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Message suitable for display next to the field
    pub message: String,
}

impl FieldError {
    /// Create a field error
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Field-level validation failures for one step
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Number of failing fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether nothing failed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// All failures, in field order
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the failing fields
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// Message for a field, if it failed
    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Drop the failure for one field (after the user edits it)
    pub fn clear_field(&mut self, field: &str) {
        self.errors.retain(|e| e.field != field);
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

/// Result of a forward navigation attempt that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome<S> {
    /// Moved from one step to the next
    Advanced {
        /// Step that was submitted
        from: S,
        /// Step now current
        to: S,
    },
    /// Nothing happened (forward on the terminal step)
    Unchanged(S),
}

impl<S: Copy> StepOutcome<S> {
    /// Step current after the attempt
    #[must_use]
    pub fn current(&self) -> S {
        match *self {
            Self::Advanced { to, .. } => to,
            Self::Unchanged(step) => step,
        }
    }
}

/// One in-progress multi-step flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSession<S> {
    current_step: S,
    collected_data: FieldMap,
    history: Vec<S>,
    terminal: bool,
}

impl<S: StepId> WizardSession<S> {
    /// Begin a session at the flow's entry step
    #[must_use]
    pub fn start(flow: &FlowDefinition<S>) -> Self {
        Self {
            current_step: flow.entry(),
            collected_data: FieldMap::new(),
            history: Vec::new(),
            terminal: flow.entry() == flow.terminal(),
        }
    }

    /// Step the user is on
    #[must_use]
    pub const fn current_step(&self) -> S {
        self.current_step
    }

    /// Everything collected so far
    #[must_use]
    pub const fn collected_data(&self) -> &FieldMap {
        &self.collected_data
    }

    /// A collected value
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.collected_data.get(field)
    }

    /// A collected string value, trimmed, if non-blank
    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Steps left behind by forward navigation, oldest first
    #[must_use]
    pub fn history(&self) -> &[S] {
        &self.history
    }

    /// Whether the terminal step has been reached
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.terminal
    }

    /// Record a single field without attempting to advance
    pub fn edit_field(&mut self, field: impl Into<String>, value: Value) {
        self.collected_data.insert(field.into(), value);
    }

    /// Merge updates and try to advance
    ///
    /// On success the updates are kept, the old step is pushed onto the
    /// history, and the decision table picks the new step. Forward on the
    /// terminal step does nothing and discards the updates.
    ///
    /// # Errors
    ///
    /// Returns the failing fields when the current step's rules do not pass.
    /// The session is left exactly as it was, updates included.
    pub fn submit_step(
        &mut self,
        flow: &FlowDefinition<S>,
        updates: FieldMap,
    ) -> Result<StepOutcome<S>, ValidationErrors> {
        if self.terminal {
            return Ok(StepOutcome::Unchanged(self.current_step));
        }

        let mut merged = self.collected_data.clone();
        merged.extend(updates);
        flow.validate_step(self.current_step, &merged)?;

        let Some(next) = flow.resolve_next(self.current_step, &merged) else {
            return Ok(StepOutcome::Unchanged(self.current_step));
        };

        let from = self.current_step;
        self.collected_data = merged;
        self.history.push(from);
        self.current_step = next;
        self.terminal = next == flow.terminal();

        Ok(StepOutcome::Advanced { from, to: next })
    }

    /// Return to the previous step, keeping collected data
    ///
    /// Returns the step now current, or `None` when there is no history.
    pub fn go_back(&mut self) -> Option<S> {
        let previous = self.history.pop()?;
        self.current_step = previous;
        self.terminal = false;
        Some(previous)
    }

    /// Discard everything and return to the entry step
    pub fn reset(&mut self, flow: &FlowDefinition<S>) {
        *self = Self::start(flow);
    }

    /// What the presentation layer needs to render the current step
    #[must_use]
    pub fn view(&self, flow: &FlowDefinition<S>) -> StepView<S> {
        let step = flow.step(self.current_step);
        let fields = step
            .map(|s| {
                s.fields()
                    .iter()
                    .filter_map(|rule| {
                        self.collected_data
                            .get(rule.field())
                            .map(|v| (rule.field().to_string(), v.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        StepView {
            step: self.current_step,
            title: step.map(|s| s.title().to_string()).unwrap_or_default(),
            position: flow.position(self.current_step).unwrap_or(0),
            total: flow.steps().len(),
            fields,
            errors: ValidationErrors::default(),
            can_go_back: !self.history.is_empty(),
            can_go_forward: !self.terminal,
        }
    }
}

/// Render model for one step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView<S> {
    /// Current step
    pub step: S,
    /// Step title
    pub title: String,
    /// 1-based position in declaration order
    pub position: usize,
    /// Number of declared steps
    pub total: usize,
    /// Collected values for this step's fields (pre-fill)
    pub fields: FieldMap,
    /// Validation failures from the last submit
    pub errors: ValidationErrors,
    /// Whether back navigation is available
    pub can_go_back: bool,
    /// Whether forward navigation is available
    pub can_go_forward: bool,
}

impl<S> StepView<S> {
    /// Attach validation failures
    #[must_use]
    pub fn with_errors(mut self, errors: ValidationErrors) -> Self {
        self.errors = errors;
        self
    }
}

/// Build a [`FieldMap`] from `(name, value)` pairs
#[must_use]
pub fn fields<I, K, V>(pairs: I) -> FieldMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use crate::flow::{FieldRule, Guard};
    use serde_json::json;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    enum Step {
        Name,
        Extras,
        Done,
    }

    fn flow() -> FlowDefinition<Step> {
        FlowDefinition::builder("profile")
            .step(Step::Name, "Name", |s| {
                s.field(FieldRule::new("name").required_text())
                    .field(FieldRule::new("wantsExtras"))
                    .when(Guard::truthy("wantsExtras"), Step::Extras)
                    .otherwise(Step::Done)
            })
            .step(Step::Extras, "Extras", |s| {
                s.field(FieldRule::new("extra").required()).otherwise(Step::Done)
            })
            .step(Step::Done, "Done", |s| s)
            .terminal(Step::Done)
            .build()
            .unwrap()
    }

    #[test]
    fn test_failed_submit_leaves_session_untouched() {
        let flow = flow();
        let mut session = WizardSession::start(&flow);
        session.edit_field("note", json!("kept"));
        let before = session.clone();

        let errors = session
            .submit_step(&flow, fields([("name", json!("  ")), ("extra", json!(1))]))
            .unwrap_err();

        assert_eq!(errors.fields(), vec!["name"]);
        assert_eq!(session, before);
    }

    #[test]
    fn test_back_keeps_data_and_view_prefills() {
        let flow = flow();
        let mut session = WizardSession::start(&flow);
        session
            .submit_step(&flow, fields([("name", json!("Asha")), ("wantsExtras", json!(true))]))
            .unwrap();
        assert_eq!(session.current_step(), Step::Extras);

        assert_eq!(session.go_back(), Some(Step::Name));
        let view = session.view(&flow);
        assert_eq!(view.fields.get("name"), Some(&json!("Asha")));
        assert_eq!(view.position, 1);
        assert_eq!(view.total, 3);
        assert!(!view.can_go_back);
        assert!(view.can_go_forward);
    }

    #[test]
    fn test_terminal_forward_is_noop() {
        let flow = flow();
        let mut session = WizardSession::start(&flow);
        session
            .submit_step(&flow, fields([("name", json!("Asha"))]))
            .unwrap();
        assert!(session.is_complete());

        let outcome = session
            .submit_step(&flow, fields([("late", json!("ignored"))]))
            .unwrap();
        assert_eq!(outcome, StepOutcome::Unchanged(Step::Done));
        assert!(session.get("late").is_none());
        assert_eq!(session.history(), &[Step::Name]);
    }

    #[test]
    fn test_back_from_terminal_reopens_flow() {
        let flow = flow();
        let mut session = WizardSession::start(&flow);
        session
            .submit_step(&flow, fields([("name", json!("Asha"))]))
            .unwrap();
        session.go_back();
        assert!(!session.is_complete());
        assert_eq!(session.go_back(), None);
    }

    #[test]
    fn test_session_serializes() {
        let flow = flow();
        let mut session = WizardSession::start(&flow);
        session
            .submit_step(&flow, fields([("name", json!("Asha"))]))
            .unwrap();

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["currentStep"], json!("Done"));
        let restored: WizardSession<Step> = serde_json::from_value(json).unwrap();
        assert_eq!(restored, session);
    }
}

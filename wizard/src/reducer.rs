//! Generic wizard reducer
//!
//! Wraps a [`WizardSession`] in the reducer shape so that every flow gets the
//! same field-edit and navigation handling. Domain reducers embed
//! [`WizardState`] and delegate [`WizardAction`]s here.

use feastflow_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::flow::{FlowDefinition, StepId};
use crate::session::{FieldMap, StepOutcome, StepView, ValidationErrors, WizardSession};

/// Field-edit and navigation intents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WizardAction {
    /// Record one field without advancing
    EditField {
        /// Field name
        field: String,
        /// New value
        value: Value,
    },
    /// Merge fields and try to advance
    SubmitStep {
        /// Fields entered on the current step
        updates: FieldMap,
    },
    /// Go to the previous step
    GoBack,
    /// Discard the session and start over
    Reset,
}

impl WizardAction {
    /// Shorthand for [`WizardAction::EditField`]
    #[must_use]
    pub fn edit(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::EditField {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Shorthand for [`WizardAction::SubmitStep`]
    #[must_use]
    pub const fn submit(updates: FieldMap) -> Self {
        Self::SubmitStep { updates }
    }
}

/// Session plus the presentation-facing result of the last intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState<S> {
    /// The session itself
    pub session: WizardSession<S>,
    /// Failures from the last submit, cleared as fields are edited
    pub errors: ValidationErrors,
    /// Outcome of the last successful submit
    pub last_outcome: Option<StepOutcome<S>>,
}

impl<S: StepId> WizardState<S> {
    /// Fresh state at the flow's entry step
    #[must_use]
    pub fn new(flow: &FlowDefinition<S>) -> Self {
        Self {
            session: WizardSession::start(flow),
            errors: ValidationErrors::default(),
            last_outcome: None,
        }
    }

    /// Render model for the current step, errors included
    #[must_use]
    pub fn view(&self, flow: &FlowDefinition<S>) -> StepView<S> {
        self.session.view(flow).with_errors(self.errors.clone())
    }

    /// Whether the last intent moved the session into `step`
    #[must_use]
    pub fn just_entered(&self, step: S) -> bool {
        matches!(self.last_outcome, Some(StepOutcome::Advanced { to, .. }) if to == step)
    }
}

/// Reducer driving any [`FlowDefinition`]
#[derive(Debug, Clone)]
pub struct WizardReducer<S> {
    flow: Arc<FlowDefinition<S>>,
}

impl<S: StepId> WizardReducer<S> {
    /// Create a reducer for a flow
    #[must_use]
    pub fn new(flow: FlowDefinition<S>) -> Self {
        Self {
            flow: Arc::new(flow),
        }
    }

    /// The flow this reducer drives
    #[must_use]
    pub fn flow(&self) -> &FlowDefinition<S> {
        &self.flow
    }

    /// Fresh state for this reducer's flow
    #[must_use]
    pub fn initial_state(&self) -> WizardState<S> {
        WizardState::new(&self.flow)
    }

    /// Apply an intent, returning whether the session changed step
    pub fn apply(&self, state: &mut WizardState<S>, action: WizardAction) -> bool {
        let flow = self.flow.as_ref();
        state.last_outcome = None;

        match action {
            WizardAction::EditField { field, value } => {
                state.errors.clear_field(&field);
                state.session.edit_field(field, value);
                false
            },
            WizardAction::SubmitStep { updates } => match state.session.submit_step(flow, updates)
            {
                Ok(outcome) => {
                    state.errors = ValidationErrors::default();
                    state.last_outcome = Some(outcome);
                    match outcome {
                        StepOutcome::Advanced { from, to } => {
                            tracing::debug!(flow = flow.name(), ?from, ?to, "Step advanced");
                            if state.session.is_complete() {
                                tracing::info!(flow = flow.name(), "Flow completed");
                            }
                            true
                        },
                        StepOutcome::Unchanged(step) => {
                            tracing::debug!(flow = flow.name(), ?step, "Forward ignored");
                            false
                        },
                    }
                },
                Err(errors) => {
                    tracing::debug!(
                        flow = flow.name(),
                        step = ?state.session.current_step(),
                        fields = ?errors.fields(),
                        "Step validation failed"
                    );
                    state.errors = errors;
                    false
                },
            },
            WizardAction::GoBack => {
                state.errors = ValidationErrors::default();
                match state.session.go_back() {
                    Some(step) => {
                        tracing::debug!(flow = flow.name(), ?step, "Stepped back");
                        true
                    },
                    None => false,
                }
            },
            WizardAction::Reset => {
                tracing::debug!(flow = flow.name(), "Session reset");
                *state = WizardState::new(flow);
                true
            },
        }
    }
}

impl<S: StepId> Reducer for WizardReducer<S> {
    type State = WizardState<S>;
    type Action = WizardAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        self.apply(state, action);
        smallvec![Effect::None]
    }
}

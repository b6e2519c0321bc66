//! Smart prompt wizard
//!
//! A three-step assistant: describe the event, pick what to draft, review
//! the draft. The draft comes from [`ContentReducer`]; when it arrives the
//! wizard moves to review on its own.

use feastflow_core::{SmallVec, effect::Effect, generation::GenerationPrompt, reducer::Reducer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{
    ContentAction, ContentKind, ContentReducer, ContentState, GenerationContext, prompts,
};
use crate::environment::ContentEnvironment;
use crate::flow::{FieldRule, FlowDefinition, FlowError};
use crate::reducer::{WizardAction, WizardReducer, WizardState};
use crate::session::{WizardSession, fields};

/// Prompt wizard steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptStep {
    /// What the event is about
    Context,
    /// Choose what to draft
    Generate,
    /// Look at the draft
    Review,
}

/// Field names collected by the prompt wizard
pub mod field {
    /// What the event is about
    pub const EVENT_ABOUT: &str = "eventAbout";
    /// Location
    pub const LOCATION: &str = "location";
    /// Free-form date and time
    pub const DATE_TIME: &str = "dateTime";
    /// Who the event is for
    pub const TARGET_AUDIENCE: &str = "targetAudience";
    /// Theme or style
    pub const THEME: &str = "theme";
    /// Kind being drafted
    pub const GENERATION_KIND: &str = "generationKind";
    /// The draft
    pub const GENERATED_CONTENT: &str = "generatedContent";
}

/// Audiences offered on the context step
pub const TARGET_AUDIENCES: [&str; 9] = [
    "Young professionals",
    "Families with kids",
    "Food enthusiasts",
    "Students",
    "Couples",
    "Seniors",
    "Artists & creatives",
    "Tech community",
    "Health-conscious people",
];

/// Themes offered on the context step
pub const THEMES: [&str; 8] = [
    "Casual & fun",
    "Premium & elegant",
    "Cultural & traditional",
    "Modern & trendy",
    "Family-friendly",
    "Artistic & creative",
    "Health & wellness",
    "Learning & educational",
];

/// The prompt wizard flow definition
///
/// # Errors
///
/// Returns [`FlowError`] if the definition is inconsistent.
pub fn prompt_flow() -> Result<FlowDefinition<PromptStep>, FlowError> {
    FlowDefinition::builder("smart-prompt")
        .step(PromptStep::Context, "Tell us about your event", |s| {
            s.field(FieldRule::new(field::EVENT_ABOUT).required_text())
                .field(FieldRule::new(field::LOCATION))
                .field(FieldRule::new(field::DATE_TIME))
                .field(FieldRule::new(field::TARGET_AUDIENCE))
                .field(FieldRule::new(field::THEME))
                .otherwise(PromptStep::Generate)
        })
        .step(PromptStep::Generate, "Choose what to generate", |s| {
            s.field(
                FieldRule::new(field::GENERATION_KIND)
                    .required()
                    .one_of(ContentKind::ALL.map(ContentKind::as_str)),
            )
            .field(FieldRule::new(field::GENERATED_CONTENT).required_text())
            .otherwise(PromptStep::Review)
        })
        .step(PromptStep::Review, "Review your content", |s| s)
        .entry(PromptStep::Context)
        .terminal(PromptStep::Review)
        .build()
}

/// What the user told the wizard about the event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptContext {
    /// What the event is about
    pub event_about: Option<String>,
    /// Location
    pub location: Option<String>,
    /// Date and time
    pub date_time: Option<String>,
    /// Audience
    pub target_audience: Option<String>,
    /// Theme or style
    pub theme: Option<String>,
}

impl PromptContext {
    /// Read the context fields of a session
    #[must_use]
    pub fn from_session(session: &WizardSession<PromptStep>) -> Self {
        let text = |name| session.text(name).map(str::to_string);
        Self {
            event_about: text(field::EVENT_ABOUT),
            location: text(field::LOCATION),
            date_time: text(field::DATE_TIME),
            target_audience: text(field::TARGET_AUDIENCE),
            theme: text(field::THEME),
        }
    }

    /// Context for the template generator
    ///
    /// The theme stands in for the event type and the description for the name.
    #[must_use]
    pub fn generation_context(&self) -> GenerationContext {
        GenerationContext::new(
            self.theme.clone().unwrap_or_default(),
            self.location.clone().unwrap_or_default(),
            self.event_about.clone().unwrap_or_default(),
        )
    }
}

/// Structured prompt for a kind
#[must_use]
pub fn build_prompt(kind: ContentKind, context: &PromptContext) -> String {
    let mut base = format!(
        "Event: {}\nLocation: {}\n",
        context.event_about.as_deref().unwrap_or("community event"),
        context.location.as_deref().unwrap_or("local area"),
    );
    if let Some(date_time) = &context.date_time {
        base.push_str(&format!("Date/Time: {date_time}\n"));
    }
    base.push_str(&format!(
        "Target Audience: {}\nTheme/Style: {}",
        context.target_audience.as_deref().unwrap_or("general public"),
        context.theme.as_deref().unwrap_or("welcoming and inclusive"),
    ));

    match kind {
        ContentKind::Title => format!(
            "Generate a catchy, engaging event title for:\n{base}\n\n\
             Make it memorable, under 50 characters, and appealing to the target audience."
        ),
        ContentKind::Description => format!(
            "Create an engaging 2-3 sentence event description for:\n{base}\n\n\
             Focus on what attendees will experience, the atmosphere, and key benefits. \
             Make it inviting and specific."
        ),
        ContentKind::Marketing => format!(
            "Create social media content (Instagram style) for:\n{base}\n\n\
             Include engaging copy, relevant hashtags, and a clear call-to-action. \
             Make it shareable and exciting."
        ),
    }
}

/// Content the user chose to use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedContent {
    /// Kind drafted
    pub kind: ContentKind,
    /// The text
    pub text: String,
}

/// Prompt wizard intents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PromptWizardAction {
    /// Field edit or navigation
    Wizard(WizardAction),
    /// Draft a kind from the context
    Generate(ContentKind),
    /// Content intents and results
    Content(ContentAction),
    /// Draft the same kind again
    Regenerate,
    /// Hand the draft over and start again
    UseContent,
    /// Close the wizard, discarding everything
    Close,
}

/// Prompt wizard state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptWizardState {
    /// Wizard progress
    pub wizard: WizardState<PromptStep>,
    /// Drafts and requests in flight
    pub content: ContentState,
    /// Kind last requested
    pub kind: Option<ContentKind>,
    /// Set by [`PromptWizardAction::UseContent`]
    pub applied: Option<AppliedContent>,
}

impl PromptWizardState {
    /// Step the user is on
    #[must_use]
    pub const fn current_step(&self) -> PromptStep {
        self.wizard.session.current_step()
    }

    /// The draft under review
    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        self.wizard.session.text(field::GENERATED_CONTENT)
    }
}

type Effects = SmallVec<[Effect<PromptWizardAction>; 4]>;

/// Reducer for the prompt wizard
#[derive(Debug, Clone)]
pub struct PromptWizardReducer {
    wizard: WizardReducer<PromptStep>,
}

impl PromptWizardReducer {
    /// Create a reducer for the prompt wizard
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] if the flow definition is inconsistent.
    pub fn new() -> Result<Self, FlowError> {
        Ok(Self {
            wizard: WizardReducer::new(prompt_flow()?),
        })
    }

    /// The prompt wizard flow
    #[must_use]
    pub fn flow(&self) -> &FlowDefinition<PromptStep> {
        self.wizard.flow()
    }

    /// Fresh state with an empty context
    #[must_use]
    pub fn initial_state(&self) -> PromptWizardState {
        PromptWizardState {
            wizard: self.wizard.initial_state(),
            content: ContentState::default(),
            kind: None,
            applied: None,
        }
    }

    /// Fresh state pre-filled from what an event form already holds
    #[must_use]
    pub fn initial_state_from(&self, existing: &GenerationContext) -> PromptWizardState {
        let mut state = self.initial_state();
        let prefill = [
            (field::EVENT_ABOUT, &existing.event_name),
            (field::LOCATION, &existing.location),
            (field::THEME, &existing.event_type),
        ];
        for (name, value) in prefill {
            if !value.trim().is_empty() {
                state.wizard.session.edit_field(name, Value::String(value.clone()));
            }
        }
        state
    }

    fn content(
        state: &mut PromptWizardState,
        action: ContentAction,
        env: &ContentEnvironment,
    ) -> Effects {
        ContentReducer
            .reduce(&mut state.content, action, env)
            .into_iter()
            .filter(|effect| !effect.is_none())
            .map(|effect| effect.map(PromptWizardAction::Content))
            .collect()
    }

    fn cancel_pending(state: &mut PromptWizardState, env: &ContentEnvironment) -> Effects {
        let mut effects = Effects::new();
        for kind in ContentKind::ALL {
            if state.content.is_generating(kind) {
                effects.extend(Self::content(state, ContentAction::Cancel { kind }, env));
            }
        }
        effects
    }

    fn generate(
        state: &mut PromptWizardState,
        kind: ContentKind,
        env: &ContentEnvironment,
    ) -> Effects {
        if state.current_step() != PromptStep::Generate {
            tracing::debug!(
                step = ?state.current_step(),
                "Generate ignored outside the generate step"
            );
            return Effects::new();
        }

        // Only one kind is drafted at a time
        let mut effects = Effects::new();
        for other in ContentKind::ALL.into_iter().filter(|k| *k != kind) {
            if state.content.is_generating(other) {
                effects.extend(Self::content(state, ContentAction::Cancel { kind: other }, env));
            }
        }

        state.kind = Some(kind);
        state
            .wizard
            .session
            .edit_field(field::GENERATION_KIND, Value::String(kind.as_str().to_string()));

        let context = PromptContext::from_session(&state.wizard.session);
        let prompt =
            GenerationPrompt::new(prompts::system_prompt(kind), build_prompt(kind, &context));
        effects.extend(Self::content(
            state,
            ContentAction::Generate {
                kind,
                context: context.generation_context(),
                prompt: Some(prompt),
            },
            env,
        ));
        effects
    }

    fn restart(&self, state: &mut PromptWizardState, env: &ContentEnvironment) -> Effects {
        let effects = Self::content(state, ContentAction::Clear { kind: None }, env);
        self.wizard.apply(&mut state.wizard, WizardAction::Reset);
        state.kind = None;
        effects
    }
}

impl Reducer for PromptWizardReducer {
    type State = PromptWizardState;
    type Action = PromptWizardAction;
    type Environment = ContentEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            PromptWizardAction::Wizard(WizardAction::Reset) => self.restart(state, env),
            PromptWizardAction::Wizard(action) => {
                let back = matches!(action, WizardAction::GoBack);
                self.wizard.apply(&mut state.wizard, action);
                if back {
                    Self::cancel_pending(state, env)
                } else {
                    Effects::new()
                }
            },
            PromptWizardAction::Generate(kind) => Self::generate(state, kind, env),
            PromptWizardAction::Content(action) => {
                let arrived = match &action {
                    ContentAction::Generated {
                        kind, request_id, ..
                    } => state.content.is_current(*kind, *request_id).then_some(*kind),
                    _ => None,
                };
                let effects = Self::content(state, action, env);
                if let Some(kind) = arrived {
                    let text = state.content.text(kind).unwrap_or_default().to_string();
                    let updates = fields([
                        (field::GENERATION_KIND, kind.as_str().to_string()),
                        (field::GENERATED_CONTENT, text),
                    ]);
                    self.wizard.apply(&mut state.wizard, WizardAction::submit(updates));
                }
                effects
            },
            PromptWizardAction::Regenerate => match state.kind {
                Some(kind) if state.current_step() == PromptStep::Review => {
                    self.wizard.apply(&mut state.wizard, WizardAction::GoBack);
                    Self::generate(state, kind, env)
                },
                _ => Effects::new(),
            },
            PromptWizardAction::UseContent => {
                let Some(kind) = state.kind.filter(|_| state.wizard.session.is_complete()) else {
                    return Effects::new();
                };
                let text = state.draft().unwrap_or_default().to_string();
                tracing::info!(%kind, "Generated content applied");
                let effects = self.restart(state, env);
                state.applied = Some(AppliedContent { kind, text });
                effects
            },
            PromptWizardAction::Close => {
                tracing::debug!(step = ?state.current_step(), "Prompt wizard closed");
                self.restart(state, env)
            },
        }
    }
}

//! Event creation flow
//!
//! Six linear steps from basic details to publish. The content step drafts
//! the title and description through [`ContentReducer`]; pricing and audience
//! suggestions are computed locally.

use chrono::{DateTime, Utc};
use feastflow_core::{SmallVec, effect::Effect, reducer::Reducer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{
    ContentAction, ContentKind, ContentReducer, ContentState, GenerationContext, fallback,
};
use crate::environment::CreateEventEnvironment;
use crate::flow::{FieldCheck, FieldRule, FlowDefinition, FlowError, positive_integer};
use crate::reducer::{WizardAction, WizardReducer, WizardState};
use crate::session::WizardSession;

/// Event creation steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreateEventStep {
    /// Type, date, price, capacity, location
    BasicDetails,
    /// Title and description
    Content,
    /// Ticket price review
    Pricing,
    /// Audience segments
    Targeting,
    /// Banner image
    Visuals,
    /// Review and publish
    Review,
}

/// Field names collected by the event creation flow
pub mod field {
    /// Event type
    pub const EVENT_TYPE: &str = "eventType";
    /// Date
    pub const DATE: &str = "date";
    /// Start time
    pub const TIME: &str = "time";
    /// Ticket price in rupees
    pub const TICKET_PRICE: &str = "ticketPrice";
    /// Maximum attendees
    pub const CAPACITY: &str = "capacity";
    /// Venue or neighbourhood
    pub const LOCATION: &str = "location";
    /// Title
    pub const TITLE: &str = "title";
    /// Description
    pub const DESCRIPTION: &str = "description";
    /// Social media copy
    pub const MARKETING_COPY: &str = "marketingCopy";
    /// Pricing summary from the assistant
    pub const PRICING_SUGGESTION: &str = "pricingSuggestion";
    /// Audience segments
    pub const TARGET_AUDIENCE: &str = "targetAudience";
    /// Banner image URL
    pub const BANNER_IMAGE: &str = "bannerImage";

    pub(crate) const fn for_content(kind: super::ContentKind) -> &'static str {
        match kind {
            super::ContentKind::Title => TITLE,
            super::ContentKind::Description => DESCRIPTION,
            super::ContentKind::Marketing => MARKETING_COPY,
        }
    }
}

/// Event types offered when creating an event
pub const EVENT_TYPES: [&str; 7] = [
    "Food Festival",
    "Wine Tasting",
    "Cooking Workshop",
    "Live Music & Dining",
    "Cultural Night",
    "Pop-up Market",
    "Community Gathering",
];

/// Audience segments an event can target
pub const AUDIENCE_SEGMENTS: [&str; 8] = [
    "Italian food lovers",
    "Wine enthusiasts",
    "Families with kids",
    "Young professionals",
    "Date night couples",
    "Food bloggers",
    "Vegetarian diners",
    "Premium diners",
];

/// The event creation flow definition
///
/// # Errors
///
/// Returns [`FlowError`] if the definition is inconsistent.
pub fn create_event_flow() -> Result<FlowDefinition<CreateEventStep>, FlowError> {
    use field::{
        BANNER_IMAGE, CAPACITY, DATE, DESCRIPTION, EVENT_TYPE, LOCATION, MARKETING_COPY,
        PRICING_SUGGESTION, TARGET_AUDIENCE, TICKET_PRICE, TIME, TITLE,
    };

    FlowDefinition::builder("create-event")
        .step(CreateEventStep::BasicDetails, "Basic Details", |s| {
            s.field(FieldRule::new(EVENT_TYPE).required_text())
                .field(FieldRule::new(DATE).required_text())
                .field(FieldRule::new(TIME).required_text())
                .field(FieldRule::new(TICKET_PRICE).required().check(FieldCheck::PositiveInteger))
                .field(FieldRule::new(CAPACITY).required().check(FieldCheck::PositiveInteger))
                .field(FieldRule::new(LOCATION).required_text())
                .otherwise(CreateEventStep::Content)
        })
        .step(CreateEventStep::Content, "GenAI Content", |s| {
            s.field(FieldRule::new(TITLE))
                .field(FieldRule::new(DESCRIPTION))
                .field(FieldRule::new(MARKETING_COPY))
                .otherwise(CreateEventStep::Pricing)
        })
        .step(CreateEventStep::Pricing, "Smart Pricing", |s| {
            s.field(FieldRule::new(PRICING_SUGGESTION))
                .otherwise(CreateEventStep::Targeting)
        })
        .step(CreateEventStep::Targeting, "Customer Targeting", |s| {
            s.field(FieldRule::new(TARGET_AUDIENCE))
                .otherwise(CreateEventStep::Visuals)
        })
        .step(CreateEventStep::Visuals, "Visuals", |s| {
            s.field(FieldRule::new(BANNER_IMAGE))
                .otherwise(CreateEventStep::Review)
        })
        .step(CreateEventStep::Review, "Review & Publish", |s| s)
        .entry(CreateEventStep::BasicDetails)
        .terminal(CreateEventStep::Review)
        .build()
}

/// Price used when no valid ticket price was entered
pub const DEFAULT_BASE_PRICE: u64 = 500;

/// Pricing assistant output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSuggestion {
    /// Price the suggestion was based on
    pub base: u64,
    /// Suggested ticket price
    pub recommended: u64,
    /// Lowest price similar events charge
    pub range_low: u64,
    /// Highest price similar events charge
    pub range_high: u64,
    /// One-line summary stored on the event
    pub summary: String,
}

/// Suggest a ticket price from the entered one
#[must_use]
pub fn suggest_pricing(ticket_price: Option<&Value>, event_type: &str) -> PricingSuggestion {
    let base = ticket_price.and_then(positive_integer).unwrap_or(DEFAULT_BASE_PRICE);
    let recommended = base.saturating_add(100);
    let range_low = base.saturating_sub(50);
    let range_high = base.saturating_add(200);
    let summary = format!(
        "Recommended: ₹{recommended} (15% premium for {event_type}) - \
         Similar events in your area charge ₹{range_low} to ₹{range_high}"
    );
    PricingSuggestion {
        base,
        recommended,
        range_low,
        range_high,
        summary,
    }
}

/// Suggest audience segments for an event type
#[must_use]
pub fn suggest_audience(event_type: &str) -> Vec<&'static str> {
    match event_type.trim() {
        "Food Festival" => vec!["Italian food lovers", "Families with kids", "Food bloggers"],
        "Wine Tasting" => vec!["Wine enthusiasts", "Date night couples", "Premium diners"],
        "Cooking Workshop" => vec!["Food bloggers", "Young professionals", "Families with kids"],
        "Live Music & Dining" => {
            vec!["Date night couples", "Young professionals", "Premium diners"]
        },
        _ => vec!["Young professionals", "Food bloggers"],
    }
}

/// An event ready to go live
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEvent {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Social media copy
    pub marketing_copy: Option<String>,
    /// Event type
    pub event_type: String,
    /// Date
    pub date: String,
    /// Start time
    pub time: String,
    /// Ticket price in rupees
    pub ticket_price: u64,
    /// Maximum attendees
    pub capacity: u64,
    /// Venue or neighbourhood
    pub location: String,
    /// Pricing summary, if the assistant was used
    pub pricing_suggestion: Option<String>,
    /// Audience segments
    pub target_audience: Vec<String>,
    /// Banner image URL
    pub banner_image: Option<String>,
    /// When the event was published
    pub published_at: DateTime<Utc>,
}

/// Context for drafting content from what has been collected so far
#[must_use]
pub fn generation_context(session: &WizardSession<CreateEventStep>) -> GenerationContext {
    GenerationContext::new(
        session.text(field::EVENT_TYPE).unwrap_or_default(),
        session.text(field::LOCATION).unwrap_or_default(),
        session.text(field::TITLE).unwrap_or_default(),
    )
}

fn required(session: &WizardSession<CreateEventStep>, name: &str) -> Result<String, FlowError> {
    session
        .text(name)
        .map(str::to_string)
        .ok_or_else(|| FlowError::InvalidField {
            field: name.to_string(),
            reason: "is required".to_string(),
        })
}

fn count(session: &WizardSession<CreateEventStep>, name: &str) -> Result<u64, FlowError> {
    session
        .get(name)
        .and_then(positive_integer)
        .ok_or_else(|| FlowError::InvalidField {
            field: name.to_string(),
            reason: "must be a whole number of at least 1".to_string(),
        })
}

/// Turn a session on the review step into a published event
///
/// A blank title or description is filled from templates.
///
/// # Errors
///
/// Returns [`FlowError::Incomplete`] before the review step, or
/// [`FlowError::InvalidField`] if basic details cannot be read.
pub fn publish(
    session: &WizardSession<CreateEventStep>,
    published_at: DateTime<Utc>,
) -> Result<PublishedEvent, FlowError> {
    if !session.is_complete() {
        return Err(FlowError::Incomplete(format!("{:?}", session.current_step())));
    }

    let context = generation_context(session);
    let title = session
        .text(field::TITLE)
        .map_or_else(|| fallback::generate(ContentKind::Title, &context), str::to_string);
    let description = session.text(field::DESCRIPTION).map_or_else(
        || {
            let named = GenerationContext {
                event_name: title.clone(),
                ..context.clone()
            };
            fallback::generate(ContentKind::Description, &named)
        },
        str::to_string,
    );
    let target_audience = session
        .get(field::TARGET_AUDIENCE)
        .and_then(Value::as_array)
        .map(|segments| {
            segments
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(PublishedEvent {
        title,
        description,
        marketing_copy: session.text(field::MARKETING_COPY).map(str::to_string),
        event_type: required(session, field::EVENT_TYPE)?,
        date: required(session, field::DATE)?,
        time: required(session, field::TIME)?,
        ticket_price: count(session, field::TICKET_PRICE)?,
        capacity: count(session, field::CAPACITY)?,
        location: required(session, field::LOCATION)?,
        pricing_suggestion: session.text(field::PRICING_SUGGESTION).map(str::to_string),
        target_audience,
        banner_image: session.text(field::BANNER_IMAGE).map(str::to_string),
        published_at,
    })
}

/// Event creation intents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CreateEventAction {
    /// Field edit or navigation
    Wizard(WizardAction),
    /// Run the pricing assistant
    SuggestPricing,
    /// Run the audience assistant
    SuggestAudience,
    /// Draft content of a kind from the details entered so far
    GenerateContent(ContentKind),
    /// Content intents and results
    Content(ContentAction),
    /// Publish from the review step
    Publish,
}

/// Event creation state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateEventState {
    /// Wizard progress
    pub wizard: WizardState<CreateEventStep>,
    /// Drafted content
    pub content: ContentState,
    /// Latest pricing suggestion
    pub pricing: Option<PricingSuggestion>,
    /// Set once published
    pub published: Option<PublishedEvent>,
    /// Why publishing failed, if it did
    #[serde(skip)]
    pub publish_error: Option<FlowError>,
}

impl CreateEventState {
    /// Step the user is on
    #[must_use]
    pub const fn current_step(&self) -> CreateEventStep {
        self.wizard.session.current_step()
    }
}

type Effects = SmallVec<[Effect<CreateEventAction>; 4]>;

/// Reducer for the event creation flow
#[derive(Debug, Clone)]
pub struct CreateEventReducer {
    wizard: WizardReducer<CreateEventStep>,
}

impl CreateEventReducer {
    /// Create a reducer for the event creation flow
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] if the flow definition is inconsistent.
    pub fn new() -> Result<Self, FlowError> {
        Ok(Self {
            wizard: WizardReducer::new(create_event_flow()?),
        })
    }

    /// The event creation flow
    #[must_use]
    pub fn flow(&self) -> &FlowDefinition<CreateEventStep> {
        self.wizard.flow()
    }

    /// Fresh state at basic details
    #[must_use]
    pub fn initial_state(&self) -> CreateEventState {
        CreateEventState {
            wizard: self.wizard.initial_state(),
            content: ContentState::default(),
            pricing: None,
            published: None,
            publish_error: None,
        }
    }

    fn content(
        state: &mut CreateEventState,
        action: ContentAction,
        env: &CreateEventEnvironment,
    ) -> Effects {
        ContentReducer
            .reduce(&mut state.content, action, &env.content)
            .into_iter()
            .filter(|effect| !effect.is_none())
            .map(|effect| effect.map(CreateEventAction::Content))
            .collect()
    }

    fn navigate(
        &self,
        state: &mut CreateEventState,
        action: WizardAction,
        env: &CreateEventEnvironment,
    ) -> Effects {
        let reset = matches!(action, WizardAction::Reset);
        let edited = match &action {
            WizardAction::EditField { field: name, value } => ContentKind::ALL
                .into_iter()
                .find(|kind| name.as_str() == field::for_content(*kind))
                .map(|kind| (kind, value.as_str().unwrap_or_default().to_string())),
            _ => None,
        };

        self.wizard.apply(&mut state.wizard, action);

        if reset {
            state.pricing = None;
            state.published = None;
            state.publish_error = None;
            return Self::content(state, ContentAction::Clear { kind: None }, env);
        }

        // A hand edit wins over any draft still in flight
        if let Some((kind, text)) = edited {
            return Self::content(state, ContentAction::Overwrite { kind, text }, env);
        }

        // Drafts still in flight when the user leaves the content step are discarded
        let mut effects = Effects::new();
        if state.current_step() != CreateEventStep::Content {
            for kind in ContentKind::ALL {
                if state.content.is_generating(kind) {
                    effects.extend(Self::content(state, ContentAction::Cancel { kind }, env));
                }
            }
        }
        effects
    }
}

impl Reducer for CreateEventReducer {
    type State = CreateEventState;
    type Action = CreateEventAction;
    type Environment = CreateEventEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CreateEventAction::Wizard(action) => self.navigate(state, action, env),
            CreateEventAction::SuggestPricing => {
                let session = &state.wizard.session;
                let event_type = session.text(field::EVENT_TYPE).unwrap_or_default().to_string();
                let suggestion = suggest_pricing(session.get(field::TICKET_PRICE), &event_type);
                tracing::debug!(recommended = suggestion.recommended, "Pricing suggested");
                let summary = Value::String(suggestion.summary.clone());
                state
                    .wizard
                    .session
                    .edit_field(field::PRICING_SUGGESTION, summary);
                state.pricing = Some(suggestion);
                Effects::new()
            },
            CreateEventAction::SuggestAudience => {
                let segments = suggest_audience(
                    state.wizard.session.text(field::EVENT_TYPE).unwrap_or_default(),
                );
                tracing::debug!(?segments, "Audience suggested");
                state
                    .wizard
                    .session
                    .edit_field(field::TARGET_AUDIENCE, Value::from(segments));
                Effects::new()
            },
            CreateEventAction::GenerateContent(kind) => {
                let context = generation_context(&state.wizard.session);
                Self::content(state, ContentAction::generate(kind, context), env)
            },
            CreateEventAction::Content(action) => {
                let accepted = match &action {
                    ContentAction::Generated {
                        kind, request_id, ..
                    } => state.content.is_current(*kind, *request_id).then_some(*kind),
                    ContentAction::Overwrite { kind, .. } => Some(*kind),
                    _ => None,
                };
                let effects = Self::content(state, action, env);
                if let Some(kind) = accepted {
                    if let Some(text) = state.content.text(kind).map(str::to_string) {
                        state
                            .wizard
                            .session
                            .edit_field(field::for_content(kind), Value::String(text));
                    }
                }
                effects
            },
            CreateEventAction::Publish => {
                match publish(&state.wizard.session, env.clock.now()) {
                    Ok(event) => {
                        tracing::info!(
                            title = %event.title,
                            event_type = %event.event_type,
                            "Event published"
                        );
                        state.published = Some(event);
                        state.publish_error = None;
                    },
                    Err(error) => {
                        tracing::debug!(%error, "Publish rejected");
                        state.publish_error = Some(error);
                    },
                }
                Effects::new()
            },
        }
    }
}

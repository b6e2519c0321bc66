//! Event booking flow
//!
//! `PackageSelection → (Timing) → Form → (GroupSetup) → Confirmation`.
//! A dinner + event bundle goes through dinner timing; a group booking goes
//! through group setup. Reaching `Confirmation` finalizes the collected data
//! into a [`BookingConfirmation`].

use chrono::{DateTime, Utc};
use feastflow_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::environment::BookingEnvironment;
use crate::flow::{FieldCheck, FieldRule, FlowDefinition, FlowError, Guard, positive_integer};
use crate::reducer::{WizardAction, WizardReducer, WizardState};
use crate::session::{WizardSession, fields};

/// Booking flow steps, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStep {
    /// Choose bundle or event-only
    PackageSelection,
    /// Pick a dinner slot (bundle only)
    Timing,
    /// Party size and contact details
    Form,
    /// Invitees and payment split (group bookings only)
    GroupSetup,
    /// Booking confirmed
    Confirmation,
}

/// Field names collected by the booking flow
pub mod field {
    /// `"bundle"` or `"event-only"`
    pub const PACKAGE_TYPE: &str = "packageType";
    /// Timing option id
    pub const SELECTED_TIMING: &str = "selectedTiming";
    /// Number of people on this booking
    pub const PARTY_SIZE: &str = "partySize";
    /// Contact name
    pub const CONTACT_NAME: &str = "contactName";
    /// Contact phone
    pub const CONTACT_PHONE: &str = "contactPhone";
    /// Contact email
    pub const CONTACT_EMAIL: &str = "contactEmail";
    /// Free text
    pub const DIETARY_PREFERENCES: &str = "dietaryPreferences";
    /// Free text
    pub const TABLE_PREFERENCE: &str = "tablePreference";
    /// Free text
    pub const SPECIAL_REQUESTS: &str = "specialRequests";
    /// Whether to go through group setup
    pub const IS_GROUP_BOOKING: &str = "isGroupBooking";
    /// Optional group name
    pub const GROUP_NAME: &str = "groupName";
    /// List of `{name, phone, email?}`
    pub const INVITE_LIST: &str = "inviteList";
    /// Whether invitees pay their share
    pub const SPLIT_PAYMENT: &str = "splitPayment";
    /// Whether to open a group chat
    pub const GROUP_CHAT: &str = "groupChat";
    /// Shareable invite link
    pub const INVITE_LINK: &str = "inviteLink";
}

/// What is being booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Package {
    /// Dinner at the partner restaurant plus the event
    Bundle,
    /// Event ticket only
    EventOnly,
}

/// Per-person prices in rupees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceList {
    /// Dinner
    pub dinner: u64,
    /// Event ticket
    pub event: u64,
    /// Bundle price
    pub bundle: u64,
    /// Saving over booking dinner and event separately
    pub bundle_savings: u64,
}

/// Current prices
pub const PRICES: PriceList = PriceList {
    dinner: 800,
    event: 400,
    bundle: 1200,
    bundle_savings: 100,
};

impl Package {
    /// Value stored under [`field::PACKAGE_TYPE`]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bundle => "bundle",
            Self::EventOnly => "event-only",
        }
    }

    /// Price per person
    #[must_use]
    pub const fn unit_price(self) -> u64 {
        match self {
            Self::Bundle => PRICES.bundle,
            Self::EventOnly => PRICES.event,
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Package {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bundle" => Ok(Self::Bundle),
            "event-only" => Ok(Self::EventOnly),
            other => Err(format!("unknown package: {other}")),
        }
    }
}

/// A dinner slot relative to the event start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingOption {
    /// Stored under [`field::SELECTED_TIMING`]
    pub id: &'static str,
    /// Short name
    pub label: &'static str,
    /// Dinner start time
    pub dinner_time: &'static str,
    /// Minutes between the end of dinner and the event
    pub buffer_minutes: u32,
    /// Highlighted as the default choice
    pub recommended: bool,
}

/// Dinner slots offered with a bundle
pub const TIMING_OPTIONS: [TimingOption; 3] = [
    TimingOption {
        id: "perfect",
        label: "Perfect Timing",
        dinner_time: "6:00 PM",
        buffer_minutes: 30,
        recommended: true,
    },
    TimingOption {
        id: "quick",
        label: "Quick Bite",
        dinner_time: "6:45 PM",
        buffer_minutes: 15,
        recommended: false,
    },
    TimingOption {
        id: "relaxed",
        label: "Relaxed Dining",
        dinner_time: "5:30 PM",
        buffer_minutes: 45,
        recommended: false,
    },
];

/// Look up a timing option by id
#[must_use]
pub fn timing_option(id: &str) -> Option<TimingOption> {
    TIMING_OPTIONS.iter().copied().find(|t| t.id == id)
}

/// The booking flow definition
///
/// # Errors
///
/// Returns [`FlowError`] if the definition is inconsistent.
pub fn booking_flow() -> Result<FlowDefinition<BookingStep>, FlowError> {
    use field::{
        CONTACT_EMAIL, CONTACT_NAME, CONTACT_PHONE, DIETARY_PREFERENCES, GROUP_CHAT, GROUP_NAME,
        INVITE_LINK, INVITE_LIST, IS_GROUP_BOOKING, PACKAGE_TYPE, PARTY_SIZE, SELECTED_TIMING,
        SPECIAL_REQUESTS, SPLIT_PAYMENT, TABLE_PREFERENCE,
    };

    FlowDefinition::builder("booking")
        .step(BookingStep::PackageSelection, "Choose your experience", |s| {
            s.field(
                FieldRule::new(PACKAGE_TYPE)
                    .required()
                    .one_of([Package::Bundle.as_str(), Package::EventOnly.as_str()]),
            )
            .when(Guard::equals(PACKAGE_TYPE, Package::Bundle.as_str()), BookingStep::Timing)
            .otherwise(BookingStep::Form)
        })
        .step(BookingStep::Timing, "Choose your dinner timing", |s| {
            s.field(
                FieldRule::new(SELECTED_TIMING)
                    .required()
                    .one_of(TIMING_OPTIONS.iter().map(|t| t.id)),
            )
            .otherwise(BookingStep::Form)
        })
        .step(BookingStep::Form, "Booking details", |s| {
            s.field(
                FieldRule::new(PARTY_SIZE)
                    .required()
                    .check(FieldCheck::PositiveInteger)
                    .check(FieldCheck::AtMost(MAX_PARTY_SIZE)),
            )
            .field(FieldRule::new(CONTACT_NAME).required_text())
            .field(FieldRule::new(CONTACT_PHONE).required().check(FieldCheck::Phone))
            .field(FieldRule::new(CONTACT_EMAIL).required().check(FieldCheck::Email))
            .field(FieldRule::new(DIETARY_PREFERENCES))
            .field(FieldRule::new(TABLE_PREFERENCE))
            .field(FieldRule::new(SPECIAL_REQUESTS))
            .field(FieldRule::new(IS_GROUP_BOOKING).check(FieldCheck::Boolean))
            .when(Guard::truthy(IS_GROUP_BOOKING), BookingStep::GroupSetup)
            .otherwise(BookingStep::Confirmation)
        })
        .step(BookingStep::GroupSetup, "Group booking", |s| {
            s.field(FieldRule::new(GROUP_NAME))
                .field(
                    FieldRule::new(INVITE_LIST)
                        .check(FieldCheck::EachHas(vec!["name".into(), "phone".into()])),
                )
                .field(FieldRule::new(SPLIT_PAYMENT).check(FieldCheck::Boolean))
                .field(FieldRule::new(GROUP_CHAT).check(FieldCheck::Boolean))
                .field(FieldRule::new(INVITE_LINK))
                .otherwise(BookingStep::Confirmation)
        })
        .step(BookingStep::Confirmation, "Booking confirmed", |s| s)
        .entry(BookingStep::PackageSelection)
        .terminal(BookingStep::Confirmation)
        .build()
}

/// Who to contact about the booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    /// Name
    pub name: String,
    /// Phone
    pub phone: String,
    /// Email
    pub email: String,
}

/// A friend invited to a group booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitee {
    /// Name
    pub name: String,
    /// Phone
    pub phone: String,
    /// Email, if given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Group part of a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetails {
    /// Group name, if given
    pub group_name: Option<String>,
    /// Invited friends
    pub invitees: Vec<Invitee>,
    /// Whether invitees pay their share
    pub split_payment: bool,
    /// Whether a group chat is opened
    pub group_chat: bool,
    /// Shareable invite link
    pub invite_link: String,
    /// Everyone's share of the total when payment is split
    pub split_share: Option<u64>,
}

impl GroupDetails {
    /// Booker's party plus invitees
    #[must_use]
    pub fn headcount(&self, party_size: u64) -> u64 {
        party_size.saturating_add(u64::try_from(self.invitees.len()).unwrap_or(u64::MAX))
    }
}

/// A finalized booking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    /// `SWG` followed by nine uppercase alphanumerics
    pub booking_id: String,
    /// What was booked
    pub package: Package,
    /// Dinner slot (bundle only)
    pub timing: Option<TimingOption>,
    /// People on this booking
    pub party_size: u64,
    /// Contact details
    pub contact: ContactDetails,
    /// Dietary preferences
    pub dietary_preferences: Option<String>,
    /// Table preference
    pub table_preference: Option<String>,
    /// Special requests
    pub special_requests: Option<String>,
    /// Group details (group bookings only)
    pub group: Option<GroupDetails>,
    /// Unit price times party size
    pub total: u64,
    /// Total divided by party size, rounded
    pub per_person: u64,
    /// When the booking was confirmed
    pub confirmed_at: DateTime<Utc>,
}

/// Largest party a single booking can hold
pub const MAX_PARTY_SIZE: u64 = 20;

/// Prefix of every booking id
pub const BOOKING_ID_PREFIX: &str = "SWG";
const BOOKING_ID_LEN: usize = 9;
const INVITE_CODE_LEN: usize = 9;
const INVITE_LINK_BASE: &str = "https://feastflow.app/invite/group/";

fn divide_rounded(total: u64, count: u64) -> u64 {
    if count == 0 {
        return total;
    }
    total / count + u64::from(total % count >= count - count / 2)
}

fn invalid(field: &str, reason: impl Into<String>) -> FlowError {
    FlowError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn required_text(session: &WizardSession<BookingStep>, name: &str) -> Result<String, FlowError> {
    session
        .text(name)
        .map(str::to_string)
        .ok_or_else(|| invalid(name, "is required"))
}

fn optional_text(session: &WizardSession<BookingStep>, name: &str) -> Option<String> {
    session.text(name).map(str::to_string)
}

fn flag(session: &WizardSession<BookingStep>, name: &str, default: bool) -> bool {
    session.get(name).and_then(Value::as_bool).unwrap_or(default)
}

fn group_details(
    session: &WizardSession<BookingStep>,
    total: u64,
    party_size: u64,
) -> Result<GroupDetails, FlowError> {
    let invitees: Vec<Invitee> = match session.get(field::INVITE_LIST) {
        None | Some(Value::Null) => Vec::new(),
        Some(list) => serde_json::from_value(list.clone())
            .map_err(|e| invalid(field::INVITE_LIST, e.to_string()))?,
    };
    let split_payment = flag(session, field::SPLIT_PAYMENT, true);
    let mut group = GroupDetails {
        group_name: optional_text(session, field::GROUP_NAME),
        invitees,
        split_payment,
        group_chat: flag(session, field::GROUP_CHAT, true),
        invite_link: optional_text(session, field::INVITE_LINK).unwrap_or_default(),
        split_share: None,
    };
    if split_payment {
        group.split_share = Some(divide_rounded(total, group.headcount(party_size)));
    }
    Ok(group)
}

/// Turn a completed booking session into a confirmation
///
/// A stale timing choice is ignored for event-only bookings, and group
/// details are only included when the booking is a group booking.
///
/// # Errors
///
/// Returns [`FlowError::Incomplete`] before the confirmation step, or
/// [`FlowError::InvalidField`] if collected data cannot be interpreted.
pub fn finalize(
    session: &WizardSession<BookingStep>,
    booking_id: String,
    confirmed_at: DateTime<Utc>,
) -> Result<BookingConfirmation, FlowError> {
    if !session.is_complete() {
        return Err(FlowError::Incomplete(format!("{:?}", session.current_step())));
    }

    let package: Package = required_text(session, field::PACKAGE_TYPE)?
        .parse()
        .map_err(|e: String| invalid(field::PACKAGE_TYPE, e))?;
    let timing = match package {
        Package::Bundle => {
            let id = required_text(session, field::SELECTED_TIMING)?;
            let timing = timing_option(&id)
                .ok_or_else(|| invalid(field::SELECTED_TIMING, "unknown timing"))?;
            Some(timing)
        },
        Package::EventOnly => None,
    };
    let party_size = session
        .get(field::PARTY_SIZE)
        .and_then(positive_integer)
        .ok_or_else(|| invalid(field::PARTY_SIZE, "must be a whole number of at least 1"))?;

    let total = package
        .unit_price()
        .checked_mul(party_size)
        .ok_or_else(|| invalid(field::PARTY_SIZE, "is too large"))?;
    let group = if flag(session, field::IS_GROUP_BOOKING, false) {
        Some(group_details(session, total, party_size)?)
    } else {
        None
    };

    Ok(BookingConfirmation {
        booking_id,
        package,
        timing,
        party_size,
        contact: ContactDetails {
            name: required_text(session, field::CONTACT_NAME)?,
            phone: required_text(session, field::CONTACT_PHONE)?,
            email: required_text(session, field::CONTACT_EMAIL)?,
        },
        dietary_preferences: optional_text(session, field::DIETARY_PREFERENCES),
        table_preference: optional_text(session, field::TABLE_PREFERENCE),
        special_requests: optional_text(session, field::SPECIAL_REQUESTS),
        group,
        total,
        per_person: divide_rounded(total, party_size),
        confirmed_at,
    })
}

/// Booking intents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BookingAction {
    /// Field edit or navigation
    Wizard(WizardAction),
    /// Choose a package and continue
    SelectPackage(Package),
    /// Choose a dinner slot and continue
    SelectTiming(String),
    /// Abandon the booking
    Cancel,
}

/// Booking state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingState {
    /// Wizard progress
    pub wizard: WizardState<BookingStep>,
    /// Set when the flow reaches confirmation
    pub confirmation: Option<BookingConfirmation>,
    /// Why finalization failed, if it did
    #[serde(skip)]
    pub finalize_error: Option<FlowError>,
}

impl BookingState {
    /// Step the user is on
    #[must_use]
    pub const fn current_step(&self) -> BookingStep {
        self.wizard.session.current_step()
    }
}

/// Reducer for the booking flow
#[derive(Debug, Clone)]
pub struct BookingReducer {
    wizard: WizardReducer<BookingStep>,
}

impl BookingReducer {
    /// Create a reducer for the booking flow
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] if the flow definition is inconsistent.
    pub fn new() -> Result<Self, FlowError> {
        Ok(Self {
            wizard: WizardReducer::new(booking_flow()?),
        })
    }

    /// The booking flow
    #[must_use]
    pub fn flow(&self) -> &FlowDefinition<BookingStep> {
        self.wizard.flow()
    }

    /// Fresh state at package selection
    #[must_use]
    pub fn initial_state(&self) -> BookingState {
        BookingState {
            wizard: self.wizard.initial_state(),
            confirmation: None,
            finalize_error: None,
        }
    }

    fn navigate(&self, state: &mut BookingState, action: WizardAction, env: &BookingEnvironment) {
        self.wizard.apply(&mut state.wizard, action);
        let entered_group = state.wizard.just_entered(BookingStep::GroupSetup);
        let session = &mut state.wizard.session;

        if entered_group && session.get(field::INVITE_LINK).is_none() {
            let code = env.references.reference(INVITE_CODE_LEN).to_lowercase();
            let link = format!("{INVITE_LINK_BASE}{code}");
            session.edit_field(field::INVITE_LINK, Value::String(link));
        }

        if session.is_complete() {
            if state.confirmation.is_none() {
                let booking_id = format!(
                    "{BOOKING_ID_PREFIX}{}",
                    env.references.reference(BOOKING_ID_LEN)
                );
                match finalize(session, booking_id, env.clock.now()) {
                    Ok(confirmation) => {
                        tracing::info!(
                            booking_id = %confirmation.booking_id,
                            package = %confirmation.package,
                            party_size = confirmation.party_size,
                            total = confirmation.total,
                            "Booking confirmed"
                        );
                        state.confirmation = Some(confirmation);
                        state.finalize_error = None;
                    },
                    Err(error) => {
                        tracing::warn!(%error, "Booking could not be finalized");
                        state.finalize_error = Some(error);
                    },
                }
            }
        } else {
            state.confirmation = None;
            state.finalize_error = None;
        }
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookingAction::Wizard(action) => self.navigate(state, action, env),
            BookingAction::SelectPackage(package) => {
                let updates = fields([(field::PACKAGE_TYPE, package.as_str())]);
                self.navigate(state, WizardAction::submit(updates), env);
            },
            BookingAction::SelectTiming(id) => {
                let updates = fields([(field::SELECTED_TIMING, id)]);
                self.navigate(state, WizardAction::submit(updates), env);
            },
            BookingAction::Cancel => {
                tracing::debug!(step = ?state.current_step(), "Booking cancelled");
                *state = self.initial_state();
            },
        }
        smallvec![Effect::None]
    }
}

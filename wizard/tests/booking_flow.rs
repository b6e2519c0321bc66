//! End-to-end booking through the store

#![allow(clippy::unwrap_used)] // Test code

use feastflow_core::environment::Clock;
use feastflow_runtime::Store;
use feastflow_testing::test_clock;
use feastflow_wizard::WizardAction;
use feastflow_wizard::booking::{
    BookingAction, BookingReducer, BookingState, BookingStep, Package, field,
};
use feastflow_wizard::environment::{BookingEnvironment, ReferenceSource};
use feastflow_wizard::session::{FieldMap, fields};
use serde_json::json;
use std::sync::Arc;

struct FixedReferences;

impl ReferenceSource for FixedReferences {
    fn reference(&self, len: usize) -> String {
        "K7Q2M9X4PZ".chars().cycle().take(len).collect()
    }
}

type BookingStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

fn store() -> BookingStore {
    let reducer = BookingReducer::new().unwrap();
    let env = BookingEnvironment::new(Arc::new(test_clock()), Arc::new(FixedReferences));
    Store::new(reducer.initial_state(), reducer, env)
}

fn details(group: bool) -> FieldMap {
    fields([
        (field::PARTY_SIZE, json!("3")),
        (field::CONTACT_NAME, json!("Meera Iyer")),
        (field::CONTACT_PHONE, json!("9845012345")),
        (field::CONTACT_EMAIL, json!("meera@example.in")),
        (field::DIETARY_PREFERENCES, json!("vegetarian")),
        (field::IS_GROUP_BOOKING, json!(group)),
    ])
}

async fn step(store: &BookingStore) -> BookingStep {
    store.state(BookingState::current_step).await
}

async fn send(store: &BookingStore, action: BookingAction) {
    store.send(action).await.unwrap().wait().await;
}

#[tokio::test]
async fn test_bundle_booking_reaches_confirmation_directly() {
    let store = store();
    assert_eq!(step(&store).await, BookingStep::PackageSelection);
    assert!(!store.state(|s| s.wizard.session.is_complete()).await);

    send(&store, BookingAction::SelectPackage(Package::Bundle)).await;
    assert_eq!(step(&store).await, BookingStep::Timing);

    send(&store, BookingAction::SelectTiming("perfect".into())).await;
    assert_eq!(step(&store).await, BookingStep::Form);
    let timing = store
        .state(|s| s.wizard.session.get(field::SELECTED_TIMING).cloned())
        .await;
    assert_eq!(timing, Some(json!("perfect")));

    send(&store, BookingAction::Wizard(WizardAction::submit(details(false)))).await;
    assert_eq!(step(&store).await, BookingStep::Confirmation);

    let (complete, history, confirmation) = store
        .state(|s| {
            (
                s.wizard.session.is_complete(),
                s.wizard.session.history().to_vec(),
                s.confirmation.clone(),
            )
        })
        .await;
    assert!(complete);
    assert_eq!(
        history,
        vec![BookingStep::PackageSelection, BookingStep::Timing, BookingStep::Form]
    );

    let confirmation = confirmation.unwrap();
    assert_eq!(confirmation.booking_id, "SWGK7Q2M9X4P");
    assert_eq!(confirmation.package, Package::Bundle);
    assert_eq!(confirmation.timing.map(|t| t.dinner_time), Some("6:00 PM"));
    assert_eq!(confirmation.party_size, 3);
    assert_eq!(confirmation.total, 3600);
    assert_eq!(confirmation.per_person, 1200);
    assert_eq!(confirmation.dietary_preferences.as_deref(), Some("vegetarian"));
    assert!(confirmation.group.is_none());
    assert_eq!(confirmation.confirmed_at, test_clock().now());
}

#[tokio::test]
async fn test_group_booking_goes_through_group_setup() {
    let store = store();
    send(&store, BookingAction::SelectPackage(Package::EventOnly)).await;
    assert_eq!(step(&store).await, BookingStep::Form);

    send(&store, BookingAction::Wizard(WizardAction::submit(details(true)))).await;
    assert_eq!(step(&store).await, BookingStep::GroupSetup);

    let link = store
        .state(|s| s.wizard.session.text(field::INVITE_LINK).map(str::to_string))
        .await
        .unwrap();
    assert!(link.ends_with("/k7q2m9x4p"));

    send(
        &store,
        BookingAction::Wizard(WizardAction::submit(fields([
            (field::GROUP_NAME, json!("Office crew")),
            (
                field::INVITE_LIST,
                json!([
                    {"name": "Ravi", "phone": "9876501234"},
                    {"name": "Sana", "phone": "9876505678", "email": "sana@example.in"}
                ]),
            ),
            (field::SPLIT_PAYMENT, json!(true)),
        ]))),
    )
    .await;

    let confirmation = store.state(|s| s.confirmation.clone()).await.unwrap();
    assert!(confirmation.timing.is_none());
    assert_eq!(confirmation.total, 1200);

    let group = confirmation.group.unwrap();
    assert_eq!(group.group_name.as_deref(), Some("Office crew"));
    assert_eq!(group.invitees.len(), 2);
    assert_eq!(group.headcount(confirmation.party_size), 5);
    assert_eq!(group.split_share, Some(240));
    assert_eq!(group.invite_link, link);
}

#[tokio::test]
async fn test_back_from_confirmation_reopens_booking() {
    let store = store();
    send(&store, BookingAction::SelectPackage(Package::EventOnly)).await;
    send(&store, BookingAction::Wizard(WizardAction::submit(details(false)))).await;
    assert!(store.state(|s| s.confirmation.is_some()).await);

    send(&store, BookingAction::Wizard(WizardAction::GoBack)).await;
    assert_eq!(step(&store).await, BookingStep::Form);
    assert!(store.state(|s| s.confirmation.is_none()).await);

    // Entered values pre-fill the form again
    let view = store
        .state(|s| s.wizard.session.get(field::CONTACT_NAME).cloned())
        .await;
    assert_eq!(view, Some(json!("Meera Iyer")));

    send(
        &store,
        BookingAction::Wizard(WizardAction::submit(fields([(field::PARTY_SIZE, 4)]))),
    )
    .await;
    let total = store.state(|s| s.confirmation.as_ref().map(|c| c.total)).await;
    assert_eq!(total, Some(1600));
}

#[tokio::test]
async fn test_invalid_form_surfaces_field_errors() {
    let store = store();
    send(&store, BookingAction::SelectPackage(Package::EventOnly)).await;
    send(
        &store,
        BookingAction::Wizard(WizardAction::submit(fields([
            (field::PARTY_SIZE, json!(0)),
            (field::CONTACT_NAME, json!("  ")),
            (field::CONTACT_PHONE, json!("12")),
            (field::CONTACT_EMAIL, json!("meera@")),
        ]))),
    )
    .await;

    let (current, errors) = store
        .state(|s| {
            let fields: Vec<String> = s
                .wizard
                .errors
                .fields()
                .into_iter()
                .map(str::to_string)
                .collect();
            (s.current_step(), fields)
        })
        .await;
    assert_eq!(current, BookingStep::Form);
    assert_eq!(
        errors,
        vec![
            field::PARTY_SIZE,
            field::CONTACT_NAME,
            field::CONTACT_PHONE,
            field::CONTACT_EMAIL
        ]
    );
    assert!(store.state(|s| s.wizard.session.get(field::CONTACT_NAME).is_none()).await);
}

#[tokio::test]
async fn test_oversized_party_stays_on_form() {
    let store = store();
    send(&store, BookingAction::SelectPackage(Package::Bundle)).await;
    send(&store, BookingAction::SelectTiming("relaxed".into())).await;

    let mut oversized = details(false);
    oversized.insert(field::PARTY_SIZE.to_string(), json!("18446744073709551615"));
    send(&store, BookingAction::Wizard(WizardAction::submit(oversized))).await;

    let (current, errors, confirmed) = store
        .state(|s| {
            (
                s.current_step(),
                s.wizard.errors.fields().len(),
                s.confirmation.is_some(),
            )
        })
        .await;
    assert_eq!(current, BookingStep::Form);
    assert_eq!(errors, 1);
    assert!(!confirmed);
}

#[tokio::test]
async fn test_cancel_discards_the_booking() {
    let store = store();
    send(&store, BookingAction::SelectPackage(Package::Bundle)).await;
    send(&store, BookingAction::SelectTiming("quick".into())).await;
    send(&store, BookingAction::Cancel).await;

    let (current, data_empty, history_empty) = store
        .state(|s| {
            (
                s.current_step(),
                s.wizard.session.collected_data().is_empty(),
                s.wizard.session.history().is_empty(),
            )
        })
        .await;
    assert_eq!(current, BookingStep::PackageSelection);
    assert!(data_empty);
    assert!(history_empty);
}

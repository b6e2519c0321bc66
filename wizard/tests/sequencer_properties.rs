//! Property tests for the step sequencer

#![allow(clippy::unwrap_used)] // Test code

use feastflow_wizard::booking::{BookingStep, booking_flow, field};
use feastflow_wizard::content::{ContentKind, GenerationContext, fallback};
use feastflow_wizard::session::{FieldMap, StepOutcome, WizardSession, fields};
use proptest::prelude::*;
use serde_json::json;

#[derive(Debug, Clone)]
enum Op {
    /// Submit values that pass the current step, with these branch choices
    Submit { bundle: bool, group: bool },
    /// Submit values that fail the current step
    SubmitInvalid,
    /// Go back
    Back,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<bool>(), any::<bool>())
            .prop_map(|(bundle, group)| Op::Submit { bundle, group }),
        1 => Just(Op::SubmitInvalid),
        1 => Just(Op::Back),
    ]
}

fn valid_updates(step: BookingStep, bundle: bool, group: bool) -> FieldMap {
    match step {
        BookingStep::PackageSelection => fields([(
            field::PACKAGE_TYPE,
            if bundle { "bundle" } else { "event-only" },
        )]),
        BookingStep::Timing => fields([(field::SELECTED_TIMING, "relaxed")]),
        BookingStep::Form => fields([
            (field::PARTY_SIZE, json!(2)),
            (field::CONTACT_NAME, json!("Kabir")),
            (field::CONTACT_PHONE, json!("9811122233")),
            (field::CONTACT_EMAIL, json!("kabir@example.in")),
            (field::IS_GROUP_BOOKING, json!(group)),
        ]),
        BookingStep::GroupSetup => fields([(field::SPLIT_PAYMENT, json!(false))]),
        BookingStep::Confirmation => FieldMap::new(),
    }
}

fn invalid_updates(step: BookingStep) -> FieldMap {
    match step {
        BookingStep::PackageSelection => fields([(field::PACKAGE_TYPE, "dinner-only")]),
        BookingStep::Timing => fields([(field::SELECTED_TIMING, "midnight")]),
        BookingStep::Form => fields([(field::PARTY_SIZE, json!(-1))]),
        BookingStep::GroupSetup => fields([(field::INVITE_LIST, json!([{"phone": "9811122233"}]))]),
        BookingStep::Confirmation => FieldMap::new(),
    }
}

#[test]
fn start_is_not_complete() {
    let flow = booking_flow().unwrap();
    let session = WizardSession::start(&flow);
    assert_ne!(flow.entry(), flow.terminal());
    assert!(!session.is_complete());
    assert!(session.history().is_empty());
    assert!(session.collected_data().is_empty());
}

proptest! {
    #[test]
    fn history_counts_forward_transitions(ops in prop::collection::vec(op(), 0..40)) {
        let flow = booking_flow().unwrap();
        let mut session = WizardSession::start(&flow);
        let mut depth = 0usize;

        for op in ops {
            let before = session.clone();
            match op {
                Op::Submit { bundle, group } => {
                    let updates = valid_updates(session.current_step(), bundle, group);
                    match session.submit_step(&flow, updates).unwrap() {
                        StepOutcome::Advanced { from, .. } => {
                            depth += 1;
                            prop_assert_eq!(session.history().last(), Some(&from));
                        },
                        StepOutcome::Unchanged(_) => prop_assert_eq!(&session, &before),
                    }
                },
                Op::SubmitInvalid => {
                    if session.is_complete() {
                        continue;
                    }
                    let updates = invalid_updates(session.current_step());
                    prop_assert!(session.submit_step(&flow, updates).is_err());
                    prop_assert_eq!(&session, &before);
                },
                Op::Back => {
                    if session.go_back().is_some() {
                        depth -= 1;
                        prop_assert_eq!(session.collected_data(), before.collected_data());
                    } else {
                        prop_assert_eq!(&session, &before);
                    }
                },
            }

            prop_assert_eq!(session.history().len(), depth);
            prop_assert!(flow.contains(session.current_step()));
            prop_assert_eq!(
                session.is_complete(),
                session.current_step() == flow.terminal()
            );
        }
    }

    #[test]
    fn back_restores_previous_step_and_keeps_values(
        bundle in any::<bool>(),
        group in any::<bool>(),
    ) {
        let flow = booking_flow().unwrap();
        let mut session = WizardSession::start(&flow);
        let mut visited = Vec::new();

        while !session.is_complete() {
            visited.push(session.current_step());
            let updates = valid_updates(session.current_step(), bundle, group);
            session.submit_step(&flow, updates).unwrap();
        }
        let collected = session.collected_data().clone();

        for expected in visited.iter().rev() {
            prop_assert_eq!(session.go_back(), Some(*expected));
            prop_assert_eq!(session.current_step(), *expected);
            prop_assert_eq!(session.collected_data(), &collected);
        }
        prop_assert_eq!(session.go_back(), None);
        prop_assert_eq!(session.current_step(), flow.entry());
    }

    #[test]
    fn package_type_picks_next_step(bundle in any::<bool>()) {
        let flow = booking_flow().unwrap();
        let mut session = WizardSession::start(&flow);
        let outcome = session
            .submit_step(&flow, valid_updates(BookingStep::PackageSelection, bundle, false))
            .unwrap();
        let expected = if bundle { BookingStep::Timing } else { BookingStep::Form };
        prop_assert_eq!(outcome.current(), expected);
    }

    #[test]
    fn group_flag_picks_next_step(bundle in any::<bool>(), group in any::<bool>()) {
        let flow = booking_flow().unwrap();
        let mut session = WizardSession::start(&flow);
        while session.current_step() != BookingStep::Form {
            let updates = valid_updates(session.current_step(), bundle, group);
            session.submit_step(&flow, updates).unwrap();
        }
        let outcome = session
            .submit_step(&flow, valid_updates(BookingStep::Form, bundle, group))
            .unwrap();
        let expected = if group { BookingStep::GroupSetup } else { BookingStep::Confirmation };
        prop_assert_eq!(outcome.current(), expected);
    }

    #[test]
    fn reset_returns_to_entry(ops in prop::collection::vec(op(), 1..20)) {
        let flow = booking_flow().unwrap();
        let mut session = WizardSession::start(&flow);
        for op in ops {
            if let Op::Submit { bundle, group } = op {
                let updates = valid_updates(session.current_step(), bundle, group);
                session.submit_step(&flow, updates).unwrap();
            }
        }
        session.reset(&flow);
        prop_assert_eq!(session.current_step(), flow.entry());
        prop_assert!(session.collected_data().is_empty());
        prop_assert!(session.history().is_empty());
        prop_assert_eq!(&session, &WizardSession::start(&flow));
    }

    #[test]
    fn fallback_title_is_stable_and_resolved(location in "[A-Za-z][A-Za-z ]{0,24}") {
        let context = GenerationContext::new("Food Festival", location, "");
        let title = fallback::generate(ContentKind::Title, &context);
        prop_assert!(!title.trim().is_empty());
        let braced = title.contains(['{', '}']);
        prop_assert!(!braced);
        prop_assert!(fallback::candidates(ContentKind::Title, &context).contains(&title));
        prop_assert_eq!(fallback::generate(ContentKind::Title, &context), title);
    }
}

#[test]
fn fallback_title_for_koramangala() {
    let context = GenerationContext::new("Food Festival", "Koramangala", "");
    let title = fallback::generate(ContentKind::Title, &context);
    let candidates = fallback::candidates(ContentKind::Title, &context);
    assert_eq!(candidates.len(), 4);
    assert!(candidates.contains(&title));
    assert!(!title.is_empty());
}

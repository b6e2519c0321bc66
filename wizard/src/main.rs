//! Feastflow demo
//!
//! Walks a bundle booking through the booking flow, then drafts copy for an
//! event. Drafts come from Claude when `ANTHROPIC_API_KEY` is set and from
//! templates otherwise.
//!
//! ```bash
//! RUST_LOG=feastflow_wizard=debug cargo run --bin feastflow
//! ```

use anyhow::Context as _;
use feastflow_runtime::Store;
use feastflow_wizard::booking::{BookingAction, BookingReducer, Package, field};
use feastflow_wizard::config::WizardConfig;
use feastflow_wizard::content::{
    ContentAction, ContentKind, ContentReducer, ContentState, GenerationContext,
};
use feastflow_wizard::environment::{BookingEnvironment, ContentEnvironment};
use feastflow_wizard::session::fields;
use feastflow_wizard::WizardAction;
use serde_json::json;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feastflow_wizard=debug,feastflow_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = WizardConfig::from_env().context("loading configuration")?;
    tracing::info!(
        environment = %config.environment,
        live = config.generation.live_enabled(),
        "Configuration loaded"
    );

    book_bundle().await?;
    draft_content(&config).await?;

    Ok(())
}

async fn book_bundle() -> anyhow::Result<()> {
    println!("=== Booking: dinner + event bundle ===");

    let reducer = BookingReducer::new().context("building booking flow")?;
    let store = Store::new(reducer.initial_state(), reducer, BookingEnvironment::default());

    store.send(BookingAction::SelectPackage(Package::Bundle)).await?;
    store.send(BookingAction::SelectTiming("perfect".to_string())).await?;
    store
        .send(BookingAction::Wizard(WizardAction::submit(fields([
            (field::PARTY_SIZE, json!(2)),
            (field::CONTACT_NAME, json!("Asha Rao")),
            (field::CONTACT_PHONE, json!("+91 98765 43210")),
            (field::CONTACT_EMAIL, json!("asha@example.in")),
            (field::IS_GROUP_BOOKING, json!(false)),
        ]))))
        .await?;

    let confirmation = store.state(|s| s.confirmation.clone()).await;
    let confirmation = confirmation.context("booking did not reach confirmation")?;
    println!("{}", serde_json::to_string_pretty(&confirmation)?);
    Ok(())
}

async fn draft_content(config: &WizardConfig) -> anyhow::Result<()> {
    println!("\n=== Content: Food Festival in Koramangala ===");

    let env = ContentEnvironment::from_config(config);
    let labeling = env.config.source_labeling;
    let wait = config.generation.timeout() + Duration::from_secs(1);
    let store = Store::new(ContentState::default(), ContentReducer, env);
    let context =
        GenerationContext::new("Food Festival", "Koramangala", "Koramangala Food Carnival");

    for kind in ContentKind::ALL {
        store
            .send_and_wait_for(
                ContentAction::generate(kind, context.clone()),
                |action| matches!(action, ContentAction::Generated { kind: k, .. } if *k == kind),
                wait,
            )
            .await
            .with_context(|| format!("drafting {kind}"))?;

        let drafted = store
            .state(|s| s.labelled(kind, labeling).map(|(text, label)| (text.to_string(), label)))
            .await;
        if let Some((text, label)) = drafted {
            println!("\n[{kind}] ({label})\n{text}");
        }
    }
    Ok(())
}

//! Command-line walkthrough of the ride board.
//!
//! Runs the rider/ride-sharer flow against an in-memory store and prints the
//! resulting board.

use rideboard::history::history_feed;
use rideboard::views::{kpis, request_cards};
use rideboard::{
    demo_credentials, demo_roster, Config, DriverId, RequestForm, RequestId, RideAction,
    RideBoardState, RideEnvironment, RideReducer, Role, TracingRenderer,
};
use rideboard_core::environment::SystemClock;
use rideboard_runtime::Store;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type RideStore = Store<RideBoardState, RideAction, RideEnvironment, RideReducer>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rideboard=info,rideboard_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config::from_env();
    tracing::info!(
        demo_mode = config.demo_mode,
        window_secs = config.window().as_secs(),
        "Starting ride board"
    );

    let roster = Arc::new(demo_roster());
    let env = RideEnvironment::new(
        Arc::new(SystemClock),
        Arc::new(demo_credentials()),
        Arc::clone(&roster),
        Arc::new(TracingRenderer),
    )
    .with_config(&config);
    let store = Store::new(RideBoardState::new(), RideReducer::new(), env);

    store.send(RideAction::StartNoticeTicker).await?;

    println!("=== Ride Board ===\n");

    let request_id = RequestId::new();
    println!("Sam asks for a ride from Main St...");
    store
        .send(RideAction::SubmitRequest {
            request_id,
            form: RequestForm::new("Sam", "Main St").with_contact("555-123-4567"),
        })
        .await?;

    sign_in(&store, "d1", "alice123").await?;
    println!("Alice accepts...");
    store
        .send(RideAction::AcceptRequest {
            request_id,
            driver_id: DriverId::new("d1"),
        })
        .await?;
    store
        .send(RideAction::SendRideSharerMessage {
            request_id,
            text: "Running a few minutes late".to_string(),
        })
        .await?;

    println!("Alice backs out and asks for help...");
    store
        .send(RideAction::CancelByRideSharer {
            request_id,
            driver_id: DriverId::new("d1"),
            help: true,
        })
        .await?;

    sign_in(&store, "d2", "ben123").await?;
    println!("Ben takes over...");
    store
        .send(RideAction::AcceptRequest {
            request_id,
            driver_id: DriverId::new("d2"),
        })
        .await?;

    let state = store.state(Clone::clone).await;

    println!("\nRequests:");
    for card in request_cards(&state, &roster) {
        let driver = card
            .assignment
            .as_ref()
            .map_or_else(String::new, |a| format!(" ({})", a.driver_name));
        println!("  {}{} at {}", card.header, driver, card.pickup);
    }

    let counts = kpis(&state);
    println!(
        "\nTotal: {}  Accepted: {}  Pending: {}  Cancelled: {}",
        counts.total, counts.accepted, counts.pending, counts.cancelled
    );

    println!("\nHistory:");
    for line in history_feed(&state.history, &roster) {
        println!("  {}", line.text);
    }

    println!("\nSnapshot:\n{}", serde_json::to_string_pretty(&state)?);

    store.send(RideAction::StopNoticeTicker).await?;
    store.shutdown(config.shutdown_timeout()).await?;

    Ok(())
}

async fn sign_in(store: &RideStore, driver: &str, passcode: &str) -> anyhow::Result<()> {
    store
        .send(RideAction::SelectRole {
            role: Role::RideSharer,
        })
        .await?;
    store
        .send(RideAction::SelectDriver {
            driver_id: DriverId::new(driver),
        })
        .await?;
    store
        .send(RideAction::SignIn {
            passcode: passcode.to_string(),
        })
        .await?;
    Ok(())
}

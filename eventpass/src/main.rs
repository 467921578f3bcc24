//! EventPass Demo
//!
//! Scripted organizer session against the application store:
//! - Creating, updating and publishing an event
//! - Selecting the current event
//! - Checking attendees in, including a rejected re-used pass, and searching the log
//! - Deleting an event and reading the dashboard figures
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info,eventpass=debug cargo run --bin eventpass-demo
//! ```

use eventpass::{
    AppAction, AppEnvironment, AppError, AppProvider, AppStore, CheckInRequest, Config,
    EventDraft, EventId, EventPatch, EventStatus, StatusFilter, StoreError, app_actions,
    build_store, dispatch_json, use_app_state,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Dispatch an action, logging a rejection instead of aborting the session
async fn dispatch(store: &AppStore, action: AppAction) -> anyhow::Result<()> {
    let tag = action.tag();
    match store.send(action).await {
        Ok(()) => Ok(()),
        Err(StoreError::Rejected(error)) => {
            tracing::warn!(action = tag, %error, "Action rejected");
            Ok(())
        },
        Err(error) => Err(error.into()),
    }
}

fn check_in_request(n: u32, pass_code: &str, event_id: &EventId) -> CheckInRequest {
    CheckInRequest {
        id: format!("checkin-{n}").into(),
        name: format!("Attendee {n}"),
        pass_code: pass_code.to_string(),
        event_id: event_id.clone(),
    }
}

async fn session() -> anyhow::Result<()> {
    let store = use_app_state()?;

    let mut applied = store.subscribe_actions();

    dispatch(&store, app_actions::set_loading(true)).await?;
    dispatch(
        &store,
        app_actions::create_event(EventDraft {
            title: "Rust Meetup".to_string(),
            description: "Monthly community meetup".to_string(),
            date: "2024-08-01".to_string(),
            time: "18:30".to_string(),
            location: "Community Hall".to_string(),
            price: 15.0,
            capacity: 2,
        }),
    )
    .await?;
    dispatch(&store, app_actions::set_loading(false)).await?;

    let Some(meetup) = store
        .state(|s| s.search_events("meetup", StatusFilter::All).first().map(|e| (*e).clone()))
        .await
    else {
        anyhow::bail!("created event is missing from the store");
    };
    tracing::info!(event_id = %meetup.id, title = %meetup.title, "Created event");

    dispatch(
        &store,
        app_actions::update_event(
            meetup.id.clone(),
            EventPatch::default().with_attendees(2).with_rating(4.9),
        ),
    )
    .await?;
    dispatch(&store, app_actions::set_event_status(meetup.id.clone(), EventStatus::Live)).await?;
    dispatch(&store, app_actions::set_current_event(Some(meetup.clone()))).await?;

    dispatch(&store, app_actions::check_in_attendee(check_in_request(1, "PASS-A", &meetup.id))).await?;
    dispatch(&store, app_actions::check_in_attendee(check_in_request(2, "PASS-A", &meetup.id))).await?;
    dispatch(&store, app_actions::check_in_attendee(check_in_request(3, "PASS-B", &meetup.id))).await?;
    dispatch(&store, app_actions::check_in_attendee(check_in_request(4, "PASS-C", &meetup.id))).await?;

    let pass_a_holders: Vec<String> = store
        .state(|s| {
            s.search_check_ins("pass-a")
                .into_iter()
                .map(|entry| entry.name.clone())
                .collect()
        })
        .await;
    tracing::info!(?pass_a_holders, "Check-ins matching PASS-A");

    if let Some(metrics) = store.state(|s| s.metrics_for(&meetup.id)).await {
        tracing::info!(
            checked_in = metrics.checked_in,
            revenue = metrics.revenue,
            checkin_rate = metrics.checkin_rate,
            "Event metrics"
        );
    }

    match dispatch_json(&store, r#"{"type":"DELETE_EVENT","payload":"2"}"#).await {
        Ok(()) | Err(StoreError::Rejected(_)) => {},
        Err(error) => return Err(error.into()),
    }
    if let Err(StoreError::Rejected(AppError::UnknownAction { tag })) =
        dispatch_json(&store, r#"{"type":"ARCHIVE_EVENT","payload":"1"}"#).await
    {
        tracing::info!(%tag, "Unknown action type was refused");
    }

    let (counts, totals, recent) = store
        .state(|s| {
            let recent: Vec<String> = s
                .recent_check_ins(5)
                .into_iter()
                .map(|entry| entry.name.clone())
                .collect();
            (s.status_counts(), s.dashboard_totals(), recent)
        })
        .await;

    tracing::info!(
        all = counts.all,
        live = counts.live,
        upcoming = counts.upcoming,
        completed = counts.completed,
        "Events by status"
    );
    tracing::info!(
        total_revenue = totals.total_revenue,
        total_attendees = totals.total_attendees,
        average_rating = totals.average_rating,
        average_checkin_rate = totals.average_checkin_rate,
        "Dashboard totals"
    );
    tracing::info!(?recent, "Recent check-ins");

    let mut rerenders = 0usize;
    while let Ok(action) = applied.try_recv() {
        rerenders += 1;
        tracing::debug!(action = action.tag(), "Subscriber saw applied action");
    }
    tracing::info!(rerenders, "Subscriber caught up");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(?config, "Starting EventPass demo session");

    let provider = AppProvider::new(build_store(&config, AppEnvironment::production()));

    provider.mount(session()).await??;

    tracing::info!("Demo session finished");
    Ok(())
}

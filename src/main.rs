// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::{RwLock, broadcast};
use tracing_subscriber::EnvFilter;

use crate::application::district_service::DistrictService;
use crate::application::goal_service::GoalService;
use crate::application::scheduler::ViewingScheduler;
use crate::application::trend_service::TrendService;
use crate::domain::dashboard::DashboardState;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_transport::ReqwestTransport;
use crate::infrastructure::thingspeak_repository::ThingSpeakRepository;
use crate::infrastructure::timezone::resolve_timezone;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

const EVENT_BUFFER: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    let timezone = resolve_timezone(config.thingspeak.timezone.as_deref());
    tracing::info!("Using time zone {}", timezone.name());

    // Create repository (infrastructure layer)
    let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(
        config.thingspeak.request_timeout_secs,
    ))?);
    let repository = Arc::new(ThingSpeakRepository::new(
        config.thingspeak.base_url.clone(),
        timezone,
        transport,
    ));

    // Create services (application layer)
    let state = Arc::new(RwLock::new(DashboardState::seeded()));
    let (events, _) = broadcast::channel(EVENT_BUFFER);

    let district_service = DistrictService::new(
        repository.clone(),
        config.districts.clone(),
        state.clone(),
        events.clone(),
    );
    let trend_service = TrendService::new(
        repository.clone(),
        config.districts.clone(),
        state.clone(),
        events.clone(),
    );
    let goal_service = GoalService::new(
        repository,
        config.districts.clone(),
        config.goals.clone(),
        timezone,
        state.clone(),
        events.clone(),
    );
    let scheduler = ViewingScheduler::new(
        district_service.clone(),
        trend_service.clone(),
        config.polling.clone(),
        timezone,
        state,
        events.clone(),
    );

    // Initial load runs in the background so the server starts immediately
    {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.start().await });
    }

    // Create application state
    let app_state = Arc::new(AppState {
        district_service,
        trend_service,
        goal_service,
        scheduler: scheduler.clone(),
        events,
        timezone,
    });

    // Build router (presentation layer)
    let router = build_router(app_state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting district-air-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    scheduler.stop().await;
    tracing::info!("Polling stopped, shutting down");

    Ok(())
}

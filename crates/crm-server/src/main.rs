// ============================================================================
// CRM Server - Entry Point
// File: crates/crm-server/src/main.rs
// ============================================================================
//! HTTP API plus the scheduled birthday and gift-season jobs.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use tracing::{info, warn};

use crm_api::{build_router, ApiSettings, AppState};
use crm_core::domain::NotificationChannel;
use crm_infrastructure::{create_pool, run_migrations, Adapters};
use crm_shared::config::AppConfig;
use crm_shared::telemetry::init_telemetry;

mod scheduler;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let _guard = init_telemetry(&config.app.name, config.app.log_dir.as_deref())?;
    info!("Starting {} ({})", config.app.name, config.app.env);

    let pool = create_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("Failed to connect to database")?;
    info!("Database connection established");

    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let adapters = Adapters::new(&pool, &config)?;
    spawn_jobs(&config, &adapters)?;

    let state = AppState::new(
        pool,
        &adapters.repos,
        adapters.email.clone(),
        adapters.templates.clone(),
        ApiSettings::from_config(&config),
    );
    let app = build_router(state, &config.app.cors_origins);

    let addr = SocketAddr::from((config.app.host.parse::<std::net::IpAddr>()?, config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

fn spawn_jobs(config: &AppConfig, adapters: &Adapters) -> Result<()> {
    let offset = config.notifications.utc_offset();

    let dispatcher = Arc::new(adapters.birthday_dispatcher(config));
    scheduler::spawn_job(
        "birthday-reminders",
        &config.notifications.birthday_schedule,
        offset,
        move || {
            let dispatcher = dispatcher.clone();
            async move {
                let today = Utc::now().with_timezone(&offset).date_naive();
                let report = dispatcher.run(today, &NotificationChannel::ALL).await?;
                if !report.is_success() {
                    warn!(%today, failures = report.failures.len(), "Some birthday reminders failed");
                }
                Ok(())
            }
        },
    )?;

    let gifts = Arc::new(adapters.gift_service());
    scheduler::spawn_job(
        "gift-season",
        &config.notifications.gift_season_schedule,
        offset,
        move || {
            let gifts = gifts.clone();
            async move {
                let year = Utc::now().with_timezone(&offset).year();
                let (season, created) = gifts.ensure_holiday_season(year).await?;
                if created {
                    info!(season_id = %season.id, "Created gift season {}", season.name);
                }
                Ok(())
            }
        },
    )?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

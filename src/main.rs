use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kaichuan_crm::backup::BackupManager;
use kaichuan_crm::cli::{self, Cli};
use kaichuan_crm::config::Config;
use kaichuan_crm::db::{seed_admin_user, Store};
use kaichuan_crm::service::Desk;
use kaichuan_crm::AppState;

// One thread: every action runs to completion before the next one starts
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = &cli.command {
        if !command.needs_store() {
            return cli::cmd_config_check(&cli.config);
        }
    }

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;

    // Ensure data directory exists
    std::fs::create_dir_all(&config.server.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            config.server.data_dir.display()
        )
    })?;

    // Initialize database
    let store = Store::open(&config.database_path())
        .await
        .context("Failed to open database")?;

    // Ensure the admin account exists
    seed_admin_user(
        &store.pool(),
        &config.auth.admin_username,
        &config.auth.admin_password,
    )
    .await?;

    let backups = BackupManager::new(store.clone(), config.backup_dir());
    let desk = Desk::new(store.clone(), backups);

    if cli.command.is_some() {
        let result = cli::run_command(&cli, &config, &desk).await;
        store.close().await;
        return result;
    }

    tracing::info!("Starting Kaichuan CRM v{}", env!("CARGO_PKG_VERSION"));

    let state = Arc::new(AppState::new(config.clone(), desk));
    let app = kaichuan_crm::ui::create_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to listen on {}", addr))?;

    let url = format!("http://{}", addr);
    tracing::info!("Server listening on {}", url);

    if config.server.open_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "Failed to open browser");
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

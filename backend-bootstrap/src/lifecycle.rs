use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::Router;
use clap::ValueEnum;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use backend_application::commands::{import_commands, reindex_commands};
use backend_application::AppState;
use backend_domain::{AlmanaxRepository, ImportSummary, ReindexMode, ReindexReport, ReindexStatus};
use backend_interfaces_http::{build_metrics_router, build_router, with_request_timeout};

use crate::context::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MigrateDirection {
    Up,
    Down,
}

fn build_router_with_layers(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);
    with_request_timeout(build_router(state).layer(CorsLayer::permissive()), timeout)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(context: AppContext, with_metrics: bool) -> Result<()> {
    let state = context.state;
    context.repo.ping().await?;

    if with_metrics {
        let metrics_port = state
            .config
            .api_port
            .checked_add(1)
            .ok_or_else(|| anyhow!("api_port {} leaves no room for metrics", state.config.api_port))?;
        let addr = SocketAddr::from(([0, 0, 0, 0], metrics_port));
        let listener = TcpListener::bind(addr).await?;
        let app = build_metrics_router(state.clone());
        info!(port = metrics_port, "metrics server started");
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                error!("metrics server stopped: {}", err);
            }
        });
    }

    let app = build_router_with_layers(state.clone());
    let addr: SocketAddr = state.config.bind_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(
        port = state.config.api_port,
        public_url = %state.config.public_base_url(),
        "almanax server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("almanax server stopped");
    Ok(())
}

pub async fn run_migrate(context: &AppContext, direction: MigrateDirection) -> Result<()> {
    match direction {
        MigrateDirection::Up => context.repo.migrate_up().await?,
        MigrateDirection::Down => context.repo.migrate_down().await?,
    }
    Ok(())
}

/// Fails when the run aborted, after logging the partial count.
/// Runs one sync. An aborted run still returns its report so the caller can
/// show how many documents were committed before the failure.
pub async fn run_reindex(context: &AppContext, init: bool) -> ReindexReport {
    reindex_commands::update_bonus_index(&context.state, ReindexMode::from_init(init)).await
}

pub fn ensure_completed(report: &ReindexReport) -> Result<()> {
    match &report.status {
        ReindexStatus::Completed => Ok(()),
        ReindexStatus::Aborted { language, cause } => Err(anyhow!(
            "bonus index sync aborted at {} after {} documents: {}",
            language,
            report.added,
            cause
        )),
    }
}

pub async fn run_import(context: &AppContext, tag: &str) -> Result<ImportSummary> {
    Ok(import_commands::import_release(&context.state, tag).await?)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("sigterm handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_infrastructure::AppConfig;

    #[test]
    fn aborted_reindex_keeps_count_and_fails() {
        let completed = ReindexReport {
            mode: ReindexMode::Incremental,
            added: 4,
            status: ReindexStatus::Completed,
        };
        assert!(ensure_completed(&completed).is_ok());

        let aborted = ReindexReport {
            mode: ReindexMode::Full,
            added: 5,
            status: ReindexStatus::Aborted {
                language: backend_domain::Language::De,
                cause: "fetching bonus listing failed: 502".to_string(),
            },
        };
        let err = ensure_completed(&aborted).expect_err("aborted run");
        assert!(err.to_string().contains("after 5 documents"));
        assert_eq!(aborted.added, 5);
    }

    #[tokio::test]
    async fn migrate_up_and_down_against_file_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            database_path: dir.path().join("almanax.db").to_string_lossy().to_string(),
            ..AppConfig::default()
        };
        let context = AppContext::new(config).expect("context");

        run_migrate(&context, MigrateDirection::Up).await.expect("up");
        let listing = context.repo.list_bonus_types().await.expect("list");
        assert!(listing.is_empty());

        run_migrate(&context, MigrateDirection::Down).await.expect("down");
        assert!(context.repo.list_bonus_types().await.is_err());
    }
}

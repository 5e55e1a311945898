//! Serves the task REST API.
//!
//! Settings come from the environment (see [`taskboard::config`]). When
//! `DATABASE_URL` is set tasks are stored in `PostgreSQL`, with pending
//! migrations applied on start; otherwise an in-memory store is used.

use std::sync::Arc;

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use eyre::WrapErr;
use mockable::DefaultClock;
use taskboard::api::{self, StaticTokenAuthenticator};
use taskboard::config::ServerConfig;
use taskboard::task::adapters::memory::InMemoryTaskRepository;
use taskboard::task::adapters::postgres::{PostgresTaskRepository, run_migrations};
use taskboard::task::ports::TaskRepository;
use taskboard::task::services::TaskAccessService;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().wrap_err("failed to read server configuration")?;
    if config.auth_tokens.is_empty() {
        tracing::warn!("TASKBOARD_AUTH_TOKENS is empty; every task request will be refused");
    }

    match config.database_url.clone() {
        Some(url) => {
            let manager = ConnectionManager::<PgConnection>::new(url);
            let pool = Pool::builder()
                .build(manager)
                .wrap_err("failed to build PostgreSQL connection pool")?;
            run_migrations(&pool).wrap_err("failed to apply migrations")?;
            serve(config, PostgresTaskRepository::new(pool)).await
        }
        None => {
            tracing::info!("DATABASE_URL unset; storing tasks in memory");
            serve(config, InMemoryTaskRepository::new()).await
        }
    }
}

async fn serve<R>(config: ServerConfig, repository: R) -> eyre::Result<()>
where
    R: TaskRepository + 'static,
{
    let tasks = TaskAccessService::new(Arc::new(repository), Arc::new(DefaultClock));
    let authenticator = Arc::new(StaticTokenAuthenticator::new(config.auth_tokens));
    let app = api::router(tasks, authenticator, config.client_origin);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "task API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server terminated unexpectedly")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown requested");
}

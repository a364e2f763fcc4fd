//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{extract::DefaultBodyLimit, middleware, Router};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::compression::CompressionLayer;
use tracing::{info, warn};

use crate::application::services::{TelegramAuthServiceImpl, TokenService};
use crate::config::Settings;
use crate::infrastructure::jobs::{run_janitor, BotListener};
use crate::infrastructure::repositories::{PgAuthCodeRepository, PgUserRepository};
use crate::infrastructure::storage::LocalStorage;
use crate::infrastructure::telegram::{BotApiClient, TelegramApi};
use crate::infrastructure::database;
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{create_cors_layer, create_trace_layer, track_metrics};
use crate::shared::error::set_expose_details;

/// Multipart overhead allowed on top of the image size limit.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub settings: Arc<Settings>,
    pub tokens: TokenService,
    pub telegram: Arc<dyn TelegramApi>,
    pub storage: LocalStorage,
}

impl AppState {
    pub fn new(db: PgPool, settings: Settings, telegram: Arc<dyn TelegramApi>) -> Self {
        Self {
            db,
            tokens: TokenService::new(settings.jwt.clone()),
            storage: LocalStorage::new(&settings.uploads),
            telegram,
            settings: Arc::new(settings),
        }
    }
}

/// Router with every middleware layer applied.
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.settings.uploads.max_file_size + FORM_OVERHEAD_BYTES;
    let cors = create_cors_layer(&state.settings.cors);

    routes::create_router(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    background: Vec<JoinHandle<()>>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        set_expose_details(settings.is_development());
        handlers::health::init_server_start();

        let db = database::create_pool(&settings.database).await?;
        info!("Database connection pool created");

        database::run_migrations(&db).await?;
        info!("Database migrations applied");

        let telegram: Arc<dyn TelegramApi> = Arc::new(BotApiClient::new(&settings.telegram));
        let state = AppState::new(db.clone(), settings.clone(), telegram.clone());
        state.storage.init().await?;

        let background = spawn_background_jobs(&state);

        let router = create_app(state);

        let addr: SocketAddr = settings.server_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", addr);

        Ok(Self {
            listener,
            router,
            background,
        })
    }

    /// Run the server until Ctrl+C or SIGTERM, then stop background jobs.
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        for task in self.background {
            task.abort();
        }
        info!("Server stopped");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

fn spawn_background_jobs(state: &AppState) -> Vec<JoinHandle<()>> {
    let settings = &state.settings;
    let codes = Arc::new(PgAuthCodeRepository::new(state.db.clone()));
    let mut tasks = vec![tokio::spawn(run_janitor(
        codes.clone(),
        settings.janitor.interval_secs,
    ))];

    if settings.telegram.is_enabled() {
        let auth = TelegramAuthServiceImpl::new(
            codes,
            Arc::new(PgUserRepository::new(state.db.clone())),
            state.telegram.clone(),
            state.tokens.clone(),
            settings.telegram.code_ttl_minutes,
        );
        let listener = BotListener::new(state.telegram.clone(), Arc::new(auth), &settings.telegram);
        tasks.push(tokio::spawn(listener.run()));
    } else {
        warn!("Telegram bot token not configured; bot listener disabled");
    }

    tasks
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}

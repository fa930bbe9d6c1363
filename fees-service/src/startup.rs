//! Application startup and lifecycle management.

use crate::config::FeesConfig;
use crate::handlers;
use crate::services::{init_metrics, Database, DuesCalculator, PaymentCollector};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: FeesConfig,
    pub db: Arc<Database>,
    pub dues: DuesCalculator,
    pub collector: PaymentCollector,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: FeesConfig) -> Result<Self, AppError> {
        Self::build_internal(config, true).await
    }

    /// Build the application without running migrations.
    /// Use this in tests when migrations are already applied by the test harness.
    pub async fn build_without_migrations(config: FeesConfig) -> Result<Self, AppError> {
        Self::build_internal(config, false).await
    }

    async fn build_internal(config: FeesConfig, run_migrations: bool) -> Result<Self, AppError> {
        // Initialize metrics
        init_metrics();

        // Connect to database
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        if run_migrations {
            db.run_migrations().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to run migrations");
                e
            })?;
        }

        let db = Arc::new(db);

        let state = AppState {
            config: config.clone(),
            db: db.clone(),
            dues: DuesCalculator::new(db.clone()),
            collector: PaymentCollector::new(db),
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Fees service listener bound");

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &Database {
        &self.state.db
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics_endpoint))
            // Fee structure catalog (tenant-scoped)
            .route(
                "/fee-structures",
                post(handlers::create_fee_structure).get(handlers::list_fee_structures),
            )
            .route(
                "/fee-structures/:fee_id",
                get(handlers::get_fee_structure)
                    .put(handlers::update_fee_structure)
                    .delete(handlers::archive_fee_structure),
            )
            // Dues
            .route("/students/:student_id/dues", get(handlers::student_dues))
            // Payment ledger
            .route(
                "/payments",
                post(handlers::collect_payment).get(handlers::list_payments),
            )
            .route("/waivers", post(handlers::record_waiver))
            // Reports
            .route(
                "/reports/daily-collections",
                get(handlers::daily_collections),
            )
            .route("/audit-log", get(handlers::audit_trail))
            .layer(from_fn(metrics_middleware))
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        school_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                }),
            )
            .with_state(self.state);

        tracing::info!(
            service = "fees-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await
    }
}

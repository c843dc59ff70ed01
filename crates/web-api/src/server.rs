use crate::handlers;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tradecycle_orchestrator::CycleOrchestrator;

pub struct ApiServer {
    orchestrator: Arc<CycleOrchestrator>,
}

impl ApiServer {
    #[must_use]
    pub const fn new(orchestrator: Arc<CycleOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/health", get(handlers::health))
            .route("/api/metrics", get(handlers::metrics))
            .route("/api/status", get(handlers::status))
            .route("/api/history", get(handlers::trading_history))
            .route("/api/cycle", post(handlers::run_cycle))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.orchestrator.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve
    /// requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("monitoring API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

//! Virtual Department Representatives Backend
//!
//! REST backend that answers questions in the voice of department
//! representatives, grounded in an uploaded knowledge base, and serves one
//! generated dashboard per department per day.

mod api;
mod auth;
mod config;
mod dashboard;
mod db;
mod errors;
mod llm;
mod models;
mod personas;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use dashboard::{Clock, DashboardCache, SystemClock};
use db::Repository;
use llm::{Assistant, ContextLimits, ModelBackend, ModelInvoker, ModelPreference, OllamaBackend};
use personas::PersonaRegistry;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
    pub personas: Arc<PersonaRegistry>,
    pub assistant: Arc<Assistant>,
    pub dashboards: Arc<DashboardCache>,
}

impl AppState {
    /// Wire the orchestration layer on top of the repository and a model backend.
    pub fn new(
        repo: Arc<Repository>,
        config: Config,
        backend: Arc<dyn ModelBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let personas = Arc::new(PersonaRegistry::builtin());
        let preference = ModelPreference::new(config.model.clone(), config.fallback_model.clone());
        let limits = ContextLimits {
            chat: config.chat_context_limit,
            dashboard: config.dashboard_context_limit,
        };

        let assistant = Arc::new(Assistant::new(
            personas.clone(),
            repo.clone(),
            ModelInvoker::new(backend, preference),
            limits,
        ));
        let dashboards = Arc::new(DashboardCache::new(assistant.clone(), repo.clone(), clock));

        Self {
            repo,
            config: Arc::new(config),
            personas,
            assistant,
            dashboards,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Virtual Department Representatives Backend");
    for var in &config.invalid_vars {
        tracing::warn!("Ignoring invalid {}, using the default", var);
    }
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "Models: {} (fallback {}) at {}",
        config.model,
        config.fallback_model,
        config.ollama_url
    );

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (VREPS_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let backend = Arc::new(OllamaBackend::new(
        config.ollama_url.clone(),
        config.model_timeout,
    )?);

    let bind_addr = config.bind_addr;
    let state = AppState::new(repo, config, backend, Arc::new(SystemClock));

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Departments
        .route("/departments", get(api::list_departments))
        // Documents
        .route("/documents", get(api::list_documents))
        .route("/documents", post(api::create_document))
        .route("/documents/{id}", get(api::get_document))
        .route("/documents/{id}", delete(api::delete_document))
        .route("/upload/document", post(api::upload_document))
        // Chat
        .route("/chat", post(api::chat))
        .route("/chat/history", get(api::get_history))
        .route("/chat/history", delete(api::clear_history))
        // Dashboards
        .route("/dashboard/{department}", get(api::get_dashboard))
        .route(
            "/dashboard/{department}/regenerate",
            post(api::regenerate_dashboard),
        )
        .route(
            "/dashboard/{department}/charts",
            get(api::get_dashboard_charts),
        )
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod testing;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use bmb_core::{BmbConfig, BmbError, FieldDef, ModelDescriptor, ModelRegistry};
use chrono::Utc;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::accounts::account_routes;
use super::auth::{TokenService, USER_MODEL};
use super::crud::model_routes;
use super::response::ApiError;
use super::AppState;
use crate::store::ModelStore;

/// Paths owned by built-in routes; models that would mount there are skipped.
const RESERVED_PATHS: &[&str] = &[
    "/api/health",
    "/api/models",
    "/api/users",
    "/api/auth",
    "/api/stats",
];

/// The `User` model as declared in a freshly generated project.
pub fn default_user_model() -> ModelDescriptor {
    ModelDescriptor::new(USER_MODEL)
        .with_field(FieldDef::new("name", "string(100)"))
        .with_field(FieldDef {
            name: "email".to_string(),
            field_type: "string(255)".to_string(),
            modifiers: vec!["unique".to_string()],
        })
        .with_field(FieldDef::new("password", "string(255)"))
        .with_field(FieldDef::new("age", "integer"))
        .with_field(FieldDef::new("created_at", "datetime"))
        .with_field(FieldDef {
            name: "is_active".to_string(),
            field_type: "boolean".to_string(),
            modifiers: vec!["default:true".to_string()],
        })
}

/// HTTP server over a model registry and a store.
pub struct BmbServer {
    config: BmbConfig,
    state: AppState,
}

impl BmbServer {
    /// Create a server. A `User` model is registered when the registry lacks one.
    pub fn new(config: BmbConfig, mut registry: ModelRegistry, store: Arc<dyn ModelStore>) -> Self {
        if !registry.contains(USER_MODEL) {
            registry.register(default_user_model());
        }

        let state = AppState {
            store,
            tokens: Arc::new(TokenService::from_settings(&config.auth)),
            registry: Arc::new(registry),
            pagination: config.pagination,
        };

        Self { config, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let cors = if self.config.cors_origins.iter().any(|o| o == "*") {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = self
                .config
                .cors_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let mut router = Router::new()
            .route("/", get(index_handler))
            .route("/api/health", get(health_handler))
            .route("/api/models", get(models_handler))
            .merge(account_routes());

        // Names differing only in case share a path; the first one in name order wins.
        let mut mounted = HashSet::new();
        for model in self.state.registry.all() {
            let path = model.base_path();
            if RESERVED_PATHS.contains(&path.as_str()) {
                tracing::warn!(model = %model.name, path = %path, "Model path is reserved, CRUD routes skipped");
                continue;
            }
            if !mounted.insert(path.clone()) {
                tracing::warn!(model = %model.name, path = %path, "Model path already mounted, CRUD routes skipped");
                continue;
            }
            tracing::info!(model = %model.name, path = %path, "Mounted CRUD routes");
            router = router.merge(model_routes(Arc::clone(model)));
        }

        router
            .fallback(fallback_handler)
            .with_state(self.state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
    }

    /// Resolve the configured host and port. Host names such as `localhost`
    /// are looked up; the first address wins.
    pub async fn addr(&self) -> Result<SocketAddr, BmbError> {
        let host = self.config.server.host.as_str();
        let port = self.config.server.port;

        tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| {
                BmbError::Config(format!("cannot resolve listen address {}:{}: {}", host, port, e))
            })?
            .next()
            .ok_or_else(|| BmbError::Config(format!("{}:{} resolves to no address", host, port)))
    }

    /// Run the server (blocking).
    pub async fn run(self) -> Result<(), BmbError> {
        let addr = self.addr().await?;
        let router = self.router();

        tracing::info!("BMB server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;
        Ok(())
    }
}

async fn index_handler() -> impl IntoResponse {
    Json(json!({
        "message": "BMB Framework API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "models": "/api/models",
            "auth": "/api/auth/*",
            "users": "/api/users",
            "stats": "/api/stats/users",
        },
    }))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.count(USER_MODEL) {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "timestamp": Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string(),
            })),
        ),
    }
}

async fn models_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "models": state.registry.names() }))
}

async fn fallback_handler() -> ApiError {
    ApiError::not_found("Resource not found")
}

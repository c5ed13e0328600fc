// rest_api/src/lib.rs

//! HTTP surface of the clinic portal: patients, their appointments and
//! prescriptions, login, and the reference lists, all under `/api`.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use lib::ClinicStorageEngine;
use security::TokenService;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
pub mod errors;
pub mod extractors;
pub mod handlers;

pub use crate::config::{load_rest_api_config, RestApiConfig};
pub use crate::errors::ApiError;

use crate::handlers::{appointments, auth, health, patients, prescriptions, reference};

/// Origin of the local development frontend, always allowed.
pub const LOCAL_FRONTEND_ORIGIN: &str = "http://localhost:3000";

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn ClinicStorageEngine>,
    pub tokens: Arc<TokenService>,
    pub list_limit: usize,
}

impl AppState {
    pub fn new(storage: Arc<dyn ClinicStorageEngine>, config: &RestApiConfig) -> Self {
        Self {
            storage,
            tokens: Arc::new(TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl_hours)),
            list_limit: config.list_limit,
        }
    }
}

/// Allows the local frontend plus the configured one, with credentials.
pub fn cors_layer(config: &RestApiConfig) -> Result<CorsLayer> {
    let mut origins = vec![HeaderValue::from_static(LOCAL_FRONTEND_ORIGIN)];
    let frontend = HeaderValue::from_str(config.frontend_url.trim_end_matches('/'))
        .with_context(|| format!("Invalid frontend_url {:?}", config.frontend_url))?;
    if !origins.contains(&frontend) {
        origins.push(frontend);
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/patients",
            get(patients::list_patients_handler).post(patients::create_patient_handler),
        )
        .route(
            "/patients/:patient_id",
            get(patients::get_patient_handler).put(patients::update_patient_handler),
        )
        .route(
            "/patients/:patient_id/appointments",
            get(appointments::list_appointments_handler).post(appointments::create_appointment_handler),
        )
        .route(
            "/patients/:patient_id/appointments/:appointment_id",
            put(appointments::update_appointment_handler).delete(appointments::delete_appointment_handler),
        )
        .route(
            "/patients/:patient_id/prescriptions",
            get(prescriptions::list_prescriptions_handler).post(prescriptions::create_prescription_handler),
        )
        .route(
            "/patients/:patient_id/prescriptions/:prescription_id",
            put(prescriptions::update_prescription_handler).delete(prescriptions::delete_prescription_handler),
        )
        .route("/reference/medications", get(reference::medications_handler))
        .route("/reference/dosages", get(reference::dosages_handler))
}

/// Builds the application router.
pub fn build_router(state: AppState, config: &RestApiConfig) -> Result<Router> {
    Ok(Router::new()
        .nest("/api", api_routes())
        .fallback(handlers::not_found_handler)
        .with_state(state)
        .layer(cors_layer(config)?)
        .layer(TraceLayer::new_for_http()))
}

/// Serves the API on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    storage: Arc<dyn ClinicStorageEngine>,
    config: &RestApiConfig,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = AppState::new(storage, config);
    let app = build_router(state, config)?;

    info!("REST API server listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("REST API server failed")?;
    info!("REST API server stopped.");
    Ok(())
}

/// Binds `config.host:config.port` and serves until `shutdown` resolves.
pub async fn start_server<F>(
    config: &RestApiConfig,
    storage: Arc<dyn ClinicStorageEngine>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    serve(listener, storage, config, shutdown).await
}

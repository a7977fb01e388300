use crate::config::ApplicationConfig;
use crate::entity::{A, B, C, D, Persistable};
use crate::error::{AppError, FailureAlert};
use crate::resource::CrudResource;
use crate::server::headers::failure_headers;
use crate::server::routes::{entity, management};

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use base64::Engine as _;
use rand::RngCore;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub application: Arc<ApplicationConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, application: ApplicationConfig) -> Self {
        Self {
            pool,
            application: Arc::new(application),
        }
    }

    /// Resource for entity `E`, backed by the shared pool.
    pub fn resource<E: Persistable>(&self) -> CrudResource<E> {
        CrudResource::from_pool(self.pool.clone(), self.application.clone())
    }
}

async fn not_found_handler() -> AppError {
    AppError::not_found()
}

/// Turns a [`FailureAlert`] left by a rejected mutation into `X-{app}-error` headers.
async fn failure_alert(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    if let Some(failure) = resp.extensions().get::<FailureAlert>().cloned() {
        resp.headers_mut()
            .extend(failure_headers(&state.application, &failure));
    }
    resp
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    let path = uri.path();
    let protocol = format_http_version(version);

    // For NDJSON lists `latency_ms` is time to the first byte, not the whole stream.
    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(entity::router::<A>())
        .merge(entity::router::<B>())
        .merge(entity::router::<C>())
        .merge(entity::router::<D>())
        .merge(management::router())
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), failure_alert))
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}

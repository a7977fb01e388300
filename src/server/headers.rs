//! `X-{app}-alert` / `X-{app}-error` / `X-{app}-params` response headers.

use crate::config::ApplicationConfig;
use crate::error::FailureAlert;
use crate::resource::EntityAlert;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

fn header_name(app_name: &str, suffix: &str) -> Option<HeaderName> {
    HeaderName::try_from(format!("X-{app_name}-{suffix}")).ok()
}

fn insert(headers: &mut HeaderMap, app_name: &str, suffix: &str, value: &str) {
    let (Some(name), Ok(value)) = (header_name(app_name, suffix), HeaderValue::from_str(value))
    else {
        warn!(app_name, suffix, "alert header is not representable; skipped");
        return;
    };
    headers.insert(name, value);
}

fn form_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Headers for a successful create, update or delete.
pub fn alert_headers(app: &ApplicationConfig, alert: &EntityAlert) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(
        &mut headers,
        &app.name,
        "alert",
        &alert.message(app.enable_translation),
    );
    insert(
        &mut headers,
        &app.name,
        "params",
        &form_encode(&alert.id.to_string()),
    );
    headers
}

/// Headers for a rejected mutation.
pub fn failure_headers(app: &ApplicationConfig, failure: &FailureAlert) -> HeaderMap {
    let message = if app.enable_translation {
        format!("error.{}", failure.error_key)
    } else {
        failure.default_message.clone()
    };

    let mut headers = HeaderMap::new();
    insert(&mut headers, &app.name, "error", &message);
    insert(&mut headers, &app.name, "params", &failure.entity_name);
    headers
}

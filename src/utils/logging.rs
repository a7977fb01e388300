//! Debug-level logging of REST request bodies.

use serde::Serialize;
use tracing::{Level, debug, enabled};

fn render_pretty<T: Serialize>(body: &T) -> String {
    serde_json::to_string_pretty(body)
        .unwrap_or_else(|error| format!("<unserializable body: {error}>"))
}

/// Logs `REST request to {action}` for `entity` with the body pretty-printed.
///
/// The body is only serialized when debug logging is enabled.
pub(crate) fn log_rest_body<T: Serialize>(entity: &str, action: &str, id: Option<i64>, body: &T) {
    if !enabled!(Level::DEBUG) {
        return;
    }
    let pretty = render_pretty(body);
    debug!(entity, id, body = %pretty, "REST request to {action}");
}

use axum::http::{HeaderMap, header::ACCEPT};

pub const NDJSON: &str = "application/x-ndjson";
const NDJSON_ALIASES: [&str; 2] = [NDJSON, "application/ndjson"];

/// Representation of a list response, picked from the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// One JSON array, fully collected.
    Json,
    /// Newline-delimited JSON, one entity per line, streamed.
    NdJson,
}

impl ListFormat {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let wants_ndjson = headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .filter_map(|range| range.split(';').next())
            .map(str::trim)
            .any(|media| NDJSON_ALIASES.iter().any(|n| media.eq_ignore_ascii_case(n)));

        if wants_ndjson {
            ListFormat::NdJson
        } else {
            ListFormat::Json
        }
    }
}

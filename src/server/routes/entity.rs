//! The six REST operations, written once and mounted for every entity.

use crate::entity::Persistable;
use crate::error::AppError;
use crate::server::extract::{IdPath, JsonBody};
use crate::server::headers::alert_headers;
use crate::server::negotiate::{ListFormat, NDJSON};
use crate::server::router::AppState;

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::json_lines::JsonLines;

/// `/api/{es}` and `/api/{es}/{id}` for entity `E`.
pub fn router<E: Persistable>() -> Router<AppState> {
    let collection = E::collection_path();
    let item = format!("{collection}/{{id}}");

    Router::new()
        .route(
            &collection,
            get(list::<E>)
                .post(create::<E>)
                .put(missing_id)
                .patch(missing_id)
                .delete(missing_id),
        )
        .route(
            &item,
            get(get_one::<E>)
                .put(update::<E>)
                .patch(partial_update::<E>)
                .delete(delete::<E>),
        )
}

/// Mutations addressed to the collection rather than an item.
async fn missing_id() -> AppError {
    AppError::MethodNotAllowed { allow: "GET, POST" }
}

async fn create<E: Persistable>(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<E>,
) -> Result<Response, AppError> {
    let resource = state.resource::<E>();
    let created = resource.create(payload).await?;

    let location = HeaderValue::from_str(&created.location)
        .map_err(|e| AppError::UnexpectedError(format!("invalid location header: {e}")))?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        alert_headers(resource.application(), &created.alert),
        Json(created.entity),
    )
        .into_response())
}

async fn list<E: Persistable>(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let resource = state.resource::<E>();

    match ListFormat::from_headers(&headers) {
        ListFormat::Json => {
            let items = resource.list(query.as_deref()).await?;
            Ok(Json(items).into_response())
        }
        ListFormat::NdJson => {
            let rows = resource.stream(query.as_deref())?;
            let mut resp = JsonLines::new(rows).into_response();
            resp.headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(NDJSON));
            Ok(resp)
        }
    }
}

async fn get_one<E: Persistable>(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<E>, AppError> {
    let entity = state.resource::<E>().get(id).await?;
    Ok(Json(entity))
}

async fn update<E: Persistable>(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<E>,
) -> Result<Response, AppError> {
    let resource = state.resource::<E>();
    let updated = resource.update(id, payload).await?;
    Ok((
        alert_headers(resource.application(), &updated.alert),
        Json(updated.entity),
    )
        .into_response())
}

async fn partial_update<E: Persistable>(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(patch): JsonBody<E::Patch>,
) -> Result<Response, AppError> {
    let resource = state.resource::<E>();
    let updated = resource.partial_update(id, patch).await?;
    Ok((
        alert_headers(resource.application(), &updated.alert),
        Json(updated.entity),
    )
        .into_response())
}

async fn delete<E: Persistable>(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Response, AppError> {
    let resource = state.resource::<E>();
    let alert = resource.delete(id).await?;
    Ok((
        StatusCode::NO_CONTENT,
        alert_headers(resource.application(), &alert),
    )
        .into_response())
}

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::{ApiError, AppState};
use crate::coffee::{CoffeeInput, CoffeeRecord};
use crate::guard::{PreconditionError, VersionGuard};

/// Updates always require `If-Match`.
const UPDATE_GUARD: VersionGuard = VersionGuard::required();

/// `GET /health`
pub(super) async fn health(State(state): State<AppState>) -> Result<Response, ApiError> {
    let count = state.run(|store| store.count()).await?;
    Ok(Json(json!({ "ok": true, "coffees": count })).into_response())
}

/// `GET /coffees`
pub(super) async fn list_coffees(State(state): State<AppState>) -> Result<Response, ApiError> {
    let coffees = state.run(|store| store.list_all()).await?;
    Ok(Json(coffees).into_response())
}

/// `GET /coffee/:id`
pub(super) async fn get_coffee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw_id)?;
    let coffee = state.run(move |store| store.get(id)).await?;
    Ok(versioned(StatusCode::OK, coffee))
}

/// `POST /coffee`
pub(super) async fn create_coffee(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let input = parse_input(&body)?;
    let name = input.name()?.to_string();

    let coffee = state.run(move |store| store.create(&name)).await?;
    tracing::info!(id = coffee.id, name = %coffee.name, "created coffee");
    Ok(versioned(StatusCode::CREATED, coffee))
}

/// `PUT /coffee/:id`
///
/// The token is validated before the body, and both before the store is
/// touched. The version comparison itself happens inside the store.
pub(super) async fn update_coffee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw_id)?;
    let supplied = if_match(&headers);
    let expected = UPDATE_GUARD
        .parse(supplied.as_deref())?
        .ok_or(PreconditionError::Required)?;
    let input = parse_input(&body)?;
    let name = input.name()?.to_string();

    let result = state
        .run(move |store| store.update(id, &name, expected))
        .await;
    match result {
        Ok(coffee) => {
            tracing::info!(id, version = coffee.version, "updated coffee");
            Ok(versioned(StatusCode::OK, coffee))
        }
        Err(err @ ApiError::VersionConflict { .. }) => {
            tracing::warn!(id, expected, "rejected stale update");
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// `DELETE /coffee/:id`
pub(super) async fn delete_coffee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw_id)?;
    state.run(move |store| store.delete(id)).await?;
    tracing::info!(id, "deleted coffee");
    Ok((StatusCode::OK, format!("Deleted coffee {}", id)).into_response())
}

/// A path segment that is not a number cannot name a coffee.
fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>()
        .map_err(|_| ApiError::NotFound { id: raw.to_string() })
}

fn parse_input(body: &[u8]) -> Result<CoffeeInput, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidInput(format!("Invalid JSON body: {}", e)))
}

fn if_match(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::IF_MATCH)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// A single record with its `Location` and `ETag`.
fn versioned(status: StatusCode, coffee: CoffeeRecord) -> Response {
    (
        status,
        [
            (header::LOCATION, coffee.location()),
            (header::ETAG, coffee.version.to_string()),
        ],
        Json(coffee),
    )
        .into_response()
}

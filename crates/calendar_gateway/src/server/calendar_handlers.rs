//! Calendar proxy handlers.
//!
//! Each handler reads the bearer token from the store, forwards one request
//! to the downstream calendar API, and maps the outcome to the endpoint's
//! response envelope. Payloads are opaque beyond the named id fields; any
//! malformation is whatever the downstream API reports.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use super::AppState;
use crate::error::Error;

/// Read the stored access token or produce the missing-credential response.
fn require_access_token(state: &AppState) -> Result<String, Response> {
    match state.token_store.load().access_token.filter(|t| !t.is_empty()) {
        Some(token) => Ok(token),
        None => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Access token is missing" })),
        )
            .into_response()),
    }
}

/// Map a failed downstream call into the shared forwarding envelope: the
/// downstream status code with its body attached under `response`.
fn forward_failure(action: &str, err: Error) -> Response {
    match err {
        Error::Downstream { status, body } => {
            let status_code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status_code,
                Json(json!({
                    "error": format!("Failed to {}", action),
                    "status_code": status,
                    "response": body,
                })),
            )
                .into_response()
        }
        other => exception_response(other),
    }
}

/// Any unexpected fault surfaces as the generic exception envelope, never a
/// stack trace.
fn exception_response(err: Error) -> Response {
    error!("proxy call failed unexpectedly: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "An exception occurred",
            "message": err.to_string(),
        })),
    )
        .into_response()
}

/// Create a calendar event from the opaque request document.
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<Value>,
) -> Response {
    let access_token = match require_access_token(&state) {
        Ok(token) => token,
        Err(response) => return response,
    };

    match state.calendar.create_event(&access_token, &event).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Event created successfully" })),
        )
            .into_response(),
        Err(Error::Downstream { status, body }) => {
            let description = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            let status_code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status_code,
                Json(json!({
                    "error": "Failed to create event",
                    "description": description,
                })),
            )
                .into_response()
        }
        Err(other) => exception_response(other),
    }
}

/// List all calendar events.
pub async fn all_events(State(state): State<Arc<AppState>>) -> Response {
    let access_token = match require_access_token(&state) {
        Ok(token) => token,
        Err(response) => return response,
    };

    match state.calendar.list_events(&access_token).await {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(err) => forward_failure("fetch events", err),
    }
}

/// Request body naming the event to operate on.
#[derive(Debug, Deserialize)]
pub struct EventIdRequest {
    #[serde(rename = "eventId")]
    pub event_id: String,
}

/// Fetch a single event by id.
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EventIdRequest>,
) -> Response {
    let access_token = match require_access_token(&state) {
        Ok(token) => token,
        Err(response) => return response,
    };

    match state.calendar.get_event(&access_token, &req.event_id).await {
        Ok(event) => (StatusCode::OK, Json(event)).into_response(),
        Err(err) => forward_failure("fetch event", err),
    }
}

/// Request body for a partial event update.
#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(rename = "eventId")]
    pub event_id: String,
    #[serde(rename = "updatedEventData")]
    pub updated_event_data: Value,
}

/// Apply a partial update to an event.
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateEventRequest>,
) -> Response {
    let access_token = match require_access_token(&state) {
        Ok(token) => token,
        Err(response) => return response,
    };

    match state
        .calendar
        .update_event(&access_token, &req.event_id, &req.updated_event_data)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Event updated successfully" })),
        )
            .into_response(),
        Err(err) => forward_failure("update event", err),
    }
}

/// Delete an event. The downstream API answers 204; this surface reports 200.
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EventIdRequest>,
) -> Response {
    let access_token = match require_access_token(&state) {
        Ok(token) => token,
        Err(response) => return response,
    };

    match state
        .calendar
        .delete_event(&access_token, &req.event_id)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Event deleted successfully" })),
        )
            .into_response(),
        Err(err) => forward_failure("delete event", err),
    }
}

//! Thin client for the downstream calendar REST API.
//!
//! Payloads are opaque: request documents are forwarded verbatim and
//! response bodies are returned untouched. Each call is single-shot with the
//! transport's default timeouts; a non-expected status comes back as a typed
//! downstream failure carrying the response body.

use serde_json::Value;

use crate::error::{Error, Result};

/// Microsoft Graph base for the signed-in user.
const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0/me";

#[derive(Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl CalendarClient {
    /// Client against an explicit base URL (tests point this at a mock
    /// server).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Client against the production Graph endpoint.
    pub fn graph() -> Self {
        Self::new(GRAPH_BASE_URL)
    }

    /// Create a calendar event from the opaque document. Ok on 201.
    pub async fn create_event(&self, access_token: &str, event: &Value) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/calendar/events", self.base_url))
            .header("Authorization", format!("Bearer {}", access_token))
            .json(event)
            .send()
            .await?;

        match response.status().as_u16() {
            201 => Ok(()),
            status => Err(downstream_error(status, response).await),
        }
    }

    /// Fetch the event collection; returns the `value` array verbatim.
    pub async fn list_events(&self, access_token: &str) -> Result<Value> {
        let response = self
            .http
            .get(format!("{}/calendar/events", self.base_url))
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        match response.status().as_u16() {
            200 => {
                let body: Value = response.json().await?;
                body.get("value")
                    .cloned()
                    .ok_or_else(|| Error::Internal("events response missing 'value'".to_string()))
            }
            status => Err(downstream_error(status, response).await),
        }
    }

    /// Fetch a single event by id; returns the JSON body verbatim.
    pub async fn get_event(&self, access_token: &str, event_id: &str) -> Result<Value> {
        let response = self
            .http
            .get(format!("{}/events/{}", self.base_url, event_id))
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        match response.status().as_u16() {
            200 => Ok(response.json().await?),
            status => Err(downstream_error(status, response).await),
        }
    }

    /// Apply a partial update (PATCH semantics) to an event. Ok on 200.
    pub async fn update_event(
        &self,
        access_token: &str,
        event_id: &str,
        patch: &Value,
    ) -> Result<()> {
        let response = self
            .http
            .patch(format!("{}/events/{}", self.base_url, event_id))
            .header("Authorization", format!("Bearer {}", access_token))
            .json(patch)
            .send()
            .await?;

        match response.status().as_u16() {
            200 => Ok(()),
            status => Err(downstream_error(status, response).await),
        }
    }

    /// Delete an event. The API answers 204 on success.
    pub async fn delete_event(&self, access_token: &str, event_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/events/{}", self.base_url, event_id))
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        match response.status().as_u16() {
            204 => Ok(()),
            status => Err(downstream_error(status, response).await),
        }
    }
}

/// Capture a non-expected downstream response as a typed failure, preserving
/// the body as JSON when it parses and as a raw string otherwise.
async fn downstream_error(status: u16, response: reqwest::Response) -> Error {
    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
    Error::Downstream { status, body }
}

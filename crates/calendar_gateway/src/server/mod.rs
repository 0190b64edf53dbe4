//! Calendar Gateway HTTP server.
//!
//! Routes inbound requests to the OAuth flow handlers and the calendar
//! proxy handlers.

pub mod calendar_handlers;
pub mod oauth_handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{OAuthClient, OAuthConfig, TokenStore};
use crate::calendar::CalendarClient;
use crate::config::Settings;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// OAuth client for the code-exchange and refresh flows.
    pub oauth: OAuthClient,
    /// Downstream calendar API client.
    pub calendar: CalendarClient,
    /// Persisted token record.
    pub token_store: TokenStore,
    /// Serializes the flows that rewrite the token record, so two racing
    /// auth requests cannot interleave their load and save steps.
    pub auth_guard: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(oauth: OAuthClient, calendar: CalendarClient, token_store: TokenStore) -> Self {
        Self {
            oauth,
            calendar,
            token_store,
            auth_guard: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Auth flow
        .route("/oauth_redirect", get(oauth_handlers::oauth_redirect))
        .route("/oauth/callback", get(oauth_handlers::oauth_callback))
        .route("/refresh_token", post(oauth_handlers::refresh_token))
        // Calendar proxy
        .route("/create_event", post(calendar_handlers::create_event))
        .route("/allevents", get(calendar_handlers::all_events))
        .route("/events", post(calendar_handlers::get_event))
        .route("/events/update", put(calendar_handlers::update_event))
        .route("/events/delete", delete(calendar_handlers::delete_event))
        // Plain pages
        .route("/index", get(oauth_handlers::index))
        .route("/error", get(oauth_handlers::error_page))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// # Errors
/// Returns an error if the token store location cannot be resolved or the
/// listen address cannot be bound.
pub async fn start_server(settings: Settings) -> anyhow::Result<()> {
    let token_path = match settings.token_file.clone() {
        Some(path) => path,
        None => TokenStore::default_path()?,
    };
    let token_store = TokenStore::new(token_path);
    info!("[OK] Token store ready at: {:?}", token_store.path());

    let oauth = OAuthClient::new(OAuthConfig::from_settings(&settings), token_store.clone());
    let calendar = CalendarClient::graph();
    let state = Arc::new(AppState::new(oauth, calendar, token_store));

    let app = router(state);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("[INFO] Calendar Gateway listening on {}", addr);
    info!("[INFO] Available endpoints:");
    info!("  GET    /oauth_redirect   - Redirect to the provider consent screen");
    info!("  GET    /oauth/callback   - Authorization code callback");
    info!("  POST   /refresh_token    - Refresh the stored access token");
    info!("  POST   /create_event     - Create a calendar event");
    info!("  GET    /allevents        - List calendar events");
    info!("  POST   /events           - Fetch a single event");
    info!("  PUT    /events/update    - Apply a partial event update");
    info!("  DELETE /events/delete    - Delete an event");

    axum::serve(listener, app).await?;

    Ok(())
}

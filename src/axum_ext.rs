//! Axum integration: application state, route handlers and router assembly.
//!
//! The display endpoint is public and read-only; everything that mutates the
//! library or the schedule table demands a live session token (see
//! [`crate::auth`]). Handlers stay thin: fetch, delegate to the store or
//! the engine, translate errors to status codes.
//!
//! # Example
//!
//! ```rust,ignore
//! use bedug::axum_ext::{router, AppState};
//! use bedug::{DisplayConfig, MemoryStore, SessionStore};
//!
//! let app = router(AppState {
//!     store: MemoryStore::new(),
//!     sessions: SessionStore::new(),
//!     config: DisplayConfig::default(),
//! });
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::{hash_password, AdminUser, AuthError, BearerAuth, SessionStore};
use crate::config::DisplayConfig;
use crate::engine::current_display_state;
use crate::error::Error;
use crate::model::{
    DisplayState, LoopVideo, LoopVideoCreate, LoopVideoUpdate, ScheduleCreate, ScheduleEntry,
    ScheduleUpdate, SunsetVideo, SunsetVideoCreate, SunsetVideoUpdate,
};
use crate::store::MemoryStore;

/// Everything the handlers need, shared by cheap clone.
#[derive(Clone)]
pub struct AppState {
    /// Content and schedule storage
    pub store: MemoryStore,
    /// Live admin sessions
    pub sessions: SessionStore,
    /// Timezone and polling configuration
    pub config: DisplayConfig,
}

/// An error ready to leave as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    /// Response status
    pub status: StatusCode,
    /// Message placed in the `error` field of the JSON body
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Validation { .. } | Error::DuplicateSchedule { .. } => StatusCode::BAD_REQUEST,
            // A malformed time slipping past the CRUD checks means the store
            // contract was broken, not the request
            Error::MalformedSchedule { .. } | Error::Config(_) | Error::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: err.to_string(),
        }
    }
}

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(root))
        .route("/api/display-state", get(display_state))
        .route("/api/loop-videos", get(list_loop_videos).post(create_loop_video))
        .route(
            "/api/loop-videos/{id}",
            put(update_loop_video).delete(delete_loop_video),
        )
        .route(
            "/api/sunset-videos",
            get(list_sunset_videos).post(create_sunset_video),
        )
        .route(
            "/api/sunset-videos/{id}",
            put(update_sunset_video).delete(delete_sunset_video),
        )
        .route("/api/schedules", get(list_schedules).post(create_schedule))
        .route("/api/schedules/bulk", post(create_schedules_bulk))
        .route(
            "/api/schedules/{id}",
            put(update_schedule).delete(delete_schedule),
        )
        .route("/api/auth/check-setup", get(check_setup))
        .route("/api/auth/setup", post(setup_admin))
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", get(verify))
        .route("/api/auth/users", get(list_admins))
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "bedug countdown display API" }))
}

/// GET /api/display-state - what the display should show right now.
async fn display_state(State(state): State<AppState>) -> Result<Json<DisplayState>, ApiError> {
    let now = state.config.now();
    let snapshot = current_display_state(&state.store, now)?;
    tracing::debug!(state = ?snapshot.state, "display-state served");
    Ok(Json(snapshot))
}

// ==================== Loop videos ====================

async fn list_loop_videos(State(state): State<AppState>) -> Json<Vec<LoopVideo>> {
    Json(state.store.list_loop_videos())
}

async fn create_loop_video(
    auth: BearerAuth,
    State(state): State<AppState>,
    Json(create): Json<LoopVideoCreate>,
) -> Result<Json<LoopVideo>, ApiError> {
    state.sessions.authorize(&auth)?;
    let video = state.store.create_loop_video(create);
    tracing::info!(id = %video.id, name = %video.name, "loop video created");
    Ok(Json(video))
}

async fn update_loop_video(
    auth: BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<LoopVideoUpdate>,
) -> Result<Json<LoopVideo>, ApiError> {
    state.sessions.authorize(&auth)?;
    Ok(Json(state.store.update_loop_video(&id, patch)?))
}

async fn delete_loop_video(
    auth: BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.sessions.authorize(&auth)?;
    state.store.delete_loop_video(&id)?;
    Ok(Json(json!({ "message": "Video deleted" })))
}

// ==================== Sunset videos ====================

async fn list_sunset_videos(State(state): State<AppState>) -> Json<Vec<SunsetVideo>> {
    Json(state.store.list_sunset_videos())
}

async fn create_sunset_video(
    auth: BearerAuth,
    State(state): State<AppState>,
    Json(create): Json<SunsetVideoCreate>,
) -> Result<Json<SunsetVideo>, ApiError> {
    state.sessions.authorize(&auth)?;
    let video = state.store.create_sunset_video(create)?;
    tracing::info!(id = %video.id, name = %video.name, "sunset video created");
    Ok(Json(video))
}

async fn update_sunset_video(
    auth: BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<SunsetVideoUpdate>,
) -> Result<Json<SunsetVideo>, ApiError> {
    state.sessions.authorize(&auth)?;
    Ok(Json(state.store.update_sunset_video(&id, patch)?))
}

async fn delete_sunset_video(
    auth: BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.sessions.authorize(&auth)?;
    state.store.delete_sunset_video(&id)?;
    Ok(Json(json!({ "message": "Video deleted" })))
}

// ==================== Schedules ====================

async fn list_schedules(State(state): State<AppState>) -> Json<Vec<ScheduleEntry>> {
    Json(state.store.list_schedules())
}

async fn create_schedule(
    auth: BearerAuth,
    State(state): State<AppState>,
    Json(create): Json<ScheduleCreate>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    state.sessions.authorize(&auth)?;
    let entry = state.store.create_schedule(create)?;
    tracing::info!(date = %entry.date, "schedule created");
    Ok(Json(entry))
}

async fn create_schedules_bulk(
    auth: BearerAuth,
    State(state): State<AppState>,
    Json(creates): Json<Vec<ScheduleCreate>>,
) -> Result<Json<Vec<ScheduleEntry>>, ApiError> {
    state.sessions.authorize(&auth)?;
    let created = state.store.create_schedules_bulk(creates)?;
    tracing::info!(count = created.len(), "bulk schedules created");
    Ok(Json(created))
}

async fn update_schedule(
    auth: BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ScheduleUpdate>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    state.sessions.authorize(&auth)?;
    Ok(Json(state.store.update_schedule(&id, patch)?))
}

async fn delete_schedule(
    auth: BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.sessions.authorize(&auth)?;
    state.store.delete_schedule(&id)?;
    Ok(Json(json!({ "message": "Schedule deleted" })))
}

// ==================== Auth ====================

/// Login / setup request body.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Admin login name
    pub username: String,
    /// Cleartext password; hashed before storage
    pub password: String,
}

/// Issued-token response body.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// The opaque bearer token
    pub token: String,
    /// Whose session this is
    pub username: String,
}

async fn check_setup(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "needs_setup": state.store.admin_count() == 0 }))
}

async fn setup_admin(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    if credentials.password.len() < 6 {
        return Err(Error::Validation {
            field: "password",
            message: "must be at least 6 characters".to_string(),
        }
        .into());
    }

    let user = AdminUser::new(&credentials.username, hash_password(&credentials.password));
    let user = state.store.create_admin(user)?;
    tracing::info!(username = %user.username, "admin account created");

    Ok(Json(TokenResponse {
        token: state.sessions.issue(&user.username),
        username: user.username,
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .store
        .find_admin(&credentials.username)
        .filter(|user| user.password_matches(&credentials.password))
        .ok_or_else(|| AuthError::new("Invalid username or password"))?;

    tracing::info!(username = %user.username, "admin logged in");
    Ok(Json(TokenResponse {
        token: state.sessions.issue(&user.username),
        username: user.username,
    }))
}

async fn verify(
    auth: BearerAuth,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let username = state.sessions.authorize(&auth)?;
    Ok(Json(json!({ "valid": true, "username": username })))
}

async fn list_admins(
    auth: BearerAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUser>>, ApiError> {
    state.sessions.authorize(&auth)?;
    Ok(Json(state.store.list_admins()))
}

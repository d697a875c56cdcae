//! # bedug
//!
//! A server framework for Ramadan countdown displays: a TV on a wall polls
//! the server, and the server answers with which of three screens to show.
//!
//! The daily cycle, driven entirely by wall-clock time against the day's
//! prayer schedule:
//!
//! - **`tvc`**: the advertisement loop, shown outside the windows below
//! - **`countdown`**: from the schedule's countdown start (subuh) until
//!   sunset (maghrib), with a live seconds-remaining figure
//! - **`berbuka`**: the post-sunset video, for its configured duration
//!
//! The derivation is a pure function ([`compute_display_state`]) with no stored
//! transition state, so any number of displays can poll concurrently and a
//! restarted server resumes mid-countdown without ceremony.
//!
//! ## Quick Start (axum)
//!
//! ```rust,ignore
//! use bedug::axum_ext::{router, AppState};
//! use bedug::{DisplayConfig, MemoryStore, SessionStore};
//!
//! let state = AppState {
//!     store: MemoryStore::new(),
//!     sessions: SessionStore::new(),
//!     config: DisplayConfig::default(),
//! };
//!
//! let app = router(state);
//! // axum::serve(listener, app).await
//! ```
//!
//! ## HTTP surface
//!
//! | Endpoint | Method | Purpose |
//! |----------|--------|---------|
//! | `/api/display-state` | GET | What the display should show right now |
//! | `/api/loop-videos` | GET/POST/PUT/DELETE | Ad-loop library |
//! | `/api/sunset-videos` | GET/POST/PUT/DELETE | Post-sunset video library |
//! | `/api/schedules` | GET/POST/PUT/DELETE | Daily prayer-time schedule |
//! | `/api/schedules/bulk` | POST | Import a month of schedules at once |
//! | `/api/auth/*` | – | First-run setup, login, verify |
//!
//! Mutating endpoints require a bearer token from `/api/auth/login`; the
//! display-state endpoint is public.
//!
//! ## Feature Flags
//!
//! - `axum` - Axum extractors, handlers and router assembly
//! - `full` - All features

pub mod auth;
mod config;
mod engine;
mod error;
mod model;
mod store;

pub use auth::{AdminUser, BearerAuth, SessionStore};
pub use config::DisplayConfig;
pub use engine::{compute_display_state, current_display_state, PhaseWindows};
pub use error::Error;
pub use model::{
    DisplayPhase, DisplayState, LoopVideo, LoopVideoCreate, LoopVideoUpdate, ScheduleCreate,
    ScheduleEntry, ScheduleUpdate, SunsetVideo, SunsetVideoCreate, SunsetVideoUpdate,
};
pub use store::{DisplaySource, MemoryStore};

/// How long the berbuka state lasts when no active sunset video supplies a
/// duration, in seconds.
pub const DEFAULT_SUNSET_VIDEO_DURATION_SECS: u32 = 300;

/// The display's timezone when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Asia/Jakarta";

/// Suggested polling interval for display clients, in seconds.
pub const DEFAULT_POLL_SECONDS: u32 = 30;

// Optional modules
#[cfg(feature = "axum")]
pub mod axum_ext;

/// Format a countdown as `HH:MM:SS` for on-screen rendering.
///
/// # Example
///
/// ```
/// use bedug::format_countdown;
///
/// assert_eq!(format_countdown(0), "00:00:00");
/// assert_eq!(format_countdown(61), "00:01:01");
/// assert_eq!(format_countdown(49_500), "13:45:00");
/// ```
pub fn format_countdown(seconds: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(0), "00:00:00");
        assert_eq!(format_countdown(59), "00:00:59");
        assert_eq!(format_countdown(60), "00:01:00");
        assert_eq!(format_countdown(3661), "01:01:01");
        assert_eq!(format_countdown(13 * 3600 + 45 * 60), "13:45:00");
    }

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_SUNSET_VIDEO_DURATION_SECS, 300);
        assert_eq!(DEFAULT_TIMEZONE, "Asia/Jakarta");
    }
}

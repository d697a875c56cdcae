//! Content and display payload types.
//!
//! These types match what the display frontend expects: the admin surface
//! manages [`LoopVideo`], [`SunsetVideo`] and [`ScheduleEntry`] records, and
//! the display polls for a [`DisplayState`] snapshot derived from them.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::DEFAULT_SUNSET_VIDEO_DURATION_SECS;

fn default_true() -> bool {
    true
}

fn default_duration() -> u32 {
    DEFAULT_SUNSET_VIDEO_DURATION_SECS
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// An advertisement video played in the looping `tvc` state.
///
/// Displays play all active loop videos in ascending `order`; entries that
/// share an `order` value keep their insertion order.
///
/// # Example
///
/// ```
/// use bedug::LoopVideo;
///
/// let video = LoopVideo::new("Promo A", "https://cdn.example.com/promo-a.mp4")
///     .with_order(2);
///
/// assert!(video.is_active);
/// assert_eq!(video.order, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopVideo {
    /// Unique id (uuid v4)
    pub id: String,

    /// Human-readable label shown in the admin UI
    pub name: String,

    /// Where the display fetches the asset from
    pub url: String,

    /// Sort key; lower values play first. Not required to be unique.
    #[serde(default)]
    pub order: i32,

    /// Inactive videos stay in storage but are excluded from display
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl LoopVideo {
    /// Create a new active loop video with a fresh id.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            url: url.into(),
            order: 0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Set the sort key.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Mark the video active or inactive.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }
}

/// Request body for creating a loop video.
#[derive(Debug, Clone, Deserialize)]
pub struct LoopVideoCreate {
    /// Label
    pub name: String,
    /// Asset URL
    pub url: String,
    /// Sort key (defaults to 0)
    #[serde(default)]
    pub order: i32,
    /// Active flag (defaults to true)
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Partial update for a loop video. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoopVideoUpdate {
    /// New label
    pub name: Option<String>,
    /// New asset URL
    pub url: Option<String>,
    /// New sort key
    pub order: Option<i32>,
    /// New active flag
    pub is_active: Option<bool>,
}

impl LoopVideoUpdate {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.order.is_none() && self.is_active.is_none()
    }
}

/// The video played once the sun sets (the `berbuka` state).
///
/// Storage allows several, but only the first active one is ever shown; its
/// `duration_seconds` bounds how long the `berbuka` state lasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunsetVideo {
    /// Unique id (uuid v4)
    pub id: String,

    /// Human-readable label
    pub name: String,

    /// Where the display fetches the asset from
    pub url: String,

    /// How long the berbuka state lasts, in seconds. Must be positive.
    #[serde(default = "default_duration")]
    pub duration_seconds: u32,

    /// Inactive videos stay in storage but are never shown
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl SunsetVideo {
    /// Create a new active sunset video with the default 5-minute duration.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            url: url.into(),
            duration_seconds: DEFAULT_SUNSET_VIDEO_DURATION_SECS,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Set the playback duration in seconds.
    #[must_use]
    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration_seconds = seconds;
        self
    }

    /// Mark the video active or inactive.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }
}

/// Request body for creating a sunset video.
#[derive(Debug, Clone, Deserialize)]
pub struct SunsetVideoCreate {
    /// Label
    pub name: String,
    /// Asset URL
    pub url: String,
    /// Playback duration in seconds (defaults to 300)
    #[serde(default = "default_duration")]
    pub duration_seconds: u32,
    /// Active flag (defaults to true)
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Partial update for a sunset video. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SunsetVideoUpdate {
    /// New label
    pub name: Option<String>,
    /// New asset URL
    pub url: Option<String>,
    /// New playback duration in seconds
    pub duration_seconds: Option<u32>,
    /// New active flag
    pub is_active: Option<bool>,
}

impl SunsetVideoUpdate {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.url.is_none()
            && self.duration_seconds.is_none()
            && self.is_active.is_none()
    }
}

/// One day's prayer-time schedule.
///
/// `date` is the unique key: the store refuses a second entry for the same
/// calendar date. `countdown_start` and `sunset_time` are `HH:MM` strings in
/// the display's timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Unique id (uuid v4)
    pub id: String,

    /// Calendar date, `YYYY-MM-DD`
    pub date: String,

    /// When the countdown state begins (subuh), `HH:MM`
    pub countdown_start: String,

    /// Sunset / end of fasting (maghrib), `HH:MM`
    pub sunset_time: String,

    /// Free-text location label shown on the display
    pub location: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ScheduleEntry {
    /// Create a schedule entry for a date.
    pub fn new(
        date: impl Into<String>,
        countdown_start: impl Into<String>,
        sunset_time: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            date: date.into(),
            countdown_start: countdown_start.into(),
            sunset_time: sunset_time.into(),
            location: location.into(),
            created_at: Utc::now(),
        }
    }
}

/// Request body for creating a schedule entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleCreate {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Countdown start, `HH:MM`
    pub countdown_start: String,
    /// Sunset time, `HH:MM`
    pub sunset_time: String,
    /// Location label
    pub location: String,
}

/// Partial update for a schedule entry. Absent fields are left unchanged.
///
/// The date itself is the entry's identity and cannot be patched; delete and
/// recreate to move a schedule to another day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleUpdate {
    /// New countdown start, `HH:MM`
    pub countdown_start: Option<String>,
    /// New sunset time, `HH:MM`
    pub sunset_time: Option<String>,
    /// New location label
    pub location: Option<String>,
}

impl ScheduleUpdate {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.countdown_start.is_none() && self.sunset_time.is_none() && self.location.is_none()
    }
}

/// Which of the three screens the display should be showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayPhase {
    /// Advertisement loop
    Tvc,
    /// Fasting countdown
    Countdown,
    /// Post-sunset video
    Berbuka,
}

/// What the display should render right now.
///
/// This is the payload served to polling displays. It is derived fresh on
/// every request and never persisted. Optional fields follow strict presence
/// rules:
///
/// - `countdown_seconds` is present exactly in the `countdown` phase
/// - `sunset_end_time` is present exactly in the `berbuka` phase
/// - `countdown_start_time`, `sunset_time` and `location` are present exactly
///   when a schedule exists for today, echoed verbatim as supplied
/// - `loop_videos` and `sunset_video` are always snapshotted so the display
///   can pre-load assets in any phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Current phase
    pub state: DisplayPhase,

    /// Whole seconds until sunset, rounded up, never 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_seconds: Option<u32>,

    /// Today's countdown start (`HH:MM`), as stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_start_time: Option<String>,

    /// Today's sunset time (`HH:MM`), as stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset_time: Option<String>,

    /// Location label from today's schedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Active loop videos, ascending by `order`
    #[serde(default)]
    pub loop_videos: Vec<LoopVideo>,

    /// The active sunset video, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset_video: Option<SunsetVideo>,

    /// When the berbuka video ends and the display returns to the loop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset_end_time: Option<DateTime<FixedOffset>>,
}

impl DisplayState {
    /// An advertisement-loop state with no schedule context.
    pub fn tvc() -> Self {
        Self {
            state: DisplayPhase::Tvc,
            countdown_seconds: None,
            countdown_start_time: None,
            sunset_time: None,
            location: None,
            loop_videos: Vec::new(),
            sunset_video: None,
            sunset_end_time: None,
        }
    }

    /// A countdown state with the given seconds remaining.
    pub fn countdown(seconds: u32) -> Self {
        Self {
            countdown_seconds: Some(seconds),
            state: DisplayPhase::Countdown,
            ..Self::tvc()
        }
    }

    /// A berbuka state ending at the given instant.
    pub fn berbuka(ends_at: DateTime<FixedOffset>) -> Self {
        Self {
            sunset_end_time: Some(ends_at),
            state: DisplayPhase::Berbuka,
            ..Self::tvc()
        }
    }

    /// Echo the schedule's window fields into the payload, verbatim.
    #[must_use]
    pub fn with_schedule(mut self, schedule: &ScheduleEntry) -> Self {
        self.countdown_start_time = Some(schedule.countdown_start.clone());
        self.sunset_time = Some(schedule.sunset_time.clone());
        self.location = Some(schedule.location.clone());
        self
    }

    /// Attach the content snapshots.
    #[must_use]
    pub fn with_content(mut self, loop_videos: Vec<LoopVideo>, sunset_video: Option<SunsetVideo>) -> Self {
        self.loop_videos = loop_videos;
        self.sunset_video = sunset_video;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_video_builder() {
        let video = LoopVideo::new("Promo", "https://cdn.example.com/promo.mp4")
            .with_order(3)
            .with_active(false);

        assert_eq!(video.name, "Promo");
        assert_eq!(video.order, 3);
        assert!(!video.is_active);
        assert!(!video.id.is_empty());
    }

    #[test]
    fn test_sunset_video_defaults() {
        let video = SunsetVideo::new("Iftar", "https://cdn.example.com/iftar.mp4");
        assert_eq!(video.duration_seconds, 300);
        assert!(video.is_active);

        let longer = video.with_duration(600);
        assert_eq!(longer.duration_seconds, 600);
    }

    #[test]
    fn test_phase_serialization() {
        assert_eq!(serde_json::to_string(&DisplayPhase::Tvc).unwrap(), "\"tvc\"");
        assert_eq!(
            serde_json::to_string(&DisplayPhase::Countdown).unwrap(),
            "\"countdown\""
        );
        assert_eq!(
            serde_json::to_string(&DisplayPhase::Berbuka).unwrap(),
            "\"berbuka\""
        );
    }

    #[test]
    fn test_display_state_field_presence() {
        // Bare tvc payload: no window fields at all
        let json = serde_json::to_string(&DisplayState::tvc()).unwrap();
        assert!(json.contains("\"state\":\"tvc\""));
        assert!(!json.contains("countdown_seconds"));
        assert!(!json.contains("sunset_end_time"));
        assert!(!json.contains("location"));

        // Countdown payload carries the seconds and the echoed schedule
        let schedule = ScheduleEntry::new("2026-03-01", "04:30", "18:15", "Bekasi");
        let json = serde_json::to_string(&DisplayState::countdown(90).with_schedule(&schedule)).unwrap();
        assert!(json.contains("\"countdown_seconds\":90"));
        assert!(json.contains("\"countdown_start_time\":\"04:30\""));
        assert!(json.contains("\"sunset_time\":\"18:15\""));
        assert!(json.contains("\"location\":\"Bekasi\""));
        assert!(!json.contains("sunset_end_time"));
    }

    #[test]
    fn test_update_is_empty() {
        assert!(LoopVideoUpdate::default().is_empty());
        assert!(!LoopVideoUpdate {
            order: Some(1),
            ..Default::default()
        }
        .is_empty());

        assert!(ScheduleUpdate::default().is_empty());
        assert!(!ScheduleUpdate {
            sunset_time: Some("18:20".to_string()),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_create_payload_defaults() {
        let create: LoopVideoCreate =
            serde_json::from_str(r#"{"name": "A", "url": "https://x/a.mp4"}"#).unwrap();
        assert_eq!(create.order, 0);
        assert!(create.is_active);

        let create: SunsetVideoCreate =
            serde_json::from_str(r#"{"name": "B", "url": "https://x/b.mp4"}"#).unwrap();
        assert_eq!(create.duration_seconds, 300);
    }
}

//! In-memory content store.
//!
//! Holds the video library, the schedule table and the admin accounts behind
//! one `RwLock`. Cloning a [`MemoryStore`] clones the handle, not the data,
//! so the same store can be shared across request handlers.
//!
//! [`DisplaySource`] is the narrow read boundary the engine's caller needs:
//! today's schedule, the active loop videos, the active sunset video.
//! Anything that can answer those three queries can feed
//! [`current_display_state`](crate::current_display_state).

use std::sync::{Arc, RwLock};

use chrono::NaiveDate;

use crate::auth::AdminUser;
use crate::engine::parse_time;
use crate::error::Error;
use crate::model::{
    LoopVideo, LoopVideoCreate, LoopVideoUpdate, ScheduleCreate, ScheduleEntry, ScheduleUpdate,
    SunsetVideo, SunsetVideoCreate, SunsetVideoUpdate,
};

/// Read boundary for display-state derivation.
pub trait DisplaySource {
    /// The schedule entry for a `YYYY-MM-DD` date, if one exists.
    fn schedule_for_date(&self, date: &str) -> Option<ScheduleEntry>;

    /// Active loop videos, ascending by `order` (ties in insertion order).
    fn active_loop_videos(&self) -> Vec<LoopVideo>;

    /// The first active sunset video, if any.
    fn active_sunset_video(&self) -> Option<SunsetVideo>;
}

#[derive(Default)]
struct Inner {
    loop_videos: Vec<LoopVideo>,
    sunset_videos: Vec<SunsetVideo>,
    schedules: Vec<ScheduleEntry>,
    admins: Vec<AdminUser>,
}

/// Shared in-memory store for videos, schedules and admin accounts.
///
/// # Example
///
/// ```
/// use bedug::{LoopVideoCreate, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.create_loop_video(LoopVideoCreate {
///     name: "Promo".to_string(),
///     url: "https://cdn.example.com/promo.mp4".to_string(),
///     order: 0,
///     is_active: true,
/// });
///
/// assert_eq!(store.list_loop_videos().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Loop videos ====================

    /// All loop videos, active or not, ascending by `order`.
    pub fn list_loop_videos(&self) -> Vec<LoopVideo> {
        let inner = self.inner.read().unwrap();
        let mut videos = inner.loop_videos.clone();
        videos.sort_by_key(|v| v.order);
        videos
    }

    /// Insert a new loop video.
    pub fn create_loop_video(&self, create: LoopVideoCreate) -> LoopVideo {
        let video = LoopVideo::new(create.name, create.url)
            .with_order(create.order)
            .with_active(create.is_active);

        let mut inner = self.inner.write().unwrap();
        inner.loop_videos.push(video.clone());
        video
    }

    /// Apply a partial update to a loop video.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for an empty patch, [`Error::NotFound`] for an
    /// unknown id.
    pub fn update_loop_video(&self, id: &str, patch: LoopVideoUpdate) -> Result<LoopVideo, Error> {
        if patch.is_empty() {
            return Err(Error::Validation {
                field: "body",
                message: "no fields to update".to_string(),
            });
        }

        let mut inner = self.inner.write().unwrap();
        let video = inner
            .loop_videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| Error::NotFound {
                kind: "loop video",
                id: id.to_string(),
            })?;

        if let Some(name) = patch.name {
            video.name = name;
        }
        if let Some(url) = patch.url {
            video.url = url;
        }
        if let Some(order) = patch.order {
            video.order = order;
        }
        if let Some(is_active) = patch.is_active {
            video.is_active = is_active;
        }
        Ok(video.clone())
    }

    /// Remove a loop video.
    pub fn delete_loop_video(&self, id: &str) -> Result<(), Error> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.loop_videos.len();
        inner.loop_videos.retain(|v| v.id != id);
        if inner.loop_videos.len() == before {
            return Err(Error::NotFound {
                kind: "loop video",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==================== Sunset videos ====================

    /// All sunset videos, active or not, in insertion order.
    pub fn list_sunset_videos(&self) -> Vec<SunsetVideo> {
        self.inner.read().unwrap().sunset_videos.clone()
    }

    /// Insert a new sunset video.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] when `duration_seconds` is 0.
    pub fn create_sunset_video(&self, create: SunsetVideoCreate) -> Result<SunsetVideo, Error> {
        if create.duration_seconds == 0 {
            return Err(Error::Validation {
                field: "duration_seconds",
                message: "must be positive".to_string(),
            });
        }

        let video = SunsetVideo::new(create.name, create.url)
            .with_duration(create.duration_seconds)
            .with_active(create.is_active);

        let mut inner = self.inner.write().unwrap();
        inner.sunset_videos.push(video.clone());
        Ok(video)
    }

    /// Apply a partial update to a sunset video.
    pub fn update_sunset_video(
        &self,
        id: &str,
        patch: SunsetVideoUpdate,
    ) -> Result<SunsetVideo, Error> {
        if patch.is_empty() {
            return Err(Error::Validation {
                field: "body",
                message: "no fields to update".to_string(),
            });
        }
        if patch.duration_seconds == Some(0) {
            return Err(Error::Validation {
                field: "duration_seconds",
                message: "must be positive".to_string(),
            });
        }

        let mut inner = self.inner.write().unwrap();
        let video = inner
            .sunset_videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| Error::NotFound {
                kind: "sunset video",
                id: id.to_string(),
            })?;

        if let Some(name) = patch.name {
            video.name = name;
        }
        if let Some(url) = patch.url {
            video.url = url;
        }
        if let Some(duration) = patch.duration_seconds {
            video.duration_seconds = duration;
        }
        if let Some(is_active) = patch.is_active {
            video.is_active = is_active;
        }
        Ok(video.clone())
    }

    /// Remove a sunset video.
    pub fn delete_sunset_video(&self, id: &str) -> Result<(), Error> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.sunset_videos.len();
        inner.sunset_videos.retain(|v| v.id != id);
        if inner.sunset_videos.len() == before {
            return Err(Error::NotFound {
                kind: "sunset video",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==================== Schedules ====================

    /// All schedule entries, ascending by date.
    pub fn list_schedules(&self) -> Vec<ScheduleEntry> {
        let inner = self.inner.read().unwrap();
        let mut schedules = inner.schedules.clone();
        schedules.sort_by(|a, b| a.date.cmp(&b.date));
        schedules
    }

    /// Insert a schedule for a date that has none yet.
    ///
    /// Field formats are checked here so malformed times never reach the
    /// engine.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for bad formats, [`Error::DuplicateSchedule`]
    /// when the date is already taken.
    pub fn create_schedule(&self, create: ScheduleCreate) -> Result<ScheduleEntry, Error> {
        validate_schedule_fields(&create)?;

        // Uniqueness check and insert under one write lock
        let mut inner = self.inner.write().unwrap();
        if inner.schedules.iter().any(|s| s.date == create.date) {
            return Err(Error::DuplicateSchedule { date: create.date });
        }

        let entry = ScheduleEntry::new(
            create.date,
            create.countdown_start,
            create.sunset_time,
            create.location,
        );
        inner.schedules.push(entry.clone());
        Ok(entry)
    }

    /// Insert many schedules at once, skipping dates that already exist.
    ///
    /// Returns only the entries that were actually created. A malformed
    /// entry fails the whole batch before anything is inserted.
    pub fn create_schedules_bulk(
        &self,
        creates: Vec<ScheduleCreate>,
    ) -> Result<Vec<ScheduleEntry>, Error> {
        for create in &creates {
            validate_schedule_fields(create)?;
        }

        let mut inner = self.inner.write().unwrap();
        let mut created = Vec::new();
        for create in creates {
            if inner.schedules.iter().any(|s| s.date == create.date)
                || created.iter().any(|c: &ScheduleEntry| c.date == create.date)
            {
                continue;
            }
            let entry = ScheduleEntry::new(
                create.date,
                create.countdown_start,
                create.sunset_time,
                create.location,
            );
            created.push(entry);
        }
        inner.schedules.extend(created.iter().cloned());
        Ok(created)
    }

    /// Apply a partial update to a schedule entry.
    pub fn update_schedule(&self, id: &str, patch: ScheduleUpdate) -> Result<ScheduleEntry, Error> {
        if patch.is_empty() {
            return Err(Error::Validation {
                field: "body",
                message: "no fields to update".to_string(),
            });
        }
        for (field, value) in [
            ("countdown_start", &patch.countdown_start),
            ("sunset_time", &patch.sunset_time),
        ] {
            if let Some(value) = value {
                if parse_time(value).is_none() {
                    return Err(Error::Validation {
                        field,
                        message: format!("'{value}' is not an HH:MM time"),
                    });
                }
            }
        }

        let mut inner = self.inner.write().unwrap();
        let entry = inner
            .schedules
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound {
                kind: "schedule",
                id: id.to_string(),
            })?;

        if let Some(countdown_start) = patch.countdown_start {
            entry.countdown_start = countdown_start;
        }
        if let Some(sunset_time) = patch.sunset_time {
            entry.sunset_time = sunset_time;
        }
        if let Some(location) = patch.location {
            entry.location = location;
        }
        Ok(entry.clone())
    }

    /// Remove a schedule entry.
    pub fn delete_schedule(&self, id: &str) -> Result<(), Error> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.schedules.len();
        inner.schedules.retain(|s| s.id != id);
        if inner.schedules.len() == before {
            return Err(Error::NotFound {
                kind: "schedule",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==================== Admin accounts ====================

    /// Number of admin accounts.
    pub fn admin_count(&self) -> usize {
        self.inner.read().unwrap().admins.len()
    }

    /// Create the single admin account.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if an admin already exists.
    pub fn create_admin(&self, user: AdminUser) -> Result<AdminUser, Error> {
        let mut inner = self.inner.write().unwrap();
        if !inner.admins.is_empty() {
            return Err(Error::Validation {
                field: "username",
                message: "admin account already exists".to_string(),
            });
        }
        inner.admins.push(user.clone());
        Ok(user)
    }

    /// Look up an admin account by username.
    pub fn find_admin(&self, username: &str) -> Option<AdminUser> {
        self.inner
            .read()
            .unwrap()
            .admins
            .iter()
            .find(|a| a.username == username)
            .cloned()
    }

    /// All admin accounts.
    pub fn list_admins(&self) -> Vec<AdminUser> {
        self.inner.read().unwrap().admins.clone()
    }
}

impl DisplaySource for MemoryStore {
    fn schedule_for_date(&self, date: &str) -> Option<ScheduleEntry> {
        self.inner
            .read()
            .unwrap()
            .schedules
            .iter()
            .find(|s| s.date == date)
            .cloned()
    }

    fn active_loop_videos(&self) -> Vec<LoopVideo> {
        let inner = self.inner.read().unwrap();
        let mut videos: Vec<LoopVideo> = inner
            .loop_videos
            .iter()
            .filter(|v| v.is_active)
            .cloned()
            .collect();
        videos.sort_by_key(|v| v.order);
        videos
    }

    fn active_sunset_video(&self) -> Option<SunsetVideo> {
        self.inner
            .read()
            .unwrap()
            .sunset_videos
            .iter()
            .find(|v| v.is_active)
            .cloned()
    }
}

fn validate_schedule_fields(create: &ScheduleCreate) -> Result<(), Error> {
    if NaiveDate::parse_from_str(&create.date, "%Y-%m-%d").is_err() {
        return Err(Error::Validation {
            field: "date",
            message: format!("'{}' is not a YYYY-MM-DD date", create.date),
        });
    }
    for (field, value) in [
        ("countdown_start", &create.countdown_start),
        ("sunset_time", &create.sunset_time),
    ] {
        if parse_time(value).is_none() {
            return Err(Error::Validation {
                field,
                message: format!("'{value}' is not an HH:MM time"),
            });
        }
    }
    Ok(())
}

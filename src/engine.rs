//! Display-state derivation.
//!
//! The engine answers one question: given the current instant, today's
//! schedule and the active content library, which screen should the display
//! be showing? It is a pure function: no I/O, no caching, no stored state.
//! Every call reclassifies `now` against two schedule-derived instants:
//!
//! ```text
//!            countdown_start         sunset        sunset + duration
//!   ── tvc ──┼──── countdown ────────┼── berbuka ──┼── tvc ──▶
//! ```
//!
//! All four intervals are half-open on the right, so each boundary instant
//! belongs to the later phase: at exactly `sunset_time` the display is
//! already in `berbuka`, and at exactly `sunset + duration` it is back on
//! the loop.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bedug::{compute_display_state, DisplayPhase};
//!
//! let now = config.now(); // DateTime in the display's fixed timezone
//! let state = compute_display_state(now, schedule.as_ref(), &loop_videos, sunset_video.as_ref())?;
//!
//! match state.state {
//!     DisplayPhase::Countdown => println!("{}s to go", state.countdown_seconds.unwrap()),
//!     _ => {}
//! }
//! ```

use chrono::{DateTime, Datelike, NaiveTime, TimeDelta, TimeZone, Timelike};

use crate::error::Error;
use crate::model::{DisplayState, LoopVideo, ScheduleEntry, SunsetVideo};
use crate::store::DisplaySource;
use crate::DEFAULT_SUNSET_VIDEO_DURATION_SECS;

/// The three instants that bound today's display phases.
///
/// Built from a schedule entry projected onto one calendar date. Seconds and
/// sub-seconds of the schedule times are zero by construction (`HH:MM`).
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseWindows<Tz: TimeZone> {
    /// When the countdown state begins
    pub countdown_start: DateTime<Tz>,
    /// When the countdown ends and the berbuka video starts
    pub sunset: DateTime<Tz>,
    /// When the berbuka video ends and the loop resumes
    pub sunset_end: DateTime<Tz>,
}

impl<Tz: TimeZone> PhaseWindows<Tz> {
    /// Project a schedule onto `now`'s calendar date.
    ///
    /// `duration_seconds` is how long the berbuka window lasts past sunset
    /// (the active sunset video's duration, or the 300-second default).
    ///
    /// # Errors
    ///
    /// [`Error::MalformedSchedule`] if either time-of-day string fails to
    /// parse as `HH:MM`, or names an instant that does not exist on this
    /// date in this zone.
    pub fn for_day(
        now: &DateTime<Tz>,
        schedule: &ScheduleEntry,
        duration_seconds: u32,
    ) -> Result<Self, Error> {
        let countdown_start = at_time_of_day(now, &schedule.countdown_start, "countdown_start")?;
        let sunset = at_time_of_day(now, &schedule.sunset_time, "sunset_time")?;
        let sunset_end = sunset.clone() + TimeDelta::seconds(i64::from(duration_seconds));

        Ok(Self {
            countdown_start,
            sunset,
            sunset_end,
        })
    }
}

/// Compute what the display should show at `now`.
///
/// This is the whole engine. Inputs are plain values the caller already
/// fetched; the output is freshly constructed on every call, so two calls
/// with identical inputs return identical results.
///
/// Policies:
///
/// - No schedule for today is not an error: the display degrades to a
///   perpetual `tvc` state with no window fields, content still attached so
///   the caller can pre-render assets.
/// - No active sunset video is not an error: the berbuka window falls back
///   to [`DEFAULT_SUNSET_VIDEO_DURATION_SECS`].
/// - `countdown_seconds` is the remaining time rounded *up* to whole
///   seconds: a remainder of 0.3s still reads "1", and the value only
///   disappears once the berbuka phase begins. It is never 0.
/// - The loop-video snapshot is re-sorted ascending by `order` (stable, so
///   equal orders keep their incoming sequence), whether or not the caller
///   pre-sorted.
///
/// # Errors
///
/// [`Error::MalformedSchedule`] if the schedule's time-of-day strings do not
/// parse. Such entries should have been rejected at the CRUD boundary, so
/// hitting this means the repository contract was violated.
pub fn compute_display_state<Tz: TimeZone>(
    now: DateTime<Tz>,
    schedule: Option<&ScheduleEntry>,
    loop_videos: &[LoopVideo],
    sunset_video: Option<&SunsetVideo>,
) -> Result<DisplayState, Error> {
    let mut loops = loop_videos.to_vec();
    loops.sort_by_key(|v| v.order);

    let Some(schedule) = schedule else {
        return Ok(DisplayState::tvc().with_content(loops, sunset_video.cloned()));
    };

    let duration = sunset_video
        .map(|v| v.duration_seconds)
        .unwrap_or(DEFAULT_SUNSET_VIDEO_DURATION_SECS);
    let windows = PhaseWindows::for_day(&now, schedule, duration)?;

    let state = if now < windows.countdown_start {
        DisplayState::tvc()
    } else if now < windows.sunset {
        DisplayState::countdown(seconds_until(&now, &windows.sunset))
    } else if now < windows.sunset_end {
        DisplayState::berbuka(windows.sunset_end.fixed_offset())
    } else {
        DisplayState::tvc()
    };

    Ok(state
        .with_schedule(schedule)
        .with_content(loops, sunset_video.cloned()))
}

/// Fetch today's inputs from a [`DisplaySource`] and run the engine.
///
/// This is the per-request control flow: look up the schedule under `now`'s
/// calendar date, snapshot the active content, classify. Callers polling
/// across midnight get the new date simply by passing a fresh `now`.
pub fn current_display_state<S, Tz>(source: &S, now: DateTime<Tz>) -> Result<DisplayState, Error>
where
    S: DisplaySource + ?Sized,
    Tz: TimeZone,
{
    let today = now.date_naive().format("%Y-%m-%d").to_string();
    let schedule = source.schedule_for_date(&today);
    let loop_videos = source.active_loop_videos();
    let sunset_video = source.active_sunset_video();

    compute_display_state(now, schedule.as_ref(), &loop_videos, sunset_video.as_ref())
}

/// Whole seconds from `now` until `until`, rounded up, floored at 1.
///
/// Only called while `now < until`, so the result is always positive; the
/// rounding keeps a sub-second remainder reading "1" rather than "0".
fn seconds_until<Tz: TimeZone>(now: &DateTime<Tz>, until: &DateTime<Tz>) -> u32 {
    let nanos = (until.clone() - now.clone()).num_nanoseconds().unwrap_or(0);
    let secs = (nanos + 999_999_999) / 1_000_000_000;
    secs.max(1) as u32
}

/// Parse a time-of-day string (`HH:MM`) into a `NaiveTime`.
///
/// Seconds are zeroed; anything beyond hours and minutes is rejected.
pub(crate) fn parse_time(s: &str) -> Option<NaiveTime> {
    let (hour, minute) = s.split_once(':')?;
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

/// Combine `now`'s calendar date with a `HH:MM` string in `now`'s zone.
fn at_time_of_day<Tz: TimeZone>(
    now: &DateTime<Tz>,
    value: &str,
    field: &'static str,
) -> Result<DateTime<Tz>, Error> {
    let malformed = || Error::MalformedSchedule {
        field,
        value: value.to_string(),
    };

    let time = parse_time(value).ok_or_else(malformed)?;
    now.timezone()
        .with_ymd_and_hms(
            now.year(),
            now.month(),
            now.day(),
            time.hour(),
            time.minute(),
            0,
        )
        // A time skipped by a zone transition cannot be rendered on this date
        .earliest()
        .ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DisplayPhase;
    use chrono_tz::Asia::Jakarta;
    use chrono_tz::Tz;

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Tz> {
        Jakarta.with_ymd_and_hms(2026, 3, 1, hour, min, sec).unwrap()
    }

    fn schedule() -> ScheduleEntry {
        ScheduleEntry::new("2026-03-01", "04:30", "18:15", "Bekasi")
    }

    fn videos() -> Vec<LoopVideo> {
        vec![
            LoopVideo::new("A", "https://cdn.example.com/a.mp4").with_order(2),
            LoopVideo::new("B", "https://cdn.example.com/b.mp4").with_order(1),
        ]
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_time("23:30"), NaiveTime::from_hms_opt(23, 30, 0));
        assert_eq!(parse_time("18:15:00"), None);
        assert_eq!(parse_time("6pm"), None);
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time("12"), None);
    }

    #[test]
    fn test_phase_windows() {
        let windows = PhaseWindows::for_day(&at(12, 0, 0), &schedule(), 300).unwrap();
        assert_eq!(windows.countdown_start, at(4, 30, 0));
        assert_eq!(windows.sunset, at(18, 15, 0));
        assert_eq!(windows.sunset_end, at(18, 20, 0));
    }

    #[test]
    fn test_before_countdown_is_tvc() {
        let state = compute_display_state(at(4, 29, 59), Some(&schedule()), &[], None).unwrap();
        assert_eq!(state.state, DisplayPhase::Tvc);
        assert_eq!(state.countdown_seconds, None);
        assert_eq!(state.sunset_end_time, None);
        // Window fields are still echoed because a schedule exists
        assert_eq!(state.sunset_time.as_deref(), Some("18:15"));
        assert_eq!(state.location.as_deref(), Some("Bekasi"));
    }

    #[test]
    fn test_countdown_starts_at_boundary() {
        let state = compute_display_state(at(4, 30, 0), Some(&schedule()), &[], None).unwrap();
        assert_eq!(state.state, DisplayPhase::Countdown);
        // Full span: 04:30 to 18:15 is 13h45m
        assert_eq!(state.countdown_seconds, Some(13 * 3600 + 45 * 60));
        assert_eq!(state.countdown_start_time.as_deref(), Some("04:30"));
    }

    #[test]
    fn test_countdown_strictly_decreasing() {
        let probes = [at(10, 0, 0), at(12, 0, 0), at(17, 59, 59), at(18, 14, 0)];
        let mut last = u32::MAX;
        for now in probes {
            let state = compute_display_state(now, Some(&schedule()), &[], None).unwrap();
            let seconds = state.countdown_seconds.unwrap();
            assert!(seconds < last);
            assert!(seconds >= 1);
            last = seconds;
        }
    }

    #[test]
    fn test_last_second_reads_one() {
        let state = compute_display_state(at(18, 14, 59), Some(&schedule()), &[], None).unwrap();
        assert_eq!(state.state, DisplayPhase::Countdown);
        assert_eq!(state.countdown_seconds, Some(1));
    }

    #[test]
    fn test_subsecond_remainder_rounds_up() {
        // 0.7s remaining still displays "1", never "0"
        let now = at(18, 14, 59) + TimeDelta::milliseconds(300);
        let state = compute_display_state(now, Some(&schedule()), &[], None).unwrap();
        assert_eq!(state.countdown_seconds, Some(1));

        // 1.5s remaining rounds up to 2
        let now = at(18, 14, 58) + TimeDelta::milliseconds(500);
        let state = compute_display_state(now, Some(&schedule()), &[], None).unwrap();
        assert_eq!(state.countdown_seconds, Some(2));
    }

    #[test]
    fn test_berbuka_starts_at_sunset() {
        let state = compute_display_state(at(18, 15, 0), Some(&schedule()), &[], None).unwrap();
        assert_eq!(state.state, DisplayPhase::Berbuka);
        assert_eq!(state.countdown_seconds, None);
        assert_eq!(state.sunset_end_time, Some(at(18, 20, 0).fixed_offset()));
    }

    #[test]
    fn test_berbuka_end_is_exclusive() {
        let state = compute_display_state(at(18, 19, 59), Some(&schedule()), &[], None).unwrap();
        assert_eq!(state.state, DisplayPhase::Berbuka);

        let state = compute_display_state(at(18, 20, 0), Some(&schedule()), &[], None).unwrap();
        assert_eq!(state.state, DisplayPhase::Tvc);
        assert_eq!(state.sunset_end_time, None);
    }

    #[test]
    fn test_sunset_video_duration_is_used_verbatim() {
        let video = SunsetVideo::new("Iftar", "https://cdn.example.com/iftar.mp4").with_duration(600);

        let state =
            compute_display_state(at(18, 24, 59), Some(&schedule()), &[], Some(&video)).unwrap();
        assert_eq!(state.state, DisplayPhase::Berbuka);
        assert_eq!(state.sunset_end_time, Some(at(18, 25, 0).fixed_offset()));

        let state =
            compute_display_state(at(18, 25, 0), Some(&schedule()), &[], Some(&video)).unwrap();
        assert_eq!(state.state, DisplayPhase::Tvc);
    }

    #[test]
    fn test_missing_sunset_video_defaults_to_300() {
        let state = compute_display_state(at(18, 19, 59), Some(&schedule()), &[], None).unwrap();
        assert_eq!(state.state, DisplayPhase::Berbuka);
        assert_eq!(state.sunset_video, None);
        assert_eq!(state.sunset_end_time, Some(at(18, 20, 0).fixed_offset()));
    }

    #[test]
    fn test_no_schedule_is_perpetual_tvc() {
        for now in [at(0, 0, 0), at(12, 0, 0), at(18, 15, 0), at(23, 59, 59)] {
            let state = compute_display_state(now, None, &videos(), None).unwrap();
            assert_eq!(state.state, DisplayPhase::Tvc);
            assert_eq!(state.countdown_seconds, None);
            assert_eq!(state.countdown_start_time, None);
            assert_eq!(state.sunset_time, None);
            assert_eq!(state.location, None);
            // Content still rides along so the display can pre-load
            assert_eq!(state.loop_videos.len(), 2);
        }
    }

    #[test]
    fn test_loop_videos_sorted_by_order() {
        let state = compute_display_state(at(12, 0, 0), None, &videos(), None).unwrap();
        let names: Vec<&str> = state.loop_videos.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn test_order_ties_keep_insertion_order() {
        let tied = vec![
            LoopVideo::new("first", "https://x/1.mp4").with_order(5),
            LoopVideo::new("second", "https://x/2.mp4").with_order(5),
        ];
        let state = compute_display_state(at(12, 0, 0), None, &tied, None).unwrap();
        let names: Vec<&str> = state.loop_videos.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn test_identical_inputs_identical_outputs() {
        let video = SunsetVideo::new("Iftar", "https://cdn.example.com/iftar.mp4");
        let a = compute_display_state(at(17, 0, 0), Some(&schedule()), &videos(), Some(&video))
            .unwrap();
        let b = compute_display_state(at(17, 0, 0), Some(&schedule()), &videos(), Some(&video))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_malformed_times_are_errors() {
        let mut bad = schedule();
        bad.sunset_time = "6pm".to_string();
        let err = compute_display_state(at(12, 0, 0), Some(&bad), &[], None).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedSchedule { field: "sunset_time", .. }
        ));

        let mut bad = schedule();
        bad.countdown_start = "0430".to_string();
        let err = compute_display_state(at(12, 0, 0), Some(&bad), &[], None).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedSchedule { field: "countdown_start", .. }
        ));
    }
}

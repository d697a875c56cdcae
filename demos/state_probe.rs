//! Walk one day's phase transitions and print each payload
//!
//! Run with: cargo run --example state_probe

use bedug::{compute_display_state, format_countdown, LoopVideo, ScheduleEntry, SunsetVideo};
use chrono::TimeZone;
use chrono_tz::Asia::Jakarta;

fn main() {
    let schedule = ScheduleEntry::new("2026-03-01", "04:30", "18:15", "Bekasi");
    let loop_videos = vec![
        LoopVideo::new("Promo A", "https://cdn.example.com/promo-a.mp4").with_order(1),
        LoopVideo::new("Promo B", "https://cdn.example.com/promo-b.mp4").with_order(2),
    ];
    let sunset_video = SunsetVideo::new("Selamat Berbuka", "https://cdn.example.com/berbuka.mp4");

    println!("Schedule: countdown from {} | sunset {} | {}", schedule.countdown_start, schedule.sunset_time, schedule.location);
    println!();

    let probes = [
        (4, 29, 59),
        (4, 30, 0),
        (12, 0, 0),
        (18, 14, 59),
        (18, 15, 0),
        (18, 19, 59),
        (18, 20, 0),
    ];

    for (hour, min, sec) in probes {
        let now = Jakarta.with_ymd_and_hms(2026, 3, 1, hour, min, sec).unwrap();
        let state =
            compute_display_state(now, Some(&schedule), &loop_videos, Some(&sunset_video))
                .expect("schedule times are well-formed");

        match state.countdown_seconds {
            Some(seconds) => println!(
                "{hour:02}:{min:02}:{sec:02}  {:?}  remaining {}",
                state.state,
                format_countdown(seconds)
            ),
            None => println!("{hour:02}:{min:02}:{sec:02}  {:?}", state.state),
        }
    }

    // Full payload as the display would receive it
    let noon = Jakarta.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let state = compute_display_state(noon, Some(&schedule), &loop_videos, Some(&sunset_video))
        .expect("schedule times are well-formed");
    println!();
    println!("{}", serde_json::to_string_pretty(&state).unwrap());
}

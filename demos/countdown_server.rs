//! Full countdown server with seeded demo content
//!
//! Run with: cargo run --example countdown_server --features axum
//!
//! Then test with:
//!   curl http://localhost:3000/api/display-state

use bedug::axum_ext::{router, AppState};
use bedug::{
    DisplayConfig, LoopVideoCreate, MemoryStore, ScheduleCreate, SessionStore, SunsetVideoCreate,
};

fn seed(store: &MemoryStore, config: &DisplayConfig) {
    store.create_loop_video(LoopVideoCreate {
        name: "Promo A".to_string(),
        url: "https://cdn.example.com/promo-a.mp4".to_string(),
        order: 1,
        is_active: true,
    });
    store.create_loop_video(LoopVideoCreate {
        name: "Promo B".to_string(),
        url: "https://cdn.example.com/promo-b.mp4".to_string(),
        order: 2,
        is_active: true,
    });

    store
        .create_sunset_video(SunsetVideoCreate {
            name: "Selamat Berbuka".to_string(),
            url: "https://cdn.example.com/berbuka.mp4".to_string(),
            duration_seconds: 300,
            is_active: true,
        })
        .expect("seed sunset video");

    // A schedule for today so every phase is reachable without the admin UI
    let today = config.now().date_naive().format("%Y-%m-%d").to_string();
    store
        .create_schedule(ScheduleCreate {
            date: today,
            countdown_start: "04:30".to_string(),
            sunset_time: "18:15".to_string(),
            location: "Bekasi".to_string(),
        })
        .expect("seed schedule");
}

#[tokio::main]
async fn main() {
    let config = DisplayConfig::default();
    let store = MemoryStore::new();
    seed(&store, &config);

    println!("Starting countdown display server on http://localhost:3000");
    println!("Display timezone: {}", config.timezone);
    println!();
    println!("Endpoints:");
    println!("  GET  /api/display-state     - What the display should show");
    println!("  GET  /api/loop-videos       - Ad-loop library");
    println!("  GET  /api/schedules         - Daily schedule table");
    println!("  POST /api/auth/setup        - Create the admin account");
    println!();
    println!("Test with:");
    println!("  curl http://localhost:3000/api/display-state");

    let app = router(AppState {
        store,
        sessions: SessionStore::new(),
        config,
    });

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

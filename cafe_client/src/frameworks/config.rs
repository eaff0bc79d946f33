use crate::domain::Viewport;
use crate::interface_adapters::utils::rng::guest_name;
use std::{env, time::Duration};

// Runtime/client constants (not presence tuning).

pub fn server_url() -> String {
    env::var("CAFE_SERVER_URL").unwrap_or_else(|_| "ws://127.0.0.1:8000/ws".to_string())
}

pub fn room_code() -> String {
    env::var("CAFE_ROOM_CODE")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "TEST".to_string())
}

pub fn display_name() -> String {
    env::var("CAFE_DISPLAY_NAME")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(guest_name)
}

pub fn viewport() -> Viewport {
    Viewport::new(
        dimension("CAFE_VIEWPORT_WIDTH", 1280.0),
        dimension("CAFE_VIEWPORT_HEIGHT", 720.0),
    )
}

fn dimension(key: &str, default: f32) -> f32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<f32>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}

pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
pub const OUTBOUND_CHANNEL_CAPACITY: usize = 256;

pub const FRAME_INTERVAL: Duration = Duration::from_millis(1000 / 60);
// Cadence of the headless frame summary log.
pub const SUMMARY_INTERVAL: Duration = Duration::from_secs(1);

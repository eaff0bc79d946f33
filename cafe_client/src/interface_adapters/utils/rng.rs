use std::{
    sync::{
        OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

fn seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Process-unique identifier for correlating connection logs.
///
/// Seeded from the clock once, then incremented, so two calls in the same instant never collide.
pub fn rand_id() -> u64 {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    COUNTER
        .get_or_init(|| AtomicU64::new(seed()))
        .fetch_add(1, Ordering::Relaxed)
}

/// Fallback display name when none is configured, e.g. `Guest417`.
pub fn guest_name() -> String {
    // Mix the counter so consecutive guests do not get consecutive numbers.
    let mixed = rand_id().wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 32;
    format!("Guest{}", 100 + mixed % 900)
}

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock seconds, used for `Order::created_at_secs` and log timestamps.
/// A plain `u64` rather than `Instant`/`SystemTime` because those are not
/// `repr(C)`-stable across the two processes that map `SharedState`.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

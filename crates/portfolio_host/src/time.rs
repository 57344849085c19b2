//! Clock helpers for terminal history.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

use terminal_contract::HistoryEntry;

/// Current unix time in milliseconds. Used as the default session clock.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }
}

/// Stamp for a saved history envelope.
///
/// Never earlier than the newest entry it carries, even when the wall clock stepped back after
/// the entry was recorded.
pub fn history_save_stamp(entries: &[HistoryEntry], now_ms: u64) -> u64 {
    entries
        .iter()
        .map(|entry| entry.timestamp_ms)
        .fold(now_ms, u64::max)
}

//! Preference and history storage contracts.

pub mod history;
pub mod prefs;

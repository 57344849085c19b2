//! Host collaborator contracts for the portfolio terminal.
//!
//! Commands never touch browser storage, the content database, or the auth provider directly.
//! They go through the traits here, which ship with in-memory and no-op adapters for tests and
//! for targets without durable storage.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod content;
pub mod storage;
pub mod time;

pub use auth::{AuthFuture, AuthProvider, AuthSession, AuthUser, MemoryAuthProvider};
pub use content::{
    CachedContentSource, ContentFuture, ContentSnapshot, ContentSource, Education, Experience,
    MemoryContentSource, Profile, ProfileLink, Project,
};
pub use storage::history::{
    load_history_entries, save_history_entries, HistoryEnvelope, HistoryStore, HistoryStoreFuture,
    MemoryHistoryStore, NoopHistoryStore, HISTORY_SCHEMA_VERSION,
};
pub use storage::prefs::{
    load_appearance_prefs, save_appearance_pref, AppearancePrefs, MemoryPrefsStore, PrefSlot,
    PrefsStore, PrefsStoreFuture,
};
pub use time::{history_save_stamp, unix_time_ms_now};

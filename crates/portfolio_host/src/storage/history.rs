//! Durable terminal history: a versioned envelope of settled history entries.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use leptos::logging;
use serde::{Deserialize, Serialize};
use terminal_contract::HistoryEntry;

use crate::time::{history_save_stamp, unix_time_ms_now};

/// Schema version written into every [`HistoryEnvelope`].
pub const HISTORY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Versioned container for persisted terminal history.
pub struct HistoryEnvelope {
    /// Payload schema version.
    pub schema_version: u32,
    /// Last update time in unix milliseconds.
    pub updated_at_unix_ms: u64,
    /// Persisted entries in display order.
    pub entries: Vec<HistoryEntry>,
}

impl HistoryEnvelope {
    /// Wraps `entries` in a current-version envelope stamped with [`history_save_stamp`].
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self {
            schema_version: HISTORY_SCHEMA_VERSION,
            updated_at_unix_ms: history_save_stamp(&entries, unix_time_ms_now()),
            entries,
        }
    }
}

/// Object-safe boxed future used by [`HistoryStore`] async methods.
pub type HistoryStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Storage service for the terminal history envelope.
pub trait HistoryStore {
    /// Loads the persisted envelope, if any.
    fn load_history<'a>(&'a self) -> HistoryStoreFuture<'a, Result<Option<HistoryEnvelope>, String>>;

    /// Replaces the persisted envelope.
    fn save_history<'a>(
        &'a self,
        envelope: &'a HistoryEnvelope,
    ) -> HistoryStoreFuture<'a, Result<(), String>>;

    /// Removes persisted history.
    fn clear_history<'a>(&'a self) -> HistoryStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// History store that persists nothing.
pub struct NoopHistoryStore;

impl HistoryStore for NoopHistoryStore {
    fn load_history<'a>(&'a self) -> HistoryStoreFuture<'a, Result<Option<HistoryEnvelope>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_history<'a>(
        &'a self,
        _envelope: &'a HistoryEnvelope,
    ) -> HistoryStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn clear_history<'a>(&'a self) -> HistoryStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory history store. Clones share the same slot.
pub struct MemoryHistoryStore {
    inner: Rc<RefCell<Option<HistoryEnvelope>>>,
}

impl MemoryHistoryStore {
    /// Currently stored envelope.
    pub fn snapshot(&self) -> Option<HistoryEnvelope> {
        self.inner.borrow().clone()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load_history<'a>(&'a self) -> HistoryStoreFuture<'a, Result<Option<HistoryEnvelope>, String>> {
        Box::pin(async move { Ok(self.snapshot()) })
    }

    fn save_history<'a>(
        &'a self,
        envelope: &'a HistoryEnvelope,
    ) -> HistoryStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            *self.inner.borrow_mut() = Some(envelope.clone());
            Ok(())
        })
    }

    fn clear_history<'a>(&'a self) -> HistoryStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner.borrow_mut().take();
            Ok(())
        })
    }
}

/// Loads persisted entries, treating an envelope from another schema version as empty.
///
/// # Errors
///
/// Returns an error when the store itself fails.
pub async fn load_history_entries<S: HistoryStore + ?Sized>(
    store: &S,
) -> Result<Vec<HistoryEntry>, String> {
    let Some(envelope) = store.load_history().await? else {
        return Ok(Vec::new());
    };
    if envelope.schema_version != HISTORY_SCHEMA_VERSION {
        logging::warn!(
            "ignoring persisted terminal history with schema {} (expected {})",
            envelope.schema_version,
            HISTORY_SCHEMA_VERSION
        );
        return Ok(Vec::new());
    }
    Ok(envelope.entries)
}

/// Wraps `entries` in a fresh envelope and saves it.
///
/// # Errors
///
/// Returns an error when the store save fails.
pub async fn save_history_entries<S: HistoryStore + ?Sized>(
    store: &S,
    entries: Vec<HistoryEntry>,
) -> Result<(), String> {
    store.save_history(&HistoryEnvelope::new(entries)).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use terminal_contract::{CommandOutput, EntryId, EntryStatus};

    use super::*;

    fn entry(id: u64, command: &str) -> HistoryEntry {
        HistoryEntry {
            id: EntryId(id),
            command: command.to_string(),
            output: CommandOutput::text(format!("ran {command}")),
            status: EntryStatus::Complete,
            timestamp_ms: 1_700_000_000_000 + id,
        }
    }

    #[test]
    fn envelope_serializes_with_snake_case_fields() {
        let envelope = HistoryEnvelope {
            schema_version: HISTORY_SCHEMA_VERSION,
            updated_at_unix_ms: 42,
            entries: Vec::new(),
        };
        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(
            value,
            json!({"schema_version": 1, "updated_at_unix_ms": 42, "entries": []})
        );
    }

    #[test]
    fn new_envelope_is_stamped_no_earlier_than_its_entries() {
        let mut future = entry(1, "about");
        future.timestamp_ms = u64::MAX - 1;
        let envelope = HistoryEnvelope::new(vec![entry(2, "help"), future]);
        assert_eq!(envelope.updated_at_unix_ms, u64::MAX - 1);
        assert_eq!(envelope.schema_version, HISTORY_SCHEMA_VERSION);
    }

    #[test]
    fn memory_store_saves_loads_and_clears() {
        let store = MemoryHistoryStore::default();
        let store_obj: &dyn HistoryStore = &store;
        let entries = vec![entry(1, "about"), entry(2, "projects")];

        block_on(save_history_entries(store_obj, entries.clone())).expect("save");
        assert_eq!(block_on(load_history_entries(store_obj)).expect("load"), entries);

        block_on(store_obj.clear_history()).expect("clear");
        assert!(block_on(load_history_entries(store_obj)).expect("load").is_empty());
    }

    #[test]
    fn foreign_schema_loads_as_empty() {
        let store = MemoryHistoryStore::default();
        let envelope = HistoryEnvelope {
            schema_version: HISTORY_SCHEMA_VERSION + 1,
            updated_at_unix_ms: 1,
            entries: vec![entry(1, "help")],
        };
        block_on(store.save_history(&envelope)).expect("save");
        assert!(block_on(load_history_entries(&store)).expect("load").is_empty());
    }

    #[test]
    fn noop_store_is_always_empty() {
        let store = NoopHistoryStore;
        block_on(save_history_entries(&store, vec![entry(1, "echo hi")])).expect("save");
        assert_eq!(block_on(store.load_history()).expect("load"), None);
    }
}

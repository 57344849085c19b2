//! Saved terminal appearance.
//!
//! The theme, cursor, and wallpaper choices live in one JSON document. A slot that was never
//! chosen is absent, so the configured default applies.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};

/// Object-safe boxed future used by [`PrefsStore`] async methods.
pub type PrefsStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// One saved appearance choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrefSlot {
    /// Color theme.
    Theme,
    /// Cursor style.
    Cursor,
    /// Background wallpaper.
    Wallpaper,
}

/// Saved appearance document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearancePrefs {
    /// Chosen theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Chosen cursor style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Chosen wallpaper.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallpaper: Option<String>,
}

impl AppearancePrefs {
    /// Saved value for `slot`.
    pub fn get(&self, slot: PrefSlot) -> Option<&str> {
        match slot {
            PrefSlot::Theme => self.theme.as_deref(),
            PrefSlot::Cursor => self.cursor.as_deref(),
            PrefSlot::Wallpaper => self.wallpaper.as_deref(),
        }
    }

    /// Records `value` for `slot`.
    pub fn set(&mut self, slot: PrefSlot, value: impl Into<String>) {
        let value = Some(value.into());
        match slot {
            PrefSlot::Theme => self.theme = value,
            PrefSlot::Cursor => self.cursor = value,
            PrefSlot::Wallpaper => self.wallpaper = value,
        }
    }
}

/// Host storage for the appearance document, kept as raw JSON.
pub trait PrefsStore {
    /// Loads the stored document, if any.
    fn load_prefs(&self) -> PrefsStoreFuture<'_, Result<Option<String>, String>>;

    /// Replaces the stored document.
    fn save_prefs<'a>(&'a self, raw_json: &'a str) -> PrefsStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Default)]
/// In-memory appearance store. Clones share the same slot.
pub struct MemoryPrefsStore {
    inner: Rc<RefCell<Option<String>>>,
}

impl MemoryPrefsStore {
    /// Store holding `raw_json` as is.
    pub fn with_raw(raw_json: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Some(raw_json.into()))),
        }
    }

    /// Store holding `prefs`.
    pub fn with_prefs(prefs: &AppearancePrefs) -> Self {
        let store = Self::default();
        *store.inner.borrow_mut() = serde_json::to_string(prefs).ok();
        store
    }

    /// Raw JSON currently stored.
    pub fn raw(&self) -> Option<String> {
        self.inner.borrow().clone()
    }

    /// Decoded document, when one is stored and well-formed.
    pub fn snapshot(&self) -> Option<AppearancePrefs> {
        self.raw().and_then(|raw| serde_json::from_str(&raw).ok())
    }
}

impl PrefsStore for MemoryPrefsStore {
    fn load_prefs(&self) -> PrefsStoreFuture<'_, Result<Option<String>, String>> {
        Box::pin(async move { Ok(self.raw()) })
    }

    fn save_prefs<'a>(&'a self, raw_json: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            *self.inner.borrow_mut() = Some(raw_json.to_string());
            Ok(())
        })
    }
}

/// Loads the saved appearance, empty when nothing was saved.
///
/// # Errors
///
/// Returns an error when the store fails or the stored document is malformed.
pub async fn load_appearance_prefs<S: PrefsStore + ?Sized>(
    store: &S,
) -> Result<AppearancePrefs, String> {
    let Some(raw) = store.load_prefs().await? else {
        return Ok(AppearancePrefs::default());
    };
    serde_json::from_str(&raw).map_err(|err| format!("appearance prefs: {err}"))
}

/// Saves one appearance choice, keeping the other slots.
///
/// A malformed stored document is replaced.
///
/// # Errors
///
/// Returns an error when the store fails.
pub async fn save_appearance_pref<S: PrefsStore + ?Sized>(
    store: &S,
    slot: PrefSlot,
    value: &str,
) -> Result<(), String> {
    let mut prefs = store
        .load_prefs()
        .await?
        .and_then(|raw| serde_json::from_str::<AppearancePrefs>(&raw).ok())
        .unwrap_or_default();
    prefs.set(slot, value);
    let raw = serde_json::to_string(&prefs).map_err(|err| err.to_string())?;
    store.save_prefs(&raw).await
}

//! Host-owned appearance state: current theme, cursor, and wallpaper.

use std::rc::Rc;

use leptos::{create_rw_signal, logging, ReadSignal, RwSignal, SignalGetUntracked, SignalUpdate};
use portfolio_host::{load_appearance_prefs, PrefSlot, PrefsStore};
use serde::{Deserialize, Serialize};
use terminal_contract::{CommandError, Effect};

use crate::config::AppearanceConfig;

/// One adjustable appearance setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppearanceKind {
    /// Color theme.
    Theme,
    /// Cursor style.
    Cursor,
    /// Background wallpaper.
    Wallpaper,
}

impl AppearanceKind {
    /// All kinds in display order.
    pub const ALL: [AppearanceKind; 3] = [Self::Theme, Self::Cursor, Self::Wallpaper];

    /// Lowercase singular noun, also the command name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::Cursor => "cursor",
            Self::Wallpaper => "wallpaper",
        }
    }

    /// Saved preference slot for this kind.
    pub fn pref_slot(self) -> PrefSlot {
        match self {
            Self::Theme => PrefSlot::Theme,
            Self::Cursor => PrefSlot::Cursor,
            Self::Wallpaper => PrefSlot::Wallpaper,
        }
    }

    /// Effect that asks the UI to apply `value`.
    pub fn effect(self, value: impl Into<String>) -> Effect {
        let value = value.into();
        match self {
            Self::Theme => Effect::ApplyTheme { theme: value },
            Self::Cursor => Effect::ApplyCursor { cursor: value },
            Self::Wallpaper => Effect::ApplyWallpaper { wallpaper: value },
        }
    }

    /// Kind and value carried by an `Apply*` effect.
    pub fn from_effect(effect: &Effect) -> Option<(Self, &str)> {
        match effect {
            Effect::ApplyTheme { theme } => Some((Self::Theme, theme.as_str())),
            Effect::ApplyCursor { cursor } => Some((Self::Cursor, cursor.as_str())),
            Effect::ApplyWallpaper { wallpaper } => Some((Self::Wallpaper, wallpaper.as_str())),
            _ => None,
        }
    }
}

/// Current appearance selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppearanceSelection {
    /// Active theme.
    pub theme: String,
    /// Active cursor style.
    pub cursor: String,
    /// Active wallpaper.
    pub wallpaper: String,
}

impl AppearanceSelection {
    fn get(&self, kind: AppearanceKind) -> &str {
        match kind {
            AppearanceKind::Theme => &self.theme,
            AppearanceKind::Cursor => &self.cursor,
            AppearanceKind::Wallpaper => &self.wallpaper,
        }
    }

    fn slot(&mut self, kind: AppearanceKind) -> &mut String {
        match kind {
            AppearanceKind::Theme => &mut self.theme,
            AppearanceKind::Cursor => &mut self.cursor,
            AppearanceKind::Wallpaper => &mut self.wallpaper,
        }
    }
}

/// Appearance catalogs plus the reactive current selection. Clones share state.
#[derive(Clone)]
pub struct AppearanceState {
    catalog: Rc<AppearanceConfig>,
    selection: RwSignal<AppearanceSelection>,
}

impl AppearanceState {
    /// State starting at the configured defaults.
    pub fn new(config: &AppearanceConfig) -> Self {
        Self {
            selection: create_rw_signal(AppearanceSelection {
                theme: config.default_theme.clone(),
                cursor: config.default_cursor.clone(),
                wallpaper: config.default_wallpaper.clone(),
            }),
            catalog: Rc::new(config.clone()),
        }
    }

    /// Reactive selection for the UI.
    pub fn selection(&self) -> ReadSignal<AppearanceSelection> {
        self.selection.read_only()
    }

    /// Current value of `kind`.
    pub fn current(&self, kind: AppearanceKind) -> String {
        self.selection
            .get_untracked()
            .get(kind)
            .to_string()
    }

    /// Allowed values of `kind`.
    pub fn options(&self, kind: AppearanceKind) -> &[String] {
        match kind {
            AppearanceKind::Theme => &self.catalog.themes,
            AppearanceKind::Cursor => &self.catalog.cursors,
            AppearanceKind::Wallpaper => &self.catalog.wallpapers,
        }
    }

    /// Catalog entry matching `value` case-insensitively.
    pub fn find(&self, kind: AppearanceKind, value: &str) -> Option<&str> {
        self.options(kind)
            .iter()
            .find(|option| option.eq_ignore_ascii_case(value))
            .map(String::as_str)
    }

    /// Selects `value` and returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns a usage error listing the catalog when `value` is not in it.
    pub fn set(&self, kind: AppearanceKind, value: &str) -> Result<String, CommandError> {
        let Some(value) = self.find(kind, value).map(str::to_string) else {
            return Err(CommandError::usage(format!(
                "Unknown {} '{value}'. Available: {}",
                kind.label(),
                self.options(kind).join(", ")
            )));
        };
        let mut previous = String::new();
        self.selection.update(|selection| {
            previous = std::mem::replace(selection.slot(kind), value);
        });
        Ok(previous)
    }

    /// Applies saved preferences. Unknown values and unreadable documents are skipped with a
    /// warning.
    pub async fn hydrate(&self, prefs: &dyn PrefsStore) {
        let saved = match load_appearance_prefs(prefs).await {
            Ok(saved) => saved,
            Err(err) => {
                logging::warn!("load appearance preferences failed: {err}");
                return;
            }
        };
        for kind in AppearanceKind::ALL {
            let Some(value) = saved.get(kind.pref_slot()) else {
                continue;
            };
            if let Err(err) = self.set(kind, value) {
                logging::warn!("ignoring saved {}: {err}", kind.label());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use portfolio_host::{AppearancePrefs, MemoryPrefsStore};
    use pretty_assertions::assert_eq;

    use super::*;

    fn state() -> AppearanceState {
        AppearanceState::new(&AppearanceConfig::default())
    }

    #[test]
    fn starts_at_configured_defaults() {
        let _ = leptos::create_runtime();
        let state = state();
        assert_eq!(state.current(AppearanceKind::Theme), "default");
        assert_eq!(state.current(AppearanceKind::Cursor), "block");
        assert_eq!(state.current(AppearanceKind::Wallpaper), "none");
    }

    #[test]
    fn set_returns_previous_and_normalizes_case() {
        let _ = leptos::create_runtime();
        let state = state();
        assert_eq!(state.set(AppearanceKind::Theme, "Dracula").expect("set"), "default");
        assert_eq!(state.set(AppearanceKind::Theme, "nord").expect("set"), "dracula");
        assert_eq!(state.selection().get_untracked().theme, "nord");
    }

    #[test]
    fn unknown_value_leaves_selection_unchanged() {
        let _ = leptos::create_runtime();
        let state = state();
        let err = state.set(AppearanceKind::Cursor, "beam").expect_err("unknown");
        assert_eq!(err.message, "Unknown cursor 'beam'. Available: block, underline, bar");
        assert_eq!(state.current(AppearanceKind::Cursor), "block");
    }

    #[test]
    fn hydrate_applies_known_values_and_skips_unknown() {
        let _ = leptos::create_runtime();
        let prefs = MemoryPrefsStore::with_prefs(&AppearancePrefs {
            theme: Some("matrix".to_string()),
            cursor: None,
            wallpaper: Some("lava".to_string()),
        });
        let state = state();
        block_on(state.hydrate(&prefs));
        assert_eq!(
            state.selection().get_untracked(),
            AppearanceSelection {
                theme: "matrix".to_string(),
                cursor: "block".to_string(),
                wallpaper: "none".to_string(),
            }
        );
    }

    #[test]
    fn hydrate_skips_a_malformed_document() {
        let _ = leptos::create_runtime();
        let prefs = MemoryPrefsStore::with_raw("not json");
        let state = state();
        block_on(state.hydrate(&prefs));
        assert_eq!(state.current(AppearanceKind::Theme), "default");
        assert_eq!(state.current(AppearanceKind::Cursor), "block");
    }

    #[test]
    fn effects_map_back_to_kinds() {
        let effect = AppearanceKind::Wallpaper.effect("stars");
        assert_eq!(
            AppearanceKind::from_effect(&effect),
            Some((AppearanceKind::Wallpaper, "stars"))
        );
        assert_eq!(AppearanceKind::from_effect(&Effect::SignedOut), None);
    }
}

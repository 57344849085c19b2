//! Command sets for the portfolio terminal and the host wiring around them.
//!
//! [`build_registry`] aggregates the core, portfolio, appearance, and account commands into one
//! registry. Everything a command touches (configuration, appearance and auth state, storage,
//! content, clock) arrives through a [`CommandContext`] owned by the host; there is no global
//! state.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod appearance;
pub mod bootstrap;
mod commands;
pub mod config;
pub mod effects;
pub mod render;

use std::{cell::OnceCell, rc::Rc};

use futures::future::LocalBoxFuture;
use portfolio_host::{
    unix_time_ms_now, AuthProvider, AuthSession, CachedContentSource, ContentSource, HistoryStore,
    MemoryAuthProvider, MemoryContentSource, MemoryHistoryStore, MemoryPrefsStore, PrefsStore,
};
use terminal_engine::{Clock, CommandRegistry, RegistryBuilder, RegistryError};

pub use appearance::{AppearanceKind, AppearanceSelection, AppearanceState};
pub use bootstrap::{
    build_terminal, persist_history, restore_terminal, submit_line, welcome_output,
};
pub use config::{ConfigError, TerminalConfig};
pub use effects::{drain_effects, run_effect, EffectDisposition};

/// Runs a detached local future, usually `leptos::spawn_local`.
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

/// Host-owned services and state shared by every command.
#[derive(Clone)]
pub struct CommandContext {
    /// Terminal configuration.
    pub config: Rc<TerminalConfig>,
    /// Current theme, cursor, and wallpaper.
    pub appearance: AppearanceState,
    /// Signed-in user.
    pub auth: AuthSession,
    /// External auth service.
    pub auth_provider: Rc<dyn AuthProvider>,
    /// Preference storage for appearance settings.
    pub prefs: Rc<dyn PrefsStore>,
    /// Durable history storage.
    pub history: Rc<dyn HistoryStore>,
    /// Portfolio content.
    pub content: Rc<dyn ContentSource>,
    /// Wall clock in unix milliseconds.
    pub clock: Clock,
    /// Executor for persistence work and async continuations.
    pub spawner: Spawner,
}

impl CommandContext {
    /// Context with in-memory collaborators, the system clock, and `leptos::spawn_local`.
    pub fn new(config: TerminalConfig) -> Self {
        Self {
            appearance: AppearanceState::new(&config.appearance),
            config: Rc::new(config),
            auth: AuthSession::default(),
            auth_provider: Rc::new(MemoryAuthProvider::default()),
            prefs: Rc::new(MemoryPrefsStore::default()),
            history: Rc::new(MemoryHistoryStore::default()),
            content: Rc::new(CachedContentSource::new(MemoryContentSource::default())),
            clock: Rc::new(unix_time_ms_now),
            spawner: Rc::new(|future: LocalBoxFuture<'static, ()>| leptos::spawn_local(future)),
        }
    }

    /// Replaces the preference store.
    pub fn with_prefs(mut self, prefs: Rc<dyn PrefsStore>) -> Self {
        self.prefs = prefs;
        self
    }

    /// Replaces the history store.
    pub fn with_history(mut self, history: Rc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    /// Replaces the content source.
    pub fn with_content(mut self, content: Rc<dyn ContentSource>) -> Self {
        self.content = content;
        self
    }

    /// Replaces the auth provider.
    pub fn with_auth_provider(mut self, provider: Rc<dyn AuthProvider>) -> Self {
        self.auth_provider = provider;
        self
    }

    /// Shares an existing auth session.
    pub fn with_auth(mut self, auth: AuthSession) -> Self {
        self.auth = auth;
        self
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the spawner.
    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = spawner;
        self
    }

    /// Runs `future` on the context spawner.
    pub fn spawn(&self, future: impl std::future::Future<Output = ()> + 'static) {
        (self.spawner)(Box::pin(future));
    }
}

/// Builds the full command registry for `ctx`.
///
/// # Errors
///
/// Returns the registry validation error if two command sets collide.
pub fn build_registry(ctx: &CommandContext) -> Result<CommandRegistry, RegistryError> {
    let catalog = Rc::new(OnceCell::new());
    let registry = RegistryBuilder::new()
        .extend(commands::builtin::descriptors(ctx, catalog.clone()))
        .extend(commands::content::descriptors(ctx))
        .extend(commands::appearance::descriptors(ctx))
        .extend(commands::account::descriptors(ctx))
        .build()?;
    // Filled once; help reads it lazily so the registry holds no reference to itself.
    let _ = catalog.set(registry.infos());
    Ok(registry)
}

//! Terminal construction, restore, and submission wiring.

use std::rc::Rc;

use leptos::logging;
use portfolio_host::{load_history_entries, save_history_entries, HistoryStore};
use terminal_contract::{CommandOutput, EntryId};
use terminal_engine::{Dispatcher, PersistRequest, RegistryError, SessionOptions, TerminalSession};

use crate::{build_registry, config::TerminalConfig, CommandContext};

/// Command name recorded for the boot banner.
pub const WELCOME_COMMAND: &str = "welcome";

/// Welcome banner shown at boot, by `welcome`, and after `clear`. Never persisted.
pub fn welcome_output(config: &TerminalConfig) -> CommandOutput {
    let welcome = &config.welcome;
    let mut lines = vec![welcome.title.clone()];
    if !welcome.tagline.is_empty() {
        lines.push(welcome.tagline.clone());
    }
    lines.extend(welcome.lines.iter().cloned());
    lines.push(String::new());
    lines.push("Type 'help' to see available commands.".to_string());
    CommandOutput::text(lines.join("\n")).without_history()
}

/// Builds a session over the full registry with history persistence routed to `ctx.history`.
///
/// # Errors
///
/// Returns the registry validation error if command sets collide.
pub fn build_terminal(ctx: &CommandContext) -> Result<TerminalSession, RegistryError> {
    let dispatcher = Dispatcher::new(build_registry(ctx)?);
    let options = SessionOptions::new(ctx.clock.clone())
        .with_max_entries(ctx.config.history.max_entries);
    let persist_ctx = ctx.clone();
    Ok(
        TerminalSession::new(dispatcher, options).with_persistence(Rc::new(
            move |request: PersistRequest| {
                let store = persist_ctx.history.clone();
                persist_ctx.spawn(async move {
                    if let Err(err) = persist_history(store.as_ref(), request).await {
                        logging::warn!("persist terminal history failed: {err}");
                    }
                });
            },
        )),
    )
}

/// Applies one persistence request to `store`.
///
/// # Errors
///
/// Returns the store error.
pub async fn persist_history(
    store: &dyn HistoryStore,
    request: PersistRequest,
) -> Result<(), String> {
    match request {
        PersistRequest::Save(entries) => save_history_entries(store, entries).await,
        PersistRequest::Clear => store.clear_history().await,
    }
}

/// Restores saved appearance and history into a fresh session.
///
/// Shows the welcome banner when there is no history to restore.
pub async fn restore_terminal(session: &TerminalSession, ctx: &CommandContext) {
    ctx.appearance.hydrate(ctx.prefs.as_ref()).await;
    let entries = match load_history_entries(ctx.history.as_ref()).await {
        Ok(entries) => entries,
        Err(err) => {
            logging::warn!("load terminal history failed: {err}");
            Vec::new()
        }
    };
    if entries.is_empty() {
        session.show(WELCOME_COMMAND, welcome_output(&ctx.config));
    } else {
        session.hydrate(entries);
    }
}

/// Submits `line` and runs any async continuation on the context spawner.
pub fn submit_line(
    session: &TerminalSession,
    ctx: &CommandContext,
    line: &str,
) -> Option<EntryId> {
    let submission = session.submit(line);
    if let Some(continuation) = submission.continuation {
        ctx.spawn(continuation.run());
    }
    submission.entry_id
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use terminal_contract::{EntryStatus, HistoryEntry};

    use super::*;
    use crate::{appearance::AppearanceKind, test_support::Fixture};

    fn commands(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.command.as_str()).collect()
    }

    #[test]
    fn welcome_lists_config_lines_and_help_hint() {
        let mut config = TerminalConfig::default();
        config.welcome.lines = vec!["Built with Rust.".to_string()];
        let output = welcome_output(&config);
        assert_eq!(
            output.content,
            "Welcome to my terminal portfolio.\nExplore my work from the command line.\n\
             Built with Rust.\n\nType 'help' to see available commands."
        );
        assert!(output.no_history);
    }

    #[test]
    fn fresh_terminal_shows_welcome_only() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        let session = build_terminal(&fixture.ctx).expect("terminal");
        block_on(restore_terminal(&session, &fixture.ctx));
        let entries = session.entries_snapshot();
        assert_eq!(commands(&entries), vec![WELCOME_COMMAND]);
        assert_eq!(fixture.flush(), 0);
        assert!(fixture.history.snapshot().is_none());
    }

    #[test]
    fn async_submission_resolves_in_place_and_persists() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        let session = build_terminal(&fixture.ctx).expect("terminal");
        let about = submit_line(&session, &fixture.ctx, "about").expect("entry");
        submit_line(&session, &fixture.ctx, "echo hi");

        let entries = session.entries_snapshot();
        assert_eq!(entries[0].id, about);
        assert_eq!(entries[0].status, EntryStatus::Pending);
        assert_eq!(entries[0].output.content, "Loading profile...");

        fixture.flush();
        let entries = session.entries_snapshot();
        assert_eq!(commands(&entries), vec!["about", "echo hi"]);
        assert_eq!(entries[0].status, EntryStatus::Resolved);
        assert!(entries[0].output.content.starts_with("Alex Rivera"));

        let persisted = fixture.history.snapshot().expect("saved").entries;
        assert_eq!(commands(&persisted), vec!["about", "echo hi"]);
    }

    #[test]
    fn clear_wipes_persisted_history_and_replays_welcome() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        let session = build_terminal(&fixture.ctx).expect("terminal");
        submit_line(&session, &fixture.ctx, "echo one");
        fixture.flush();
        assert!(fixture.history.snapshot().is_some());

        submit_line(&session, &fixture.ctx, "cls");
        fixture.flush();
        assert!(fixture.history.snapshot().is_none());
        let entries = session.entries_snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].output, welcome_output(&fixture.ctx.config));
    }

    #[test]
    fn restore_replays_history_and_appearance() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        let first = build_terminal(&fixture.ctx).expect("terminal");
        submit_line(&first, &fixture.ctx, "theme solarized");
        submit_line(&first, &fixture.ctx, "echo kept");
        block_on(crate::drain_effects(&first, &fixture.ctx));
        fixture.flush();

        let reopened = Fixture::new();
        let ctx = reopened
            .ctx
            .clone()
            .with_prefs(Rc::new(fixture.prefs.clone()))
            .with_history(Rc::new(fixture.history.clone()));
        let second = build_terminal(&ctx).expect("terminal");
        block_on(restore_terminal(&second, &ctx));

        assert_eq!(ctx.appearance.current(AppearanceKind::Theme), "solarized");
        let entries = second.entries_snapshot();
        assert_eq!(commands(&entries), vec!["theme solarized", "echo kept"]);
        let next = submit_line(&second, &ctx, "echo next").expect("entry");
        assert!(next.0 > entries[1].id.0);
    }

    #[test]
    fn history_limit_comes_from_config() {
        let _ = leptos::create_runtime();
        let mut config = TerminalConfig::default();
        config.history.max_entries = 2;
        let fixture = Fixture::with_config(config);
        let session = build_terminal(&fixture.ctx).expect("terminal");
        for word in ["a", "b", "c"] {
            submit_line(&session, &fixture.ctx, &format!("echo {word}"));
        }
        fixture.flush();
        assert_eq!(
            commands(&session.entries_snapshot()),
            vec!["echo b", "echo c"]
        );
        let persisted = fixture.history.snapshot().expect("saved").entries;
        assert_eq!(persisted.len(), 2);
    }
}

//! Reactive terminal session: the history model that consumes command results.
//!
//! The session appends one history entry per submitted line, reconciles pending entries by id
//! once their resolver finishes, interprets clear-with-replay, keeps `no_history` output out of
//! persistence, and queues effects for the host.

use std::{cell::Cell, fmt, rc::Rc};

use leptos::{
    create_rw_signal, logging, spawn_local, ReadSignal, RwSignal, SignalGetUntracked, SignalSet,
    SignalUpdate, SignalWithUntracked,
};
use terminal_contract::{
    AsyncResolver, CommandOutput, CommandResult, Effect, EntryId, EntryStatus, HistoryEntry,
};

use crate::{continuation::resolve_pending, dispatch::Dispatcher, registry::Resolution};

/// Default number of history entries kept in a session.
pub const DEFAULT_MAX_ENTRIES: usize = 200;

/// Source of unix-millisecond timestamps.
pub type Clock = Rc<dyn Fn() -> u64>;

/// Receiver of history persistence requests. The host performs the actual storage work.
pub type PersistHook = Rc<dyn Fn(PersistRequest)>;

/// Durable-history change requested by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistRequest {
    /// Replace persisted history with these entries.
    Save(Vec<HistoryEntry>),
    /// Remove all persisted history.
    Clear,
}

/// Session construction options.
#[derive(Clone)]
pub struct SessionOptions {
    /// Maximum number of history entries kept; oldest entries are dropped first.
    pub max_entries: usize,
    /// Timestamp source for new entries.
    pub clock: Clock,
}

impl SessionOptions {
    /// Options with [`DEFAULT_MAX_ENTRIES`] and the given clock.
    pub fn new(clock: Clock) -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            clock,
        }
    }

    /// Overrides the history limit. Zero is treated as one.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }
}

#[derive(Clone)]
struct SessionState {
    entries: RwSignal<Vec<HistoryEntry>>,
    in_flight: RwSignal<usize>,
    effects: RwSignal<Vec<Effect>>,
    next_entry_id: Rc<Cell<u64>>,
    max_entries: usize,
    clock: Clock,
    persist: Option<PersistHook>,
}

impl SessionState {
    fn next_entry_id(&self) -> EntryId {
        let next = self.next_entry_id.get().saturating_add(1);
        self.next_entry_id.set(next);
        EntryId(next)
    }

    fn request(&self, request: PersistRequest) {
        if let Some(persist) = &self.persist {
            persist(request);
        }
    }

    fn push(&self, command: &str, output: CommandOutput, status: EntryStatus) -> EntryId {
        let id = self.next_entry_id();
        let entry = HistoryEntry {
            id,
            command: command.to_string(),
            output,
            status,
            timestamp_ms: (self.clock)(),
        };
        let max_entries = self.max_entries;
        self.entries.update(|entries| {
            entries.push(entry);
            if entries.len() > max_entries {
                let overflow = entries.len() - max_entries;
                entries.drain(0..overflow);
            }
        });
        id
    }

    fn complete(
        &self,
        command: &str,
        output: CommandOutput,
        status: EntryStatus,
    ) -> Option<EntryId> {
        if output.is_clear_signal() {
            return self.clear_and_replay(command, output);
        }
        let effects = output.effects.clone();
        let persistable = !output.no_history;
        let id = self.push(command, output, status);
        self.queue_effects(effects);
        if persistable {
            self.save();
        }
        Some(id)
    }

    fn clear_and_replay(&self, command: &str, output: CommandOutput) -> Option<EntryId> {
        self.entries.set(Vec::new());
        self.request(PersistRequest::Clear);
        self.queue_effects(output.effects);
        let replay = *output.run_after_clear?;
        if replay.is_clear_signal() {
            return None;
        }
        self.complete(command, replay, EntryStatus::Complete)
    }

    fn queue_effects(&self, effects: Vec<Effect>) {
        if !effects.is_empty() {
            self.effects.update(|queue| queue.extend(effects));
        }
    }

    fn save(&self) {
        if self.persist.is_some() {
            self.request(PersistRequest::Save(self.persistable_entries()));
        }
    }

    fn persistable_entries(&self) -> Vec<HistoryEntry> {
        self.entries.with_untracked(|entries| {
            entries
                .iter()
                .filter(|entry| {
                    entry.status.is_settled()
                        && !entry.output.no_history
                        && !entry.output.is_clear_signal()
                })
                .cloned()
                .collect()
        })
    }
}

/// Result of submitting one line.
pub struct Submission {
    /// History slot created for the line; `None` when a bare clear left nothing to show.
    pub entry_id: Option<EntryId>,
    /// Resolver work for an async command, to be run by the host.
    pub continuation: Option<Continuation>,
}

/// Pending resolver bound to the history slot it will fill.
pub struct Continuation {
    entry_id: EntryId,
    resolver: AsyncResolver,
    state: SessionState,
}

impl Continuation {
    /// Slot this continuation reconciles into.
    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    /// Runs the resolver and replaces the pending entry with the final output.
    ///
    /// The entry is located by id, so concurrently pending commands may finish in any order. An
    /// entry removed in the meantime (for example by `clear`) is not resurrected.
    pub async fn run(self) {
        let Self {
            entry_id,
            resolver,
            state,
        } = self;
        let output = resolve_pending(resolver).await;
        state.in_flight.update(|count| *count = count.saturating_sub(1));

        let command = state.entries.with_untracked(|entries| {
            entries
                .iter()
                .find(|entry| entry.id == entry_id)
                .map(|entry| entry.command.clone())
        });
        let Some(command) = command else {
            logging::warn!(
                "dropping resolution for history entry {}: entry no longer exists",
                entry_id.0
            );
            return;
        };

        if output.is_clear_signal() {
            state.clear_and_replay(&command, output);
            return;
        }

        let status = if output.is_error {
            EntryStatus::Errored
        } else {
            EntryStatus::Resolved
        };
        let effects = output.effects.clone();
        let persistable = !output.no_history;
        state.entries.update(|entries| {
            if let Some(entry) = entries.iter_mut().find(|entry| entry.id == entry_id) {
                entry.output = output;
                entry.status = status;
            }
        });
        state.queue_effects(effects);
        if persistable {
            state.save();
        }
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("entry_id", &self.entry_id)
            .finish_non_exhaustive()
    }
}

/// One terminal's history plus the dispatcher it submits to.
#[derive(Clone)]
pub struct TerminalSession {
    dispatcher: Dispatcher,
    state: SessionState,
}

impl TerminalSession {
    /// Creates an empty session.
    pub fn new(dispatcher: Dispatcher, options: SessionOptions) -> Self {
        Self {
            dispatcher,
            state: SessionState {
                entries: create_rw_signal(Vec::new()),
                in_flight: create_rw_signal(0),
                effects: create_rw_signal(Vec::new()),
                next_entry_id: Rc::new(Cell::new(0)),
                max_entries: options.max_entries.max(1),
                clock: options.clock,
                persist: None,
            },
        }
    }

    /// Routes persistence requests to `hook`.
    pub fn with_persistence(mut self, hook: PersistHook) -> Self {
        self.state.persist = Some(hook);
        self
    }

    /// Dispatcher used by [`TerminalSession::submit`].
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Reactive history entries in display order.
    pub fn entries(&self) -> ReadSignal<Vec<HistoryEntry>> {
        self.state.entries.read_only()
    }

    /// Current history entries.
    pub fn entries_snapshot(&self) -> Vec<HistoryEntry> {
        self.state.entries.get_untracked()
    }

    /// Reactive count of unresolved async commands.
    pub fn in_flight(&self) -> ReadSignal<usize> {
        self.state.in_flight.read_only()
    }

    /// Reactive queue of effects not yet taken by the host.
    pub fn effects(&self) -> ReadSignal<Vec<Effect>> {
        self.state.effects.read_only()
    }

    /// Drains queued effects in the order they were produced.
    pub fn take_effects(&self) -> Vec<Effect> {
        let mut drained = Vec::new();
        self.state
            .effects
            .update(|queue| drained = std::mem::take(queue));
        drained
    }

    /// Entries eligible for durable storage: settled, not `no_history`, not clear signals.
    pub fn persistable_entries(&self) -> Vec<HistoryEntry> {
        self.state.persistable_entries()
    }

    /// Tab-completion candidates for a command-name prefix.
    pub fn completions(&self, prefix: &str) -> Vec<String> {
        self.dispatcher.registry().completions(prefix)
    }

    /// Replaces history with previously persisted entries.
    ///
    /// Pending entries are skipped, only the newest `max_entries` are kept, and new entry ids
    /// continue after the highest restored id.
    pub fn hydrate(&self, entries: Vec<HistoryEntry>) {
        let mut restored = entries
            .into_iter()
            .filter(|entry| entry.status.is_settled())
            .collect::<Vec<_>>();
        if restored.len() > self.state.max_entries {
            let overflow = restored.len() - self.state.max_entries;
            restored.drain(0..overflow);
        }
        let highest = restored.iter().map(|entry| entry.id.0).max().unwrap_or(0);
        if highest > self.state.next_entry_id.get() {
            self.state.next_entry_id.set(highest);
        }
        self.state.entries.set(restored);
    }

    /// Appends an output that did not come from the dispatcher, such as a boot banner.
    pub fn show(&self, command: &str, output: CommandOutput) -> Option<EntryId> {
        self.state.complete(command, output, EntryStatus::Complete)
    }

    /// Dispatches one line synchronously and records its entry.
    ///
    /// Async commands get a pending entry immediately, in submission order; the returned
    /// [`Continuation`] fills it in later.
    pub fn submit(&self, line: &str) -> Submission {
        let dispatch = self.dispatcher.dispatch(line);
        let command = line.trim();
        match dispatch.result {
            CommandResult::Ready(output) => {
                let status = if dispatch.resolution == Resolution::NotFound {
                    EntryStatus::NotFound
                } else {
                    EntryStatus::Complete
                };
                Submission {
                    entry_id: self.state.complete(command, output, status),
                    continuation: None,
                }
            }
            CommandResult::Pending { interim, resolver } => {
                let entry_id = self.state.push(command, interim, EntryStatus::Pending);
                self.state.in_flight.update(|count| *count += 1);
                Submission {
                    entry_id: Some(entry_id),
                    continuation: Some(Continuation {
                        entry_id,
                        resolver,
                        state: self.state.clone(),
                    }),
                }
            }
        }
    }

    /// Submits `line` and spawns its continuation on the local executor.
    pub fn submit_and_spawn(&self, line: &str) -> Option<EntryId> {
        let submission = self.submit(line);
        if let Some(continuation) = submission.continuation {
            spawn_local(continuation.run());
        }
        submission.entry_id
    }
}

//! Shared command contracts used by the terminal engine, the portfolio command sets, and the
//! terminal UI.
//!
//! This crate is intentionally runtime-agnostic. It defines serializable command metadata,
//! command outputs, side-effect intents, and history entries without depending on Leptos,
//! browser APIs, or storage adapters.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{collections::BTreeMap, fmt, future::Future};

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content sentinel that marks a clear-with-replay output.
pub const CLEAR_TERMINAL_SENTINEL: &str = "CLEAR_TERMINAL";

/// Grouping used by help listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandCategory {
    /// Terminal housekeeping such as `help` and `clear`.
    Core,
    /// Portfolio content commands.
    Portfolio,
    /// Theme, cursor, and wallpaper preferences.
    Appearance,
    /// Sign-in and session commands.
    Account,
}

impl CommandCategory {
    /// Heading rendered in help output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Core => "Terminal",
            Self::Portfolio => "Portfolio",
            Self::Appearance => "Appearance",
            Self::Account => "Account",
        }
    }

    /// All categories in help display order.
    pub fn all() -> &'static [CommandCategory] {
        &[
            CommandCategory::Core,
            CommandCategory::Portfolio,
            CommandCategory::Appearance,
            CommandCategory::Account,
        ]
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Visibility policy for registered commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandVisibility {
    /// Command is listed in help and completion.
    Public,
    /// Command is callable but omitted from normal listings.
    Hidden,
}

/// Static registration metadata for one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInfo {
    /// Primary command name, matched case-insensitively.
    pub name: String,
    /// One-line description shown in help.
    pub description: String,
    /// Optional usage hint such as `theme [list|set <name>]`.
    pub usage: Option<String>,
    /// Alternate names resolving to this command.
    pub aliases: Vec<String>,
    /// Help grouping.
    pub category: CommandCategory,
    /// Visibility policy.
    pub visibility: CommandVisibility,
}

impl CommandInfo {
    /// Creates public core-category metadata with no usage or aliases.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            usage: None,
            aliases: Vec::new(),
            category: CommandCategory::Core,
            visibility: CommandVisibility::Public,
        }
    }

    /// Usage hint, falling back to the bare name.
    pub fn usage_or_name(&self) -> &str {
        self.usage.as_deref().unwrap_or(&self.name)
    }

    /// Returns whether the command appears in listings.
    pub fn is_public(&self) -> bool {
        self.visibility == CommandVisibility::Public
    }
}

/// Auxiliary metadata value attached to a command output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// JSON `null`.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer number.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Text value.
    Text(String),
    /// List of text values.
    TextList(Vec<String>),
    /// List of numbers.
    NumberList(Vec<f64>),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(value: Vec<String>) -> Self {
        Self::TextList(value)
    }
}

impl<T: Into<MetadataValue>> From<Option<T>> for MetadataValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Modal dialogs the UI host can be asked to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModalKind {
    /// Sign-in dialog of the external auth provider.
    SignIn,
    /// Account creation dialog of the external auth provider.
    SignUp,
}

/// Side-effect intent returned by a command for the host to interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Effect {
    /// Open a modal dialog.
    OpenModal {
        /// Dialog to open.
        modal: ModalKind,
    },
    /// Navigate to an external URL.
    Navigate {
        /// Absolute target URL.
        url: String,
    },
    /// Apply a color theme.
    ApplyTheme {
        /// Theme id.
        theme: String,
    },
    /// Apply a cursor style.
    ApplyCursor {
        /// Cursor style id.
        cursor: String,
    },
    /// Apply a wallpaper.
    ApplyWallpaper {
        /// Wallpaper id.
        wallpaper: String,
    },
    /// The auth session ended.
    SignedOut,
}

/// Terminal (non-pending) payload produced by a command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Text or markup to display.
    pub content: String,
    /// Whether this output represents a failure.
    pub is_error: bool,
    /// Whether `content` is markup rather than escaped text.
    #[serde(default)]
    pub raw_html: bool,
    /// Wipe prior output before showing `run_after_clear`.
    #[serde(default)]
    pub clear_history: bool,
    /// Output displayed immediately after a clear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_after_clear: Option<Box<CommandOutput>>,
    /// Render, but never persist to durable history.
    #[serde(default)]
    pub no_history: bool,
    /// Auxiliary data for collaborators, unused by dispatch.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, MetadataValue>,
    /// Side-effect intents for the host.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

impl CommandOutput {
    /// Plain-text success output.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Markup success output.
    pub fn html(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            raw_html: true,
            ..Self::default()
        }
    }

    /// Plain-text error output.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
            ..Self::default()
        }
    }

    /// Clear-with-replay output that shows `after` once history has been wiped.
    pub fn clear_then(after: CommandOutput) -> Self {
        Self {
            content: CLEAR_TERMINAL_SENTINEL.to_string(),
            clear_history: true,
            run_after_clear: Some(Box::new(after)),
            no_history: true,
            ..Self::default()
        }
    }

    /// Marks the output as display-only.
    pub fn without_history(mut self) -> Self {
        self.no_history = true;
        self
    }

    /// Adds one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Appends a side-effect intent.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Returns whether the host must wipe history before rendering.
    pub fn is_clear_signal(&self) -> bool {
        self.clear_history || self.content == CLEAR_TERMINAL_SENTINEL
    }
}

impl From<CommandError> for CommandOutput {
    fn from(error: CommandError) -> Self {
        Self::error(error.message)
    }
}

/// Deferred producer of a command's final output.
pub type AsyncResolver =
    Box<dyn FnOnce() -> LocalBoxFuture<'static, Result<CommandOutput, CommandError>>>;

/// Value returned by every command.
///
/// A result is either complete or pending; a pending result always carries its resolver, and the
/// resolver can only produce a complete [`CommandOutput`].
pub enum CommandResult {
    /// Final output.
    Ready(CommandOutput),
    /// Interim output shown while `resolver` runs.
    Pending {
        /// Loading-state output.
        interim: CommandOutput,
        /// Producer of the final output.
        resolver: AsyncResolver,
    },
}

impl CommandResult {
    /// Complete plain-text success result.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Ready(CommandOutput::text(content))
    }

    /// Complete plain-text error result.
    pub fn error(content: impl Into<String>) -> Self {
        Self::Ready(CommandOutput::error(content))
    }

    /// Pending result that shows `interim` until `future` completes.
    pub fn pending<F>(interim: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = Result<CommandOutput, CommandError>> + 'static,
    {
        Self::Pending {
            interim: CommandOutput::text(interim),
            resolver: Box::new(move || future.boxed_local()),
        }
    }

    /// Mirrors the `isAsync` flag of the host contract.
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// The final output, or the interim output of a pending result.
    pub fn output(&self) -> &CommandOutput {
        match self {
            Self::Ready(output) => output,
            Self::Pending { interim, .. } => interim,
        }
    }

    /// Shorthand for `self.output().is_error`.
    pub fn is_error(&self) -> bool {
        self.output().is_error
    }

    /// Returns the final output when the result is not pending.
    pub fn into_ready(self) -> Option<CommandOutput> {
        match self {
            Self::Ready(output) => Some(output),
            Self::Pending { .. } => None,
        }
    }
}

impl From<CommandOutput> for CommandResult {
    fn from(output: CommandOutput) -> Self {
        Self::Ready(output)
    }
}

impl fmt::Debug for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(output) => f.debug_tuple("Ready").field(output).finish(),
            Self::Pending { interim, .. } => f
                .debug_struct("Pending")
                .field("interim", interim)
                .finish_non_exhaustive(),
        }
    }
}

/// Structured command error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandErrorCode {
    /// User input violated command usage.
    Usage,
    /// The requested item was not found.
    NotFound,
    /// A collaborator is unavailable.
    Unavailable,
    /// The caller lacks permission to perform the action.
    PermissionDenied,
    /// Internal command failure.
    Internal,
}

/// Error returned by command handlers and async resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct CommandError {
    /// Error category.
    pub code: CommandErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl CommandError {
    /// Creates a new command error.
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(CommandErrorCode::Usage, message)
    }

    /// Not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CommandErrorCode::NotFound, message)
    }

    /// Unavailable-collaborator error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(CommandErrorCode::Unavailable, message)
    }

    /// Permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(CommandErrorCode::PermissionDenied, message)
    }
}

/// Identifier of one history slot within a terminal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

/// Terminal lifecycle state recorded for a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    /// Synchronous command completed.
    Complete,
    /// No command or alias matched.
    NotFound,
    /// Async resolver still running.
    Pending,
    /// Async resolver produced its output.
    Resolved,
    /// Async resolver failed.
    Errored,
}

impl EntryStatus {
    /// Returns whether the entry has reached a terminal state.
    pub fn is_settled(self) -> bool {
        self != Self::Pending
    }
}

/// One row of terminal history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Slot identifier.
    pub id: EntryId,
    /// Raw command line as typed.
    pub command: String,
    /// Output shown for the command.
    pub output: CommandOutput,
    /// Lifecycle state.
    pub status: EntryStatus,
    /// Submission time in unix milliseconds.
    pub timestamp_ms: u64,
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn clear_then_is_a_clear_signal_carrying_the_replay() {
        let output = CommandOutput::clear_then(CommandOutput::text("welcome"));
        assert!(output.is_clear_signal());
        assert!(output.no_history);
        assert_eq!(
            output.run_after_clear.as_deref(),
            Some(&CommandOutput::text("welcome"))
        );
    }

    #[test]
    fn sentinel_content_alone_is_a_clear_signal() {
        let output = CommandOutput::text(CLEAR_TERMINAL_SENTINEL);
        assert!(output.is_clear_signal());
        assert!(!CommandOutput::text("clear").is_clear_signal());
    }

    #[test]
    fn effects_serialize_with_kind_tag() {
        let value = serde_json::to_value(Effect::OpenModal {
            modal: ModalKind::SignIn,
        })
        .expect("serialize");
        assert_eq!(value, json!({ "kind": "open-modal", "modal": "sign-in" }));
    }

    #[test]
    fn metadata_serializes_as_plain_json() {
        let output = CommandOutput::text("ok")
            .with_metadata("previous", "dark")
            .with_metadata("current", None::<String>)
            .with_metadata("count", 3_i64);
        let value = serde_json::to_value(&output).expect("serialize");
        assert_eq!(
            value["metadata"],
            json!({ "count": 3, "current": null, "previous": "dark" })
        );
    }

    #[test]
    fn pending_result_exposes_interim_and_resolves() {
        let result = CommandResult::pending("Loading...", async {
            Ok(CommandOutput::text("done"))
        });
        assert!(result.is_async());
        assert_eq!(result.output().content, "Loading...");
        let CommandResult::Pending { resolver, .. } = result else {
            panic!("expected pending result");
        };
        assert_eq!(block_on(resolver()), Ok(CommandOutput::text("done")));
    }

    #[test]
    fn command_error_maps_to_error_output() {
        let output = CommandOutput::from(CommandError::usage("usage: echo <text>"));
        assert!(output.is_error);
        assert_eq!(output.content, "usage: echo <text>");
        assert_eq!(CommandError::not_found("x").code, CommandErrorCode::NotFound);
    }
}

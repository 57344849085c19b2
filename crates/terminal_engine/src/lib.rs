//! Browser-native command engine for the portfolio terminal.
//!
//! Commands are registered once into a [`CommandRegistry`], resolved and executed by a
//! [`Dispatcher`], and recorded by a [`TerminalSession`] that reconciles async results into the
//! history slot reserved when the command was submitted.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod continuation;
mod dispatch;
mod registry;
mod session;

pub use continuation::{resolve_pending, settle};
pub use dispatch::{
    not_found_message, parse_line, Dispatch, Dispatcher, ParsedLine, EMPTY_INPUT_HINT,
};
pub use registry::{
    CommandDescriptor, CommandRegistry, ExecuteFn, RegistryBuilder, RegistryError, Resolution,
};
pub use session::{
    Clock, Continuation, PersistHook, PersistRequest, SessionOptions, Submission, TerminalSession,
    DEFAULT_MAX_ENTRIES,
};

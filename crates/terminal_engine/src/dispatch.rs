//! Raw input resolution and fault-contained command execution.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

use leptos::logging;
use terminal_contract::{CommandOutput, CommandResult};

use crate::registry::{CommandDescriptor, CommandRegistry, Resolution};

/// Hint returned for empty input.
pub const EMPTY_INPUT_HINT: &str = "Type 'help' to see available commands.";

/// First token and argument string of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Lowercased command name used for lookup.
    pub name: String,
    /// Command token exactly as typed.
    pub token: String,
    /// Remaining tokens joined by single spaces.
    pub args: String,
}

/// Splits `raw` into command name and argument string. Returns `None` for blank input.
pub fn parse_line(raw: &str) -> Option<ParsedLine> {
    let mut tokens = raw.split_whitespace();
    let token = tokens.next()?;
    Some(ParsedLine {
        name: token.to_lowercase(),
        token: token.to_string(),
        args: tokens.collect::<Vec<_>>().join(" "),
    })
}

/// Error text for input whose first token matches nothing.
pub fn not_found_message(token: &str) -> String {
    format!("Command not found: {token}. Type 'help' to see available commands.")
}

/// Outcome of one dispatch, kept for hosts that record the lifecycle.
#[derive(Debug)]
pub struct Dispatch {
    /// Parsed input, absent for blank lines.
    pub line: Option<ParsedLine>,
    /// How the command name was resolved.
    pub resolution: Resolution,
    /// Command result.
    pub result: CommandResult,
}

/// Resolves input lines against a registry and runs the matched command.
#[derive(Clone)]
pub struct Dispatcher {
    registry: CommandRegistry,
}

impl Dispatcher {
    /// Creates a dispatcher over a built registry.
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry }
    }

    /// Returns the registry this dispatcher resolves against.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Resolves and executes one input line. Never panics outward.
    pub fn process_command(&self, raw: &str) -> CommandResult {
        self.dispatch(raw).result
    }

    /// Like [`Dispatcher::process_command`], also reporting the parsed line and resolution.
    pub fn dispatch(&self, raw: &str) -> Dispatch {
        let Some(line) = parse_line(raw) else {
            return Dispatch {
                line: None,
                resolution: Resolution::Empty,
                result: CommandResult::Ready(CommandOutput::text(EMPTY_INPUT_HINT).without_history()),
            };
        };

        let Some((resolution, descriptor)) = self.registry.lookup(&line.name) else {
            return Dispatch {
                result: CommandResult::error(not_found_message(&line.token)),
                resolution: Resolution::NotFound,
                line: Some(line),
            };
        };

        let result = execute_guarded(descriptor, &line.args);
        Dispatch {
            line: Some(line),
            resolution,
            result,
        }
    }
}

fn execute_guarded(descriptor: &CommandDescriptor, args: &str) -> CommandResult {
    let name = descriptor.name();
    match panic::catch_unwind(AssertUnwindSafe(|| descriptor.execute(args))) {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            logging::warn!("command `{name}` failed: {err}");
            CommandResult::error(format!("Error executing '{name}': {err}"))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            logging::warn!("command `{name}` panicked: {message}");
            CommandResult::error(format!("Error executing '{name}': {message}"))
        }
    }
}

/// Extracts the message of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use terminal_contract::{CommandError, CommandResult};

    use super::*;
    use crate::registry::RegistryBuilder;

    fn dispatcher() -> Dispatcher {
        let registry = RegistryBuilder::new()
            .register(
                CommandDescriptor::new("help", "List commands.", |_| {
                    Ok(CommandResult::text("Available commands: echo, help"))
                })
                .alias("?"),
            )
            .register(CommandDescriptor::new("echo", "Print arguments.", |args| {
                Ok(CommandResult::text(args))
            }))
            .register(CommandDescriptor::new("fail", "Always panics.", |_| {
                panic!("boom")
            }))
            .register(CommandDescriptor::new("refuse", "Always errors.", |_| {
                Err(CommandError::usage("boom"))
            }))
            .register(CommandDescriptor::new("foo", "Primary foo.", |_| {
                Ok(CommandResult::text("A"))
            }))
            .register(
                CommandDescriptor::new("bar", "Claims foo as alias.", |_| {
                    Ok(CommandResult::text("B"))
                })
                .alias("foo")
                .alias("baz"),
            )
            .build()
            .expect("build");
        Dispatcher::new(registry)
    }

    fn ready(result: CommandResult) -> CommandOutput {
        result.into_ready().expect("ready result")
    }

    #[test]
    fn command_names_are_case_and_padding_insensitive() {
        let dispatcher = dispatcher();
        let lower = ready(dispatcher.process_command("help"));
        assert!(!lower.is_error);
        assert_eq!(ready(dispatcher.process_command("HELP")), lower);
        assert_eq!(ready(dispatcher.process_command("  help  ")), lower);
    }

    #[test]
    fn unknown_command_reports_the_token_verbatim() {
        let output = ready(dispatcher().process_command("Frobnicate now"));
        assert!(output.is_error);
        assert_eq!(
            output.content,
            "Command not found: Frobnicate. Type 'help' to see available commands."
        );
    }

    #[test]
    fn exact_name_takes_precedence_over_alias() {
        let dispatch = dispatcher().dispatch("foo");
        assert_eq!(dispatch.resolution, Resolution::Exact);
        assert_eq!(ready(dispatch.result).content, "A");
    }

    #[test]
    fn alias_resolves_when_no_exact_name_matches() {
        let dispatch = dispatcher().dispatch("BAZ");
        assert_eq!(
            dispatch.resolution,
            Resolution::Alias {
                alias: "baz".to_string()
            }
        );
        assert_eq!(ready(dispatch.result).content, "B");
    }

    #[test]
    fn panicking_command_is_contained() {
        let output = ready(dispatcher().process_command("fail"));
        assert!(output.is_error);
        assert!(output.content.contains("boom"));
    }

    #[test]
    fn erroring_command_is_contained() {
        let output = ready(dispatcher().process_command("refuse"));
        assert!(output.is_error);
        assert_eq!(output.content, "Error executing 'refuse': boom");
    }

    #[test]
    fn empty_input_is_a_hint_not_an_error() {
        let dispatcher = dispatcher();
        for raw in ["", "   "] {
            let dispatch = dispatcher.dispatch(raw);
            assert_eq!(dispatch.resolution, Resolution::Empty);
            let output = ready(dispatch.result);
            assert!(!output.is_error);
            assert_eq!(output.content, EMPTY_INPUT_HINT);
        }
    }

    #[test]
    fn echo_receives_args_joined_by_single_spaces() {
        let output = ready(dispatcher().process_command("echo   hello    world"));
        assert_eq!(output, CommandOutput::text("hello world"));
    }

    #[test]
    fn dispatch_is_deterministic() {
        let dispatcher = dispatcher();
        assert_eq!(
            ready(dispatcher.process_command("echo a b")),
            ready(dispatcher.process_command("echo a b"))
        );
    }
}

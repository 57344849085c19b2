//! Built-in command sets, one module per feature area.

use terminal_args::ParsedArgs;
use terminal_contract::CommandError;

pub(crate) mod account;
pub(crate) mod appearance;
pub(crate) mod builtin;
pub(crate) mod content;

fn parse_args(args: &str) -> Result<ParsedArgs, CommandError> {
    ParsedArgs::parse(args).map_err(|err| CommandError::usage(err.message))
}

fn unavailable(what: &str, err: String) -> CommandError {
    CommandError::unavailable(format!("could not load {what}: {err}"))
}

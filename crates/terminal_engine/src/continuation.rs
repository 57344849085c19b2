//! Drives pending command results to their final output.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use leptos::logging;
use terminal_contract::{AsyncResolver, CommandOutput, CommandResult};

use crate::dispatch::panic_message;

/// Runs `resolver` to completion. Resolver errors and panics become error outputs.
pub async fn resolve_pending(resolver: AsyncResolver) -> CommandOutput {
    let outcome = AssertUnwindSafe(async move { resolver().await })
        .catch_unwind()
        .await;
    match outcome {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            logging::warn!("async command failed: {err}");
            CommandOutput::error(format!("Async command failed: {err}"))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            logging::warn!("async command panicked: {message}");
            CommandOutput::error(format!("Async command failed: {message}"))
        }
    }
}

/// Returns the final output of any result, resolving pending ones.
pub async fn settle(result: CommandResult) -> CommandOutput {
    match result {
        CommandResult::Ready(output) => output,
        CommandResult::Pending { resolver, .. } => resolve_pending(resolver).await,
    }
}

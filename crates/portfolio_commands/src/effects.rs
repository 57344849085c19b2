//! Host-side effect executor.
//!
//! Appearance effects are persisted here. Navigation, modals, and sign-out are UI concerns and
//! are forwarded to the caller in the order they were produced.

use std::rc::Rc;

use leptos::{create_effect, logging, SignalWith};
use portfolio_host::save_appearance_pref;
use terminal_contract::Effect;
use terminal_engine::TerminalSession;

use crate::{appearance::AppearanceKind, CommandContext};

/// What the executor did with one effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectDisposition {
    /// Fully handled by the host.
    Handled,
    /// Needs the UI layer.
    Forward,
}

/// Runs one effect against the context services.
pub async fn run_effect(ctx: &CommandContext, effect: &Effect) -> EffectDisposition {
    let Some((kind, value)) = AppearanceKind::from_effect(effect) else {
        return EffectDisposition::Forward;
    };
    if let Err(err) = save_appearance_pref(ctx.prefs.as_ref(), kind.pref_slot(), &value).await {
        logging::warn!("persist {} failed: {err}", kind.label());
    }
    EffectDisposition::Handled
}

/// Takes every queued effect from `session`, runs it, and returns the ones for the UI.
pub async fn drain_effects(session: &TerminalSession, ctx: &CommandContext) -> Vec<Effect> {
    let mut forwarded = Vec::new();
    for effect in session.take_effects() {
        if run_effect(ctx, &effect).await == EffectDisposition::Forward {
            forwarded.push(effect);
        }
    }
    forwarded
}

/// Installs a reactive executor that drains the session effect queue whenever it changes.
pub fn install(session: TerminalSession, ctx: CommandContext, forward: Rc<dyn Fn(Effect)>) {
    let queue = session.effects();
    create_effect(move |_| {
        if queue.with(Vec::is_empty) {
            return;
        }
        // Take the batch before running it so effects queued meanwhile form a new batch.
        let batch = session.take_effects();
        let runner = ctx.clone();
        let forward = forward.clone();
        ctx.spawn(async move {
            for effect in batch {
                if run_effect(&runner, &effect).await == EffectDisposition::Forward {
                    forward(effect);
                }
            }
        });
    });
}

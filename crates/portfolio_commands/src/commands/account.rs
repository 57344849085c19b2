use terminal_contract::{
    CommandCategory, CommandError, CommandOutput, CommandResult, Effect, ModalKind,
};
use terminal_engine::CommandDescriptor;

use crate::CommandContext;

pub(crate) fn descriptors(ctx: &CommandContext) -> Vec<CommandDescriptor> {
    vec![
        whoami_descriptor(ctx.clone()),
        modal_descriptor(ctx.clone(), "login", "Sign in to your account.", "signin", ModalKind::SignIn),
        modal_descriptor(ctx.clone(), "signup", "Create an account.", "register", ModalKind::SignUp),
        logout_descriptor(ctx.clone()),
    ]
}

fn whoami_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("whoami", "Show the signed-in user.", move |_| {
        let content = match ctx.auth.user() {
            Some(user) => format!("{} <{}>", user.name, user.email),
            None => "guest".to_string(),
        };
        Ok(CommandResult::text(content))
    })
    .category(CommandCategory::Account)
}

fn modal_descriptor(
    ctx: CommandContext,
    name: &str,
    description: &str,
    alias: &str,
    modal: ModalKind,
) -> CommandDescriptor {
    CommandDescriptor::new(name, description, move |_| {
        if let Some(user) = ctx.auth.user() {
            return Ok(CommandResult::text(format!(
                "Already signed in as {}. Type 'logout' to switch accounts.",
                user.name
            )));
        }
        let content = match modal {
            ModalKind::SignIn => "Opening sign-in...",
            ModalKind::SignUp => "Opening sign-up...",
        };
        Ok(CommandResult::Ready(
            CommandOutput::text(content).with_effect(Effect::OpenModal { modal }),
        ))
    })
    .alias(alias)
    .category(CommandCategory::Account)
}

fn logout_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("logout", "Sign out.", move |_| {
        let Some(user) = ctx.auth.user() else {
            return Ok(CommandResult::text("You are not signed in."));
        };
        let auth = ctx.auth.clone();
        let provider = ctx.auth_provider.clone();
        Ok(CommandResult::pending("Signing out...", async move {
            provider
                .sign_out()
                .await
                .map_err(|err| CommandError::unavailable(format!("sign-out failed: {err}")))?;
            auth.set_user(None);
            Ok(CommandOutput::text(format!("Signed out. See you soon, {}.", user.name))
                .with_effect(Effect::SignedOut))
        }))
    })
    .alias("signout")
    .category(CommandCategory::Account)
}

use terminal_contract::{CommandCategory, CommandError, CommandOutput, CommandResult};
use terminal_engine::CommandDescriptor;

use super::parse_args;
use crate::{appearance::AppearanceKind, CommandContext};

pub(crate) fn descriptors(ctx: &CommandContext) -> Vec<CommandDescriptor> {
    vec![
        appearance_descriptor(
            ctx.clone(),
            AppearanceKind::Theme,
            "Show or change the color theme.",
            &["themes"],
        ),
        appearance_descriptor(
            ctx.clone(),
            AppearanceKind::Cursor,
            "Show or change the cursor style.",
            &["caret"],
        ),
        appearance_descriptor(
            ctx.clone(),
            AppearanceKind::Wallpaper,
            "Show or change the background wallpaper.",
            &["bg", "background"],
        ),
    ]
}

fn appearance_descriptor(
    ctx: CommandContext,
    kind: AppearanceKind,
    description: &str,
    aliases: &[&str],
) -> CommandDescriptor {
    let name = kind.label();
    CommandDescriptor::new(name, description, move |args| {
        let parsed = parse_args(args)?;
        let positionals = parsed
            .positionals
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>();
        match positionals.as_slice() {
            [] => Ok(CommandResult::text(show(&ctx, kind))),
            ["list"] => Ok(CommandResult::text(list(&ctx, kind))),
            ["set"] => Err(CommandError::usage(format!("usage: {name} set <name>"))),
            ["set", value] | [value] => set(&ctx, kind, value).map(CommandResult::Ready),
            _ => Err(CommandError::usage(format!(
                "usage: {name} [list|set <name>|<name>]"
            ))),
        }
    })
    .usage(format!("{name} [list|set <name>|<name>]"))
    .aliases(aliases.iter().copied())
    .category(CommandCategory::Appearance)
}

fn show(ctx: &CommandContext, kind: AppearanceKind) -> String {
    let name = kind.label();
    format!(
        "Current {name}: {}\nAvailable: {}\nUsage: {name} set <name>",
        ctx.appearance.current(kind),
        ctx.appearance.options(kind).join(", ")
    )
}

fn list(ctx: &CommandContext, kind: AppearanceKind) -> String {
    let current = ctx.appearance.current(kind);
    ctx.appearance
        .options(kind)
        .iter()
        .map(|option| {
            let marker = if *option == current { '*' } else { ' ' };
            format!("{marker} {option}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn set(
    ctx: &CommandContext,
    kind: AppearanceKind,
    value: &str,
) -> Result<CommandOutput, CommandError> {
    let previous = ctx.appearance.set(kind, value)?;
    let current = ctx.appearance.current(kind);
    let content = if previous == current {
        format!("{} is already {current}.", capitalized(kind))
    } else {
        format!("{} changed from {previous} to {current}.", capitalized(kind))
    };
    Ok(CommandOutput::text(content)
        .with_metadata("previous", previous)
        .with_metadata("current", current.as_str())
        .with_effect(kind.effect(current)))
}

fn capitalized(kind: AppearanceKind) -> String {
    let label = kind.label();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use terminal_contract::{Effect, MetadataValue};

    use crate::test_support::Fixture;

    use super::*;

    #[test]
    fn bare_command_shows_current_and_options() {
        let _ = leptos::create_runtime();
        assert_eq!(
            Fixture::new().run("cursor").content,
            "Current cursor: block\nAvailable: block, underline, bar\nUsage: cursor set <name>"
        );
    }

    #[test]
    fn list_marks_the_current_value() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        fixture.run("bg set stars");
        assert_eq!(
            fixture.run("wallpaper list").content,
            "  none\n  aurora\n  grid\n* stars"
        );
    }

    #[test]
    fn set_reports_previous_and_emits_apply_effect() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        let output = fixture.run("theme set Dracula");
        assert_eq!(output.content, "Theme changed from default to dracula.");
        assert_eq!(
            output.metadata.get("previous"),
            Some(&MetadataValue::from("default"))
        );
        assert_eq!(
            output.metadata.get("current"),
            Some(&MetadataValue::from("dracula"))
        );
        assert_eq!(
            output.effects,
            vec![Effect::ApplyTheme {
                theme: "dracula".to_string()
            }]
        );
        assert_eq!(fixture.ctx.appearance.current(AppearanceKind::Theme), "dracula");
    }

    #[test]
    fn shorthand_set_and_repeat_are_accepted() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        fixture.run("themes nord");
        let output = fixture.run("theme nord");
        assert_eq!(output.content, "Theme is already nord.");
        assert_eq!(output.effects.len(), 1);
    }

    #[test]
    fn unknown_value_is_a_usage_error() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        let output = fixture.run("caret set beam");
        assert!(output.is_error);
        assert!(output.content.contains("Unknown cursor 'beam'"));
        assert!(output.effects.is_empty());
        assert_eq!(fixture.ctx.appearance.current(AppearanceKind::Cursor), "block");
    }

    #[test]
    fn set_without_a_value_shows_usage() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        let output = fixture.run("theme set");
        assert!(output.is_error);
        assert!(output.content.contains("usage: theme set <name>"));
        assert!(!output.content.contains("Unknown theme"));
        assert_eq!(fixture.ctx.appearance.current(AppearanceKind::Theme), "default");
    }

    #[test]
    fn too_many_arguments_show_usage() {
        let _ = leptos::create_runtime();
        let output = Fixture::new().run("theme set a b");
        assert!(output.is_error);
        assert!(output.content.contains("usage: theme [list|set <name>|<name>]"));
    }
}

use std::{cell::OnceCell, rc::Rc};

use chrono::{DateTime, Utc};
use portfolio_host::load_history_entries;
use terminal_contract::{
    CommandCategory, CommandError, CommandErrorCode, CommandInfo, CommandOutput, CommandResult,
    Effect,
};
use terminal_engine::CommandDescriptor;

use crate::{bootstrap::welcome_output, CommandContext};

pub(crate) fn descriptors(
    ctx: &CommandContext,
    catalog: Rc<OnceCell<Vec<CommandInfo>>>,
) -> Vec<CommandDescriptor> {
    vec![
        help_descriptor(catalog),
        welcome_descriptor(ctx.clone()),
        clear_descriptor(ctx.clone()),
        echo_descriptor(),
        date_descriptor(ctx.clone()),
        history_descriptor(ctx.clone()),
        open_descriptor(ctx.clone()),
        sudo_descriptor(),
    ]
}

fn help_descriptor(catalog: Rc<OnceCell<Vec<CommandInfo>>>) -> CommandDescriptor {
    CommandDescriptor::new(
        "help",
        "List commands or show details for one.",
        move |args| {
            let infos = catalog.get().map(Vec::as_slice).unwrap_or_default();
            let target = args.trim();
            if target.is_empty() {
                return Ok(CommandResult::text(help_listing(infos)));
            }
            let target = target.to_lowercase();
            let info = find_help_entry(infos, &target).ok_or_else(|| {
                CommandError::not_found(format!(
                    "no help for '{target}'. Type 'help' to see available commands."
                ))
            })?;
            Ok(CommandResult::text(help_details(info)))
        },
    )
    .usage("help [command]")
    .aliases(["?", "commands"])
}

/// Exact names win over aliases, as in dispatch.
fn find_help_entry<'a>(infos: &'a [CommandInfo], target: &str) -> Option<&'a CommandInfo> {
    infos
        .iter()
        .find(|info| info.name == target)
        .or_else(|| infos.iter().find(|info| info.aliases.iter().any(|alias| alias == target)))
}

fn help_listing(infos: &[CommandInfo]) -> String {
    let mut lines = vec!["Available commands:".to_string()];
    for category in CommandCategory::all() {
        let members = infos
            .iter()
            .filter(|info| info.category == *category)
            .collect::<Vec<_>>();
        if members.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{}:", category.label()));
        for info in members {
            let mut line = format!("  {:<30} {}", info.usage_or_name(), info.description);
            if !info.aliases.is_empty() {
                line.push_str(&format!(" (aliases: {})", info.aliases.join(", ")));
            }
            lines.push(line);
        }
    }
    lines.push(String::new());
    lines.push("Type 'help <command>' for details.".to_string());
    lines.join("\n")
}

fn help_details(info: &CommandInfo) -> String {
    let mut lines = vec![
        format!("{} - {}", info.name, info.description),
        format!("Usage: {}", info.usage_or_name()),
    ];
    if !info.aliases.is_empty() {
        lines.push(format!("Aliases: {}", info.aliases.join(", ")));
    }
    lines.join("\n")
}

fn welcome_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("welcome", "Show the welcome banner.", move |_| {
        Ok(CommandResult::Ready(welcome_output(&ctx.config)))
    })
    .alias("banner")
}

fn clear_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("clear", "Clear the terminal.", move |_| {
        Ok(CommandResult::Ready(CommandOutput::clear_then(
            welcome_output(&ctx.config),
        )))
    })
    .alias("cls")
}

fn echo_descriptor() -> CommandDescriptor {
    CommandDescriptor::new("echo", "Print the given text.", |args| {
        Ok(CommandResult::text(args))
    })
    .usage("echo <text>")
}

fn date_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("date", "Show the current date and time (UTC).", move |_| {
        let now_ms = (ctx.clock)();
        let now = i64::try_from(now_ms)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| {
                CommandError::new(
                    CommandErrorCode::Internal,
                    format!("clock value {now_ms} is out of range"),
                )
            })?;
        Ok(CommandResult::Ready(
            CommandOutput::text(now.format("%a %b %d %H:%M:%S UTC %Y").to_string())
                .with_metadata("iso", now.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        ))
    })
}

fn history_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("history", "List previously entered commands.", move |_| {
        let store = ctx.history.clone();
        Ok(CommandResult::pending("Loading history...", async move {
            let entries = load_history_entries(store.as_ref())
                .await
                .map_err(|err| super::unavailable("history", err))?;
            if entries.is_empty() {
                return Ok(CommandOutput::text("No commands in history yet."));
            }
            let lines = entries
                .iter()
                .enumerate()
                .map(|(index, entry)| format!("{:>4}  {}", index + 1, entry.command))
                .collect::<Vec<_>>();
            Ok(CommandOutput::text(lines.join("\n")).with_metadata("count", lines.len() as i64))
        }))
    })
}

fn open_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("open", "Open a profile link or URL in a new tab.", move |args| {
        let parsed = super::parse_args(args)?;
        let links = &ctx.config.links;
        let usage = || {
            let names = links.keys().cloned().collect::<Vec<_>>();
            if names.is_empty() {
                CommandError::usage("usage: open <url>")
            } else {
                CommandError::usage(format!("usage: open <{}|url>", names.join("|")))
            }
        };
        let target = parsed.positional(0).ok_or_else(usage)?;
        let url = match links.get(&target.to_lowercase()) {
            Some(url) => url.clone(),
            None if target.starts_with("https://") || target.starts_with("http://") => {
                target.to_string()
            }
            None => return Err(usage()),
        };
        Ok(CommandResult::Ready(
            CommandOutput::text(format!("Opening {url}..."))
                .with_metadata("url", url.as_str())
                .with_effect(Effect::Navigate { url }),
        ))
    })
    .usage("open <link|url>")
}

fn sudo_descriptor() -> CommandDescriptor {
    CommandDescriptor::new("sudo", "Try it.", |_| {
        Ok(CommandResult::Ready(CommandOutput::error(
            "Permission denied: this incident will be reported.",
        )))
    })
    .hidden()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use terminal_contract::{EntryId, EntryStatus, HistoryEntry, MetadataValue};

    use crate::{config::TerminalConfig, test_support::Fixture};

    use super::*;

    #[test]
    fn help_groups_public_commands_by_category() {
        let _ = leptos::create_runtime();
        let output = Fixture::new().run("help");
        assert!(!output.is_error);
        let terminal = output.content.find("Terminal:").expect("core section");
        let portfolio = output.content.find("Portfolio:").expect("portfolio section");
        assert!(terminal < portfolio);
        assert!(output.content.contains("theme [list|set <name>|<name>]"));
        assert!(output.content.contains("(aliases: cls)"));
        assert!(!output.content.contains("sudo"));
    }

    #[test]
    fn help_resolves_aliases_to_details() {
        let _ = leptos::create_runtime();
        let output = Fixture::new().run("help CLS");
        assert_eq!(
            output.content,
            "clear - Clear the terminal.\nUsage: clear\nAliases: cls"
        );
    }

    #[test]
    fn help_prefers_exact_names_over_aliases() {
        let mut archive = CommandInfo::new("archive", "Old projects.");
        archive.aliases = vec!["projects".to_string()];
        let projects = CommandInfo::new("projects", "Things I have built.");
        let infos = vec![archive, projects];
        assert_eq!(
            find_help_entry(&infos, "projects").map(|info| info.name.as_str()),
            Some("projects")
        );
        assert_eq!(
            find_help_entry(&infos, "archive").map(|info| info.name.as_str()),
            Some("archive")
        );
    }

    #[test]
    fn help_for_unknown_or_hidden_command_is_an_error() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        for line in ["help frobnicate", "help sudo"] {
            let output = fixture.run(line);
            assert!(output.is_error, "{line}");
            assert!(output.content.contains("no help for"));
        }
    }

    #[test]
    fn welcome_is_deterministic_and_kept_out_of_history() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        let first = fixture.run("welcome");
        assert_eq!(first, fixture.run("banner"));
        assert!(first.no_history);
        assert!(!first.is_error);
    }

    #[test]
    fn clear_replays_the_welcome_output() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        let clear = fixture.run("clear");
        assert!(clear.is_clear_signal());
        assert!(clear.clear_history);
        assert_eq!(
            clear.run_after_clear.as_deref(),
            Some(&fixture.run("welcome"))
        );
    }

    #[test]
    fn echo_returns_arguments() {
        let _ = leptos::create_runtime();
        assert_eq!(
            Fixture::new().run("echo  hello   there"),
            CommandOutput::text("hello there")
        );
    }

    #[test]
    fn date_formats_the_context_clock() {
        let _ = leptos::create_runtime();
        let output = Fixture::new().run("date");
        assert_eq!(output.content, "Sat Mar 09 16:20:00 UTC 2024");
        assert_eq!(
            output.metadata.get("iso"),
            Some(&MetadataValue::from("2024-03-09T16:20:00Z"))
        );
    }

    #[test]
    fn history_lists_persisted_commands() {
        let _ = leptos::create_runtime();
        let fixture = Fixture::new();
        assert!(fixture.result("history").is_async());
        assert_eq!(fixture.run("history").content, "No commands in history yet.");

        let entries = ["about", "theme set nord"]
            .iter()
            .enumerate()
            .map(|(index, command)| HistoryEntry {
                id: EntryId(index as u64 + 1),
                command: command.to_string(),
                output: CommandOutput::text("ok"),
                status: EntryStatus::Complete,
                timestamp_ms: 0,
            })
            .collect();
        futures::executor::block_on(portfolio_host::save_history_entries(&fixture.history, entries))
            .expect("seed");
        assert_eq!(
            fixture.run("history").content,
            "   1  about\n   2  theme set nord"
        );
    }

    #[test]
    fn open_navigates_to_configured_links_and_urls() {
        let _ = leptos::create_runtime();
        let mut config = TerminalConfig::default();
        config
            .links
            .insert("github".to_string(), "https://github.com/alex".to_string());
        let fixture = Fixture::with_config(config);

        let output = fixture.run("open GitHub");
        assert_eq!(
            output.effects,
            vec![Effect::Navigate {
                url: "https://github.com/alex".to_string()
            }]
        );

        let output = fixture.run("open https://example.dev");
        assert_eq!(output.content, "Opening https://example.dev...");
    }

    #[test]
    fn open_matches_mixed_case_link_names_from_config() {
        let _ = leptos::create_runtime();
        let config =
            TerminalConfig::from_toml_str("[links]\nGitHub = \"https://github.com/alex\"")
                .expect("config");
        let fixture = Fixture::with_config(config);
        for line in ["open GitHub", "open github"] {
            let output = fixture.run(line);
            assert!(!output.is_error, "{line}");
            assert_eq!(
                output.effects,
                vec![Effect::Navigate {
                    url: "https://github.com/alex".to_string()
                }]
            );
        }
    }

    #[test]
    fn open_rejects_unknown_targets() {
        let _ = leptos::create_runtime();
        let output = Fixture::new().run("open ftp://nope");
        assert!(output.is_error);
        assert!(output.effects.is_empty());
        assert!(output.content.contains("usage: open <url>"));
    }

    #[test]
    fn sudo_is_hidden_but_dispatchable() {
        let _ = leptos::create_runtime();
        let output = Fixture::new().run("sudo rm -rf /");
        assert!(output.is_error);
        assert!(output.content.starts_with("Permission denied"));
    }
}

//! Portfolio content commands. Every command loads from the content source asynchronously.

use portfolio_host::{Experience, Project};
use terminal_contract::{CommandCategory, CommandError, CommandOutput, CommandResult};
use terminal_engine::CommandDescriptor;

use super::{parse_args, unavailable};
use crate::{
    render::{escape_html, link},
    CommandContext,
};

pub(crate) fn descriptors(ctx: &CommandContext) -> Vec<CommandDescriptor> {
    vec![
        about_descriptor(ctx.clone()),
        experience_descriptor(ctx.clone()),
        education_descriptor(ctx.clone()),
        projects_descriptor(ctx.clone()),
        contact_descriptor(ctx.clone()),
    ]
}

fn about_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("about", "Who I am.", move |_| {
        let content = ctx.content.clone();
        Ok(CommandResult::pending("Loading profile...", async move {
            let profile = content
                .profile()
                .await
                .map_err(|err| unavailable("profile", err))?;
            let mut lines = vec![format!("{} - {}", profile.name, profile.title)];
            if let Some(location) = &profile.location {
                lines.push(location.clone());
            }
            lines.push(String::new());
            lines.push(profile.summary.clone());
            Ok(CommandOutput::text(lines.join("\n")))
        }))
    })
    .alias("whois")
    .category(CommandCategory::Portfolio)
}

fn experience_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("experience", "Where I have worked.", move |_| {
        let content = ctx.content.clone();
        Ok(CommandResult::pending("Loading experience...", async move {
            let mut positions = content
                .experience()
                .await
                .map_err(|err| unavailable("experience", err))?;
            if positions.is_empty() {
                return Ok(CommandOutput::text("No experience listed yet."));
            }
            positions.sort_by(|left, right| right.start.cmp(&left.start));
            let blocks = positions.iter().map(render_position).collect::<Vec<_>>();
            Ok(CommandOutput::text(blocks.join("\n\n"))
                .with_metadata("count", blocks.len() as i64))
        }))
    })
    .alias("work")
    .category(CommandCategory::Portfolio)
}

fn render_position(position: &Experience) -> String {
    let mut lines = vec![format!(
        "{} @ {} ({})",
        position.role,
        position.company,
        position.period()
    )];
    lines.extend(
        position
            .highlights
            .iter()
            .map(|highlight| format!("  - {highlight}")),
    );
    lines.join("\n")
}

fn education_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("education", "Where I studied.", move |_| {
        let content = ctx.content.clone();
        Ok(CommandResult::pending("Loading education...", async move {
            let records = content
                .education()
                .await
                .map_err(|err| unavailable("education", err))?;
            if records.is_empty() {
                return Ok(CommandOutput::text("No education listed yet."));
            }
            let lines = records
                .iter()
                .map(|record| {
                    format!(
                        "{}, {} ({} - {})",
                        record.degree,
                        record.institution,
                        record.start,
                        record.end.as_deref().unwrap_or("present")
                    )
                })
                .collect::<Vec<_>>();
            Ok(CommandOutput::text(lines.join("\n")))
        }))
    })
    .category(CommandCategory::Portfolio)
}

fn projects_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("projects", "Things I have built.", move |args| {
        let parsed = parse_args(args)?;
        if parsed.positionals.len() > 1 {
            return Err(CommandError::usage("usage: projects [slug] [--featured]"));
        }
        let slug = parsed.positional(0).map(str::to_lowercase);
        let featured_only = parsed.has_flag("featured");
        let content = ctx.content.clone();
        Ok(CommandResult::pending("Loading projects...", async move {
            let projects = content
                .projects()
                .await
                .map_err(|err| unavailable("projects", err))?;
            if let Some(slug) = slug {
                let project = projects
                    .iter()
                    .find(|project| project.slug == slug)
                    .ok_or_else(|| {
                        CommandError::not_found(format!(
                            "no project named '{slug}'. Type 'projects' to list them."
                        ))
                    })?;
                return Ok(CommandOutput::html(render_project(project))
                    .with_metadata("slug", project.slug.as_str()));
            }
            let selected = projects
                .iter()
                .filter(|project| !featured_only || project.featured)
                .collect::<Vec<_>>();
            if selected.is_empty() {
                return Ok(CommandOutput::text("No projects to show."));
            }
            let items = selected
                .iter()
                .map(|project| render_project(project))
                .collect::<String>();
            Ok(
                CommandOutput::html(format!("<ul class=\"projects\">{items}</ul>"))
                    .with_metadata("count", selected.len() as i64),
            )
        }))
    })
    .usage("projects [slug] [--featured]")
    .alias("portfolio")
    .category(CommandCategory::Portfolio)
}

fn render_project(project: &Project) -> String {
    let mut html = format!(
        "<li class=\"project\"><strong>{}</strong>",
        escape_html(&project.name)
    );
    if project.featured {
        html.push_str(" <em>featured</em>");
    }
    html.push_str(&format!("<p>{}</p>", escape_html(&project.summary)));
    if !project.tech.is_empty() {
        html.push_str(&format!(
            "<p class=\"tech\">{}</p>",
            escape_html(&project.tech.join(", "))
        ));
    }
    let links = [("site", &project.url), ("source", &project.repo)]
        .into_iter()
        .filter_map(|(label, url)| url.as_deref().map(|url| link(url, label)))
        .collect::<Vec<_>>();
    if !links.is_empty() {
        html.push_str(&format!("<p>{}</p>", links.join(" | ")));
    }
    html.push_str("</li>");
    html
}

fn contact_descriptor(ctx: CommandContext) -> CommandDescriptor {
    CommandDescriptor::new("contact", "How to reach me.", move |_| {
        let content = ctx.content.clone();
        Ok(CommandResult::pending("Loading contact details...", async move {
            let profile = content
                .profile()
                .await
                .map_err(|err| unavailable("contact details", err))?;
            let mut lines = Vec::new();
            if let Some(email) = &profile.email {
                lines.push(format!("  {:<10} {email}", "email"));
            }
            lines.extend(
                profile
                    .links
                    .iter()
                    .map(|link| format!("  {:<10} {}", link.label, link.url)),
            );
            if lines.is_empty() {
                return Ok(CommandOutput::text("No contact details listed yet."));
            }
            lines.push(String::new());
            lines.push("Type 'open <url>' to visit a link.".to_string());
            Ok(CommandOutput::text(lines.join("\n")))
        }))
    })
    .alias("socials")
    .category(CommandCategory::Portfolio)
}

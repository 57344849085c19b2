//! Command descriptors and the build-once registry.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    rc::Rc,
};

use leptos::logging;
use terminal_contract::{
    CommandCategory, CommandError, CommandInfo, CommandResult, CommandVisibility,
};
use thiserror::Error;

/// Synchronous command entry point. Receives the argument string after the command name.
pub type ExecuteFn = Rc<dyn Fn(&str) -> Result<CommandResult, CommandError>>;

/// Static definition of one command: metadata plus its execute function.
#[derive(Clone)]
pub struct CommandDescriptor {
    info: CommandInfo,
    execute: ExecuteFn,
}

impl CommandDescriptor {
    /// Creates a public core-category command.
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, execute: F) -> Self
    where
        F: Fn(&str) -> Result<CommandResult, CommandError> + 'static,
    {
        Self {
            info: CommandInfo::new(name, description),
            execute: Rc::new(execute),
        }
    }

    /// Sets the usage hint.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.info.usage = Some(usage.into());
        self
    }

    /// Adds one alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.info.aliases.push(alias.into());
        self
    }

    /// Adds several aliases.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.info.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Sets the help category.
    pub fn category(mut self, category: CommandCategory) -> Self {
        self.info.category = category;
        self
    }

    /// Hides the command from help and completion.
    pub fn hidden(mut self) -> Self {
        self.info.visibility = CommandVisibility::Hidden;
        self
    }

    /// Registration metadata.
    pub fn info(&self) -> &CommandInfo {
        &self.info
    }

    /// Primary (lowercased once registered) name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Invokes the command. Callers that need fault containment go through the dispatcher.
    pub fn execute(&self, args: &str) -> Result<CommandResult, CommandError> {
        (self.execute)(args)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Registry construction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A name or alias is empty or contains whitespace.
    #[error("invalid command name `{name}`")]
    InvalidName {
        /// Offending name.
        name: String,
    },
    /// Two descriptors share a primary name.
    #[error("command `{name}` is registered more than once")]
    DuplicateName {
        /// Duplicated name.
        name: String,
    },
    /// Two descriptors claim the same alias.
    #[error("alias `{alias}` is claimed by both `{first}` and `{second}`")]
    DuplicateAlias {
        /// Duplicated alias.
        alias: String,
        /// Command that claimed the alias first.
        first: String,
        /// Command that claimed it again.
        second: String,
    },
}

/// How a command name was matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Input was empty or whitespace-only.
    Empty,
    /// Matched a primary name.
    Exact,
    /// Matched an alias.
    Alias {
        /// Alias that matched.
        alias: String,
    },
    /// Nothing matched.
    NotFound,
}

/// Collects descriptors from each feature area before validation.
#[derive(Default)]
pub struct RegistryBuilder {
    descriptors: Vec<CommandDescriptor>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one descriptor.
    pub fn register(mut self, descriptor: CommandDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Queues a descriptor set.
    pub fn extend(mut self, descriptors: impl IntoIterator<Item = CommandDescriptor>) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    /// Validates names and aliases and freezes the registry.
    ///
    /// # Errors
    ///
    /// Fails on invalid names, duplicate primary names, and aliases claimed twice.
    pub fn build(self) -> Result<CommandRegistry, RegistryError> {
        let mut by_name = BTreeMap::new();
        for mut descriptor in self.descriptors {
            let name = normalize_name(&descriptor.info.name)?;
            descriptor.info.name = name.clone();
            let mut aliases = Vec::new();
            for alias in &descriptor.info.aliases {
                let alias = normalize_name(alias)?;
                if alias != name && !aliases.contains(&alias) {
                    aliases.push(alias);
                }
            }
            descriptor.info.aliases = aliases;
            if by_name.contains_key(&name) {
                return Err(RegistryError::DuplicateName { name });
            }
            by_name.insert(name, Rc::new(descriptor));
        }

        let mut by_alias = BTreeMap::<String, String>::new();
        for (name, descriptor) in &by_name {
            for alias in &descriptor.info.aliases {
                if let Some(first) = by_alias.get(alias) {
                    return Err(RegistryError::DuplicateAlias {
                        alias: alias.clone(),
                        first: first.clone(),
                        second: name.clone(),
                    });
                }
                if by_name.contains_key(alias) {
                    logging::warn!(
                        "alias `{alias}` of `{name}` is shadowed by the command of the same name"
                    );
                }
                by_alias.insert(alias.clone(), name.clone());
            }
        }

        Ok(CommandRegistry {
            inner: Rc::new(RegistryInner { by_name, by_alias }),
        })
    }
}

fn normalize_name(raw: &str) -> Result<String, RegistryError> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(RegistryError::InvalidName {
            name: raw.to_string(),
        });
    }
    Ok(name)
}

struct RegistryInner {
    by_name: BTreeMap<String, Rc<CommandDescriptor>>,
    by_alias: BTreeMap<String, String>,
}

/// Read-only command lookup table shared by every dispatch call.
#[derive(Clone)]
pub struct CommandRegistry {
    inner: Rc<RegistryInner>,
}

impl CommandRegistry {
    /// Starts a new builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up a command by primary name only.
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.inner
            .by_name
            .get(&name.to_lowercase())
            .map(Rc::as_ref)
    }

    /// Looks up a command by alias only.
    pub fn resolve_alias(&self, alias: &str) -> Option<&CommandDescriptor> {
        let name = self.inner.by_alias.get(&alias.to_lowercase())?;
        self.inner.by_name.get(name).map(Rc::as_ref)
    }

    /// Looks up a command by primary name, then by alias.
    pub fn lookup(&self, name: &str) -> Option<(Resolution, &CommandDescriptor)> {
        if let Some(descriptor) = self.get(name) {
            return Some((Resolution::Exact, descriptor));
        }
        self.resolve_alias(name).map(|descriptor| {
            (
                Resolution::Alias {
                    alias: name.to_lowercase(),
                },
                descriptor,
            )
        })
    }

    /// All descriptors sorted by name, hidden ones included.
    pub fn descriptors(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.inner.by_name.values().map(Rc::as_ref)
    }

    /// Metadata of public commands sorted by name.
    pub fn infos(&self) -> Vec<CommandInfo> {
        self.descriptors()
            .filter(|descriptor| descriptor.info.is_public())
            .map(|descriptor| descriptor.info.clone())
            .collect()
    }

    /// Public names and aliases starting with `prefix`, sorted and deduplicated.
    pub fn completions(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.trim().to_lowercase();
        let mut out = BTreeSet::new();
        for descriptor in self.descriptors().filter(|d| d.info.is_public()) {
            let candidates =
                std::iter::once(&descriptor.info.name).chain(descriptor.info.aliases.iter());
            for candidate in candidates {
                if candidate.starts_with(&prefix) {
                    out.insert(candidate.clone());
                }
            }
        }
        out.into_iter().collect()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.inner.by_name.len()
    }

    /// Returns whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn noop(name: &str) -> CommandDescriptor {
        CommandDescriptor::new(name, "test command", |_| Ok(CommandResult::text("ok")))
    }

    #[test]
    fn build_lowercases_names_and_aliases() {
        let registry = RegistryBuilder::new()
            .register(noop("Help").aliases(["?", "COMMANDS"]))
            .build()
            .expect("build");
        assert_eq!(registry.get("help").map(CommandDescriptor::name), Some("help"));
        assert_eq!(
            registry.resolve_alias("commands").map(CommandDescriptor::name),
            Some("help")
        );
    }

    #[test]
    fn duplicate_names_fail_fast() {
        let error = RegistryBuilder::new()
            .register(noop("echo"))
            .register(noop("ECHO"))
            .build()
            .err()
            .expect("duplicate should fail");
        assert_eq!(
            error,
            RegistryError::DuplicateName {
                name: "echo".to_string()
            }
        );
    }

    #[test]
    fn alias_claimed_twice_fails() {
        let error = RegistryBuilder::new()
            .register(noop("clear").alias("cls"))
            .register(noop("reset").alias("cls"))
            .build()
            .err()
            .expect("duplicate alias should fail");
        assert_eq!(
            error,
            RegistryError::DuplicateAlias {
                alias: "cls".to_string(),
                first: "clear".to_string(),
                second: "reset".to_string(),
            }
        );
    }

    #[test]
    fn names_with_whitespace_are_rejected() {
        let error = RegistryBuilder::new()
            .register(noop("two words"))
            .build()
            .err()
            .expect("invalid name should fail");
        assert!(matches!(error, RegistryError::InvalidName { .. }));
    }

    #[test]
    fn exact_name_wins_over_foreign_alias() {
        let registry = RegistryBuilder::new()
            .register(noop("foo"))
            .register(noop("bar").alias("foo"))
            .build()
            .expect("shadowing alias is allowed");
        let (resolution, descriptor) = registry.lookup("FOO").expect("lookup");
        assert_eq!(resolution, Resolution::Exact);
        assert_eq!(descriptor.name(), "foo");
    }

    #[test]
    fn own_name_alias_is_dropped() {
        let registry = RegistryBuilder::new()
            .register(noop("date").alias("DATE"))
            .build()
            .expect("build");
        assert!(registry.get("date").expect("date").info().aliases.is_empty());
    }

    #[test]
    fn completions_skip_hidden_commands() {
        let registry = RegistryBuilder::new()
            .register(noop("theme").alias("themes"))
            .register(noop("tree"))
            .register(noop("top").hidden())
            .build()
            .expect("build");
        assert_eq!(registry.completions("t"), vec!["theme", "themes", "tree"]);
        assert_eq!(registry.infos().len(), 2);
        assert_eq!(registry.len(), 3);
    }
}

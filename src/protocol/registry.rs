//! Command registry
//!
//! Static table from verb to handler factory. It is filled once at startup,
//! then frozen behind an `Arc` and read concurrently by every session
//! without locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::client::Session;
use crate::error::RegistryError;
use crate::protocol::commands::CommandResult;

/// A command handler. One is constructed per dispatched line.
pub trait CommandHandler: Send {
    /// Runs the command and returns its complete reply.
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult;
}

/// Produces a fresh handler value for one command line.
pub type HandlerFactory = Arc<dyn Fn() -> Box<dyn CommandHandler> + Send + Sync>;

/// One registry entry.
#[derive(Clone)]
pub struct CommandDescriptor {
    verb: String,
    canonical: String,
    factory: HandlerFactory,
}

impl CommandDescriptor {
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// The verb this entry stands for; differs from [`Self::verb`] for synonyms.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn instantiate(&self) -> Box<dyn CommandHandler> {
        (self.factory)()
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("verb", &self.verb)
            .field("canonical", &self.canonical)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandDescriptor>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `verb` (case-insensitive).
    ///
    /// Registering a verb twice is a programming error and is reported
    /// instead of overwriting the first entry.
    pub fn register<F>(&mut self, verb: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn CommandHandler> + Send + Sync + 'static,
    {
        let verb = normalize_verb(verb)?;
        self.insert(CommandDescriptor {
            canonical: verb.clone(),
            verb,
            factory: Arc::new(factory),
        })
    }

    /// Registers `alias` as another name for the already registered `target`.
    /// The alias shares the target's handler and its permissions.
    pub fn register_synonym(&mut self, alias: &str, target: &str) -> Result<(), RegistryError> {
        let alias = normalize_verb(alias)?;
        let target = normalize_verb(target)?;
        let original = self
            .commands
            .get(&target)
            .ok_or_else(|| RegistryError::UnknownTarget {
                alias: alias.clone(),
                target: target.clone(),
            })?;

        let descriptor = CommandDescriptor {
            verb: alias,
            canonical: original.canonical.clone(),
            factory: Arc::clone(&original.factory),
        };
        self.insert(descriptor)
    }

    /// Looks up an uppercased verb.
    pub fn get(&self, verb: &str) -> Option<&CommandDescriptor> {
        self.commands.get(verb)
    }

    pub fn contains(&self, verb: &str) -> bool {
        self.commands.contains_key(verb)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered verbs, sorted.
    pub fn verbs(&self) -> Vec<&str> {
        let mut verbs: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        verbs.sort_unstable();
        verbs
    }

    fn insert(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        if self.commands.contains_key(&descriptor.verb) {
            return Err(RegistryError::DuplicateVerb(descriptor.verb));
        }
        self.commands.insert(descriptor.verb.clone(), descriptor);
        Ok(())
    }
}

fn normalize_verb(verb: &str) -> Result<String, RegistryError> {
    let verb = verb.trim();
    if verb.is_empty() {
        return Err(RegistryError::EmptyVerb);
    }
    Ok(verb.to_ascii_uppercase())
}

//! Plugin registry
//!
//! Owns the loaded plugins and the process-wide command and variable
//! tables. Name collisions across plugins are resolved by keeping the
//! first registrant; the loser's entry is skipped with a warning and the
//! rest of its plugin still loads. A qualified `@plugin.command` reference
//! reaches the shadowed plugin regardless.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use settee_core::{ShellError, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::context::ShellContext;
use crate::name::{is_valid_plugin_name, plugin_name_from_type};
use crate::traits::{CommandMeta, Plugin, PluginSpec, VarMatch, VarMeta};

/// Fatal registration failures. Non-fatal collisions are reported as
/// [`LoadWarning`]s instead.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid plugin name `{name}' derived from {type_ident}")]
    InvalidName {
        type_ident: &'static str,
        name: String,
    },
    #[error("plugin {0} already registered")]
    DuplicatePlugin(String),
    #[error("plugin {plugin} declares command {command} twice")]
    DuplicateCommandInPlugin {
        plugin: String,
        command: &'static str,
    },
}

impl From<RegistryError> for ShellError {
    fn from(err: RegistryError) -> Self {
        ShellError::User(err.to_string())
    }
}

/// Name collision resolved by keeping the first registrant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    CommandCollision {
        name: String,
        plugin: String,
        kept: String,
    },
    VariableCollision {
        label: String,
        plugin: String,
        kept: String,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::CommandCollision { name, plugin, kept } => write!(
                f,
                "warning: command `{name}' from plugin {plugin} ignored: already provided by plugin {kept}"
            ),
            LoadWarning::VariableCollision {
                label,
                plugin,
                kept,
            } => write!(
                f,
                "warning: variable `{label}' from plugin {plugin} ignored: already provided by plugin {kept}"
            ),
        }
    }
}

/// Outcome of a successful registration.
#[derive(Debug)]
pub struct Registration {
    pub plugin: String,
    pub warnings: Vec<LoadWarning>,
}

/// Resolves a plugin name to an implementation and registers it. The
/// default [`NullLoader`] knows no plugins at all.
pub trait PluginLoader {
    fn load(&self, name: &str, registry: &mut Registry) -> Result<Registration, ShellError>;
}

pub struct NullLoader;

impl PluginLoader for NullLoader {
    fn load(&self, name: &str, _registry: &mut Registry) -> Result<Registration, ShellError> {
        Err(ShellError::User(format!(
            "don't know how to load plugin `{name}'"
        )))
    }
}

pub(crate) trait PluginRuntime {
    fn run_command(
        &self,
        index: usize,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError>;

    fn lookup_variable(
        &self,
        index: usize,
        shell: &mut ShellContext,
        rest: &str,
    ) -> Result<Value, ShellError>;

    fn setup(&self, shell: &mut ShellContext) -> Result<(), ShellError>;
}

struct PluginEntry<P: Plugin> {
    instance: P,
    spec: PluginSpec<P>,
}

impl<P: Plugin> PluginRuntime for PluginEntry<P> {
    fn run_command(
        &self,
        index: usize,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        (self.spec.commands[index].run)(&self.instance, shell, argstr)
    }

    fn lookup_variable(
        &self,
        index: usize,
        shell: &mut ShellContext,
        rest: &str,
    ) -> Result<Value, ShellError> {
        (self.spec.variables[index].lookup)(&self.instance, shell, rest)
    }

    fn setup(&self, shell: &mut ShellContext) -> Result<(), ShellError> {
        self.instance.setup(shell)
    }
}

/// Descriptor for a loaded plugin. Immutable after load.
pub struct PluginRecord {
    name: String,
    type_ident: &'static str,
    commands: Vec<CommandMeta>,
    variables: Vec<VarMeta>,
    runtime: Rc<dyn PluginRuntime>,
}

impl PluginRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ident(&self) -> &'static str {
        self.type_ident
    }

    pub fn commands(&self) -> &[CommandMeta] {
        &self.commands
    }

    pub fn variables(&self) -> &[VarMeta] {
        &self.variables
    }
}

#[derive(Clone)]
pub(crate) struct CommandBinding {
    pub plugin: String,
    pub meta: CommandMeta,
    index: usize,
    runtime: Rc<dyn PluginRuntime>,
}

impl CommandBinding {
    pub(crate) fn invoke(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        self.runtime.run_command(self.index, shell, argstr)
    }
}

#[derive(Clone)]
pub(crate) struct VariableBinding {
    pub plugin: String,
    pub meta: VarMeta,
    index: usize,
    runtime: Rc<dyn PluginRuntime>,
}

impl VariableBinding {
    pub(crate) fn qualified_label(&self) -> String {
        format!("@{}.{}", self.plugin, self.meta.matcher.label())
    }

    pub(crate) fn invoke(
        &self,
        shell: &mut ShellContext,
        rest: &str,
    ) -> Result<Value, ShellError> {
        self.runtime.lookup_variable(self.index, shell, rest)
    }
}

pub struct Registry {
    plugins: HashMap<String, PluginRecord>,
    load_order: Vec<String>,
    commands: HashMap<String, CommandBinding>,
    variables: HashMap<String, VariableBinding>,
    prefixes: Vec<VariableBinding>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
            load_order: Vec::new(),
            commands: HashMap::new(),
            variables: HashMap::new(),
            prefixes: Vec::new(),
        }
    }

    /// Register a plugin instance under its derived name. Fatal failures
    /// leave the registry untouched; collisions degrade to warnings.
    pub fn register<P: Plugin>(&mut self, instance: P) -> Result<Registration, RegistryError> {
        let type_ident = std::any::type_name::<P>();
        let name = plugin_name_from_type(type_ident);
        if !is_valid_plugin_name(&name) {
            return Err(RegistryError::InvalidName { type_ident, name });
        }
        if self.plugins.contains_key(&name) {
            return Err(RegistryError::DuplicatePlugin(name));
        }

        let spec = P::spec();
        for (i, command) in spec.commands.iter().enumerate() {
            if spec.commands[..i].iter().any(|c| c.name == command.name) {
                return Err(RegistryError::DuplicateCommandInPlugin {
                    plugin: name,
                    command: command.name,
                });
            }
        }

        let commands: Vec<CommandMeta> = spec
            .commands
            .iter()
            .map(|c| CommandMeta {
                name: c.name,
                doc_line: c.doc_line,
                synopsis: c.synopsis,
            })
            .collect();
        let variables: Vec<VarMeta> = spec
            .variables
            .iter()
            .map(|v| VarMeta {
                matcher: v.matcher,
                doc_line: v.doc_line,
            })
            .collect();
        let runtime: Rc<dyn PluginRuntime> = Rc::new(PluginEntry { instance, spec });

        let mut warnings = Vec::new();
        for (index, meta) in commands.iter().enumerate() {
            match self.commands.entry(meta.name.to_string()) {
                Entry::Occupied(held) => {
                    let warning = LoadWarning::CommandCollision {
                        name: meta.name.to_string(),
                        plugin: name.clone(),
                        kept: held.get().plugin.clone(),
                    };
                    warn!("{warning}");
                    warnings.push(warning);
                }
                Entry::Vacant(slot) => {
                    slot.insert(CommandBinding {
                        plugin: name.clone(),
                        meta: meta.clone(),
                        index,
                        runtime: runtime.clone(),
                    });
                }
            }
        }
        for (index, meta) in variables.iter().enumerate() {
            let binding = VariableBinding {
                plugin: name.clone(),
                meta: meta.clone(),
                index,
                runtime: runtime.clone(),
            };
            match meta.matcher {
                VarMatch::Name(var_name) => match self.variables.entry(var_name.to_string()) {
                    Entry::Occupied(held) => {
                        let warning = LoadWarning::VariableCollision {
                            label: var_name.to_string(),
                            plugin: name.clone(),
                            kept: held.get().plugin.clone(),
                        };
                        warn!("{warning}");
                        warnings.push(warning);
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(binding);
                    }
                },
                VarMatch::Prefix(prefix) => {
                    // prefixes collide on string equality only: `a` and
                    // `ab` coexist
                    let kept = self.prefixes.iter().find_map(|b| {
                        match b.meta.matcher {
                            VarMatch::Prefix(p) if p == prefix => Some(b.plugin.clone()),
                            _ => None,
                        }
                    });
                    if let Some(kept) = kept {
                        let warning = LoadWarning::VariableCollision {
                            label: format!("{prefix}*"),
                            plugin: name.clone(),
                            kept,
                        };
                        warn!("{warning}");
                        warnings.push(warning);
                    } else {
                        self.prefixes.push(binding);
                    }
                }
            }
        }

        debug!(plugin = %name, "registered");
        self.plugins.insert(
            name.clone(),
            PluginRecord {
                name: name.clone(),
                type_ident,
                commands,
                variables,
                runtime,
            },
        );
        self.load_order.push(name.clone());
        Ok(Registration {
            plugin: name,
            warnings,
        })
    }

    pub fn plugin(&self, name: &str) -> Option<&PluginRecord> {
        self.plugins.get(name)
    }

    /// Loaded plugins in load order.
    pub fn plugins(&self) -> impl Iterator<Item = &PluginRecord> {
        self.load_order.iter().filter_map(|name| self.plugins.get(name))
    }

    /// Unqualified command lookup.
    pub fn command(&self, name: &str) -> Option<&CommandMeta> {
        self.commands.get(name).map(|binding| &binding.meta)
    }

    /// Plugin owning the unqualified command `name`.
    pub fn command_owner(&self, name: &str) -> Option<&str> {
        self.commands.get(name).map(|binding| binding.plugin.as_str())
    }

    pub(crate) fn runtime(&self, name: &str) -> Option<Rc<dyn PluginRuntime>> {
        self.plugins.get(name).map(|record| record.runtime.clone())
    }

    /// Resolve a qualified (`@plugin.command`) or unqualified command
    /// reference.
    pub(crate) fn resolve_command(&self, reference: &str) -> Result<CommandBinding, ShellError> {
        if let Some(qualified) = reference.strip_prefix('@') {
            let (plugin_name, command_name) = qualified.split_once('.').ok_or_else(|| {
                ShellError::User(format!(
                    "expected @plugin.command reference, got `{reference}'"
                ))
            })?;
            let record = self
                .plugins
                .get(plugin_name)
                .ok_or_else(|| ShellError::NoSuchPlugin(plugin_name.to_string()))?;
            let index = record
                .commands
                .iter()
                .position(|c| c.name == command_name)
                .ok_or_else(|| ShellError::NoSuchCommandInPlugin {
                    plugin: plugin_name.to_string(),
                    command: command_name.to_string(),
                })?;
            Ok(CommandBinding {
                plugin: record.name.clone(),
                meta: record.commands[index].clone(),
                index,
                runtime: record.runtime.clone(),
            })
        } else {
            self.commands
                .get(reference)
                .cloned()
                .ok_or_else(|| ShellError::NoSuchCommand(reference.to_string()))
        }
    }

    /// Resolve a variable lookup key: exact name first, then the first
    /// registered prefix that is a strict prefix of the key. Returns the
    /// remainder to pass to the lookup handler.
    pub(crate) fn resolve_variable(
        &self,
        name: &str,
    ) -> Result<(VariableBinding, String), ShellError> {
        if let Some(binding) = self.variables.get(name) {
            return Ok((binding.clone(), String::new()));
        }
        for binding in &self.prefixes {
            if let VarMatch::Prefix(prefix) = binding.meta.matcher {
                if name.len() > prefix.len() && name.starts_with(prefix) {
                    return Ok((binding.clone(), name[prefix.len()..].to_string()));
                }
            }
        }
        Err(ShellError::UndefinedVariable(name.to_string()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

//! Plugin traits and declarative registration specs

use crate::context::ShellContext;
use serde::Serialize;
use settee_core::{ShellError, Value};

/// A unit contributing commands and variables under a derived name.
///
/// The name is derived from the implementing type's path (see
/// [`crate::plugin_name_from_type`]). Plugins are stateless from the
/// registry's point of view: handlers take `&self` and keep their working
/// state on the [`ShellContext`], which keeps dispatch reentrant - a
/// command handler may execute further commands or resolve variables.
pub trait Plugin: 'static {
    /// Commands and variables this plugin contributes, declared once at
    /// registration time.
    fn spec() -> PluginSpec<Self>
    where
        Self: Sized;

    /// Called after the plugin is registered. The default does nothing.
    fn setup(&self, _shell: &mut ShellContext) -> Result<(), ShellError> {
        Ok(())
    }
}

pub type CommandFn<P> = fn(&P, &mut ShellContext, Option<&str>) -> Result<(), ShellError>;

/// Lookup handler. For a named variable the last argument is empty; for a
/// prefixed variable it is the remainder of the lookup key after the
/// prefix.
pub type LookupFn<P> = fn(&P, &mut ShellContext, &str) -> Result<Value, ShellError>;

/// How a variable descriptor matches lookup keys: by exact name, or by
/// prefix against any strictly longer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarMatch {
    Name(&'static str),
    Prefix(&'static str),
}

impl VarMatch {
    pub fn label(&self) -> String {
        match self {
            VarMatch::Name(name) => (*name).to_string(),
            VarMatch::Prefix(prefix) => format!("{prefix}*"),
        }
    }
}

pub struct CommandDef<P> {
    pub name: &'static str,
    pub doc_line: &'static str,
    pub synopsis: Option<&'static str>,
    pub run: CommandFn<P>,
}

impl<P> CommandDef<P> {
    pub fn new(name: &'static str, doc_line: &'static str, run: CommandFn<P>) -> Self {
        Self {
            name,
            doc_line,
            synopsis: None,
            run,
        }
    }

    pub fn with_synopsis(mut self, synopsis: &'static str) -> Self {
        self.synopsis = Some(synopsis);
        self
    }
}

pub struct VarDef<P> {
    pub matcher: VarMatch,
    pub doc_line: &'static str,
    pub lookup: LookupFn<P>,
}

impl<P> VarDef<P> {
    pub fn named(name: &'static str, doc_line: &'static str, lookup: LookupFn<P>) -> Self {
        Self {
            matcher: VarMatch::Name(name),
            doc_line,
            lookup,
        }
    }

    pub fn prefixed(prefix: &'static str, doc_line: &'static str, lookup: LookupFn<P>) -> Self {
        Self {
            matcher: VarMatch::Prefix(prefix),
            doc_line,
            lookup,
        }
    }
}

/// Declarative spec built once per plugin type.
pub struct PluginSpec<P> {
    pub commands: Vec<CommandDef<P>>,
    pub variables: Vec<VarDef<P>>,
}

impl<P> PluginSpec<P> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn with_command(mut self, def: CommandDef<P>) -> Self {
        self.commands.push(def);
        self
    }

    pub fn with_variable(mut self, def: VarDef<P>) -> Self {
        self.variables.push(def);
        self
    }
}

impl<P> Default for PluginSpec<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Erased command metadata kept by the registry.
#[derive(Debug, Clone, Serialize)]
pub struct CommandMeta {
    pub name: &'static str,
    pub doc_line: &'static str,
    pub synopsis: Option<&'static str>,
}

/// Erased variable metadata kept by the registry.
#[derive(Debug, Clone, Serialize)]
pub struct VarMeta {
    pub matcher: VarMatch,
    pub doc_line: &'static str,
}

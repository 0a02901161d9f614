//! Settee Plugin System
//!
//! Provides the machinery for extending the shell:
//! - `Plugin` and declarative command/variable specs
//! - plugin name derivation from the implementing type
//! - the `Registry` of loaded plugins with first-wins collision policy
//! - `ShellContext`: dispatch, variable resolution, interpolation, and the
//!   session state plugins operate on
//! - the consumed seams: `Transport`, `Ui`, `PluginLoader`

mod context;
mod eval;
mod interpolate;
mod name;
mod registry;
mod traits;
mod transport;
mod ui;

pub use context::{split_first_word, ShellContext, RESPONSE_HISTORY_SIZE};
pub use interpolate::interpolate;
pub use name::{is_valid_plugin_name, plugin_name_from_type};
pub use registry::{
    LoadWarning, NullLoader, PluginLoader, PluginRecord, Registration, Registry, RegistryError,
};
pub use traits::{
    CommandDef, CommandFn, CommandMeta, LookupFn, Plugin, PluginSpec, VarDef, VarMatch, VarMeta,
};
pub use transport::{HttpRequest, Method, RequestBody, Transport, TransportError};
pub use ui::Ui;

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        CommandDef, CommandMeta, HttpRequest, Method, Plugin, PluginLoader, PluginSpec, Registry,
        RequestBody, ShellContext, Transport, Ui, VarDef, VarMatch, VarMeta,
    };
    pub use settee_core::prelude::*;
}

#[cfg(test)]
pub(crate) mod testutil;

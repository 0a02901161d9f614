//! Settee Standard Plugins

mod core;
mod help;

pub use self::core::CorePlugin;
pub use self::help::HelpPlugin;

use settee_core::ShellError;
use settee_plugin::ShellContext;

/// Install the standard plugins into a shell context.
pub fn install_standard_plugins(shell: &mut ShellContext) -> Result<(), ShellError> {
    shell.install_plugin(CorePlugin)?;
    shell.install_plugin(HelpPlugin)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testutil;

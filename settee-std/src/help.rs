//! Interactive help rendered from registry metadata

use settee_core::ShellError;
use settee_plugin::{CommandDef, Plugin, PluginSpec, ShellContext};

const INTRO: &str = "\
settee accepts input in the form of

>> COMMAND [ARGS]

The [] brackets indicate that ARGS are optional, depending on COMMAND.
This convention is used in all settee help.

To get a list of commands, enter:

>> help commands

settee also defines a couple variables. You can print a variable value
with:

>> print VAR

or:

>> format VAR

To get a list of variables, enter:

>> help vars

Commands and variables are organized in plugins. To get a list of
plugins, enter:

>> help plugins

A command shadowed by a name collision stays reachable with a qualified
reference:

>> @PLUGIN.COMMAND [ARGS]

If you're new to settee, start by reading about the get, put, post,
delete and cd commands.";

pub struct HelpPlugin;

impl Plugin for HelpPlugin {
    fn spec() -> PluginSpec<Self> {
        PluginSpec::new().with_command(
            CommandDef::new("help", "Get help.", Self::execute_help).with_synopsis("[TOPIC]"),
        )
    }
}

impl HelpPlugin {
    fn execute_help(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let topic = argstr.map(|s| s.trim().to_lowercase());
        match topic.as_deref() {
            None | Some("") => shell.print(INTRO),
            Some("commands") => self.help_commands(shell),
            Some("vars") | Some("variables") => self.help_vars(shell),
            Some("plugins") => self.help_plugins(shell),
            Some(name) => self.help_command(shell, name),
        }
        Ok(())
    }

    fn help_commands(&self, shell: &mut ShellContext) {
        let mut lines = vec!["Available commands:".to_string(), String::new()];
        let registry = shell.registry();
        for record in registry.borrow().plugins() {
            for command in record.commands() {
                lines.push(format!(
                    "  {}{} (from {})",
                    command.name,
                    command
                        .synopsis
                        .map(|s| format!(" {s}"))
                        .unwrap_or_default(),
                    record.name()
                ));
                lines.push(format!("    {}", command.doc_line));
                lines.push(String::new());
            }
        }
        for line in lines {
            shell.print(&line);
        }
    }

    fn help_vars(&self, shell: &mut ShellContext) {
        let mut lines = vec![
            "Available unqualified variables:".to_string(),
            String::new(),
        ];
        let registry = shell.registry();
        for record in registry.borrow().plugins() {
            for variable in record.variables() {
                lines.push(format!(
                    "  {} (from {})",
                    variable.matcher.label(),
                    record.name()
                ));
                lines.push(format!("    {}", variable.doc_line));
                lines.push(String::new());
            }
        }
        for line in lines {
            shell.print(&line);
        }
    }

    fn help_plugins(&self, shell: &mut ShellContext) {
        let mut lines = vec!["Loaded plugins:".to_string(), String::new()];
        let registry = shell.registry();
        for record in registry.borrow().plugins() {
            lines.push(format!(
                "  {} ({} commands, {} variables)",
                record.name(),
                record.commands().len(),
                record.variables().len()
            ));
        }
        for line in lines {
            shell.print(&line);
        }
    }

    fn help_command(&self, shell: &mut ShellContext, name: &str) {
        let lines: Vec<String> = {
            let registry = shell.registry();
            let registry = registry.borrow();
            match (registry.command(name), registry.command_owner(name)) {
                (Some(command), Some(owner)) => {
                    let mut lines = vec![format!(
                        "{}{} (from {owner})",
                        command.name,
                        command
                            .synopsis
                            .map(|s| format!(" {s}"))
                            .unwrap_or_default(),
                    )];
                    lines.push(format!("  {}", command.doc_line));
                    lines
                }
                _ => vec![format!("No help on `{name}'.")],
            }
        };
        for line in lines {
            shell.print(&line);
        }
    }
}

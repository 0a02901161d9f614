//! The core plugin
//!
//! HTTP verbs, navigation, printing, authentication, and the standard
//! session variables, including the `r*`/`j*` families over the response
//! history.

use std::process::Command;

use settee_core::{looks_like_json_doc, JsonValue, ShellError, Value};
use settee_plugin::{
    split_first_word, CommandDef, Method, Plugin, PluginSpec, RequestBody, ShellContext, VarDef,
};

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn spec() -> PluginSpec<Self> {
        PluginSpec::new()
            .with_command(
                CommandDef::new("get", "Perform a GET http request.", Self::execute_get)
                    .with_synopsis("[URL]"),
            )
            .with_command(
                CommandDef::new("put", "Perform a PUT http request.", Self::execute_put)
                    .with_synopsis("[URL] [JSON|@FILENAME]"),
            )
            .with_command(CommandDef::new(
                "cput",
                "put, followed by cd if put was successful",
                Self::execute_cput,
            ))
            .with_command(
                CommandDef::new("post", "Perform a POST http request.", Self::execute_post)
                    .with_synopsis("[URL] [JSON|@FILENAME]"),
            )
            .with_command(
                CommandDef::new(
                    "delete",
                    "Perform a DELETE http request.",
                    Self::execute_delete,
                )
                .with_synopsis("[URL]"),
            )
            .with_command(
                CommandDef::new(
                    "cd",
                    "Change current path which will be used to interpret relative urls.",
                    Self::execute_cd,
                )
                .with_synopsis("[PATH]"),
            )
            .with_command(
                CommandDef::new("cg", "cd followed by get", Self::execute_cg)
                    .with_synopsis("[PATH]"),
            )
            .with_command(CommandDef::new("exit", "quit shell", Self::execute_exit))
            .with_command(CommandDef::new("quit", "quit shell", Self::execute_quit))
            .with_command(
                CommandDef::new(
                    "uuids",
                    "Request uuid(s) from the server.",
                    Self::execute_uuids,
                )
                .with_synopsis("[COUNT]"),
            )
            .with_command(
                CommandDef::new(
                    "echo",
                    "Echos ARG after interpolating $(...) expressions.",
                    Self::execute_echo,
                )
                .with_synopsis("[ARG]"),
            )
            .with_command(
                CommandDef::new(
                    "print",
                    "Evaluate EXPR and print the result in a compact form.",
                    Self::execute_print,
                )
                .with_synopsis("EXPR"),
            )
            .with_command(
                CommandDef::new(
                    "format",
                    "Evaluate EXPR and print the result in a pretty form.",
                    Self::execute_format,
                )
                .with_synopsis("EXPR"),
            )
            .with_command(
                CommandDef::new("server", "Set URL of the server.", Self::execute_server)
                    .with_synopsis("[URL]"),
            )
            .with_command(
                CommandDef::new(
                    "expand",
                    "Show full url for PATH after interpolation.",
                    Self::execute_expand,
                )
                .with_synopsis("[PATH]"),
            )
            .with_command(
                CommandDef::new(
                    "sh",
                    "Execute COMMAND in your operating system's shell.",
                    Self::execute_sh,
                )
                .with_synopsis("COMMAND"),
            )
            .with_command(
                CommandDef::new(
                    "member",
                    "Set member KEY of document at current path to VALUE.",
                    Self::execute_member,
                )
                .with_synopsis("KEY VALUE"),
            )
            .with_command(
                CommandDef::new(
                    "user",
                    "Set the USERNAME and password for authentication in requests.",
                    Self::execute_user,
                )
                .with_synopsis("USERNAME"),
            )
            .with_command(
                CommandDef::new("plugin", "Use PLUGIN.", Self::execute_plugin)
                    .with_synopsis("PLUGIN"),
            )
            .with_variable(VarDef::named(
                "uuid",
                "A fresh uuid from the server.",
                Self::lookup_uuid,
            ))
            .with_variable(VarDef::named(
                "id",
                "Value of the id or _id member of the last response.",
                Self::lookup_id,
            ))
            .with_variable(VarDef::named(
                "rev",
                "Value of the rev or _rev member of the last response.",
                Self::lookup_rev,
            ))
            .with_variable(VarDef::named(
                "idr",
                "Shortcut for $(id)?rev=$(rev).",
                Self::lookup_idr,
            ))
            .with_variable(VarDef::named(
                "content_type",
                "Content-Type of the last response.",
                Self::lookup_content_type,
            ))
            .with_variable(VarDef::named(
                "server",
                "Current server url.",
                Self::lookup_server,
            ))
            .with_variable(VarDef::prefixed(
                "r",
                "Get response with index X.",
                Self::lookup_prefix_r,
            ))
            .with_variable(VarDef::prefixed(
                "j",
                "Get json of response with index X.",
                Self::lookup_prefix_j,
            ))
    }
}

impl CorePlugin {
    // ========== Commands ==========

    fn execute_get(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let url = shell.interpolate_opt(argstr)?;
        shell.request(Method::Get, url.as_deref(), None, true)?;
        Ok(())
    }

    fn execute_put(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        self.request_with_body(shell, Method::Put, argstr)?;
        Ok(())
    }

    fn execute_cput(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let url = self.request_with_body(shell, Method::Put, argstr)?;
        let created = shell.responses().current().map_or(false, |r| r.ok());
        if created {
            shell.cd(url.as_deref(), false)?;
        }
        Ok(())
    }

    fn execute_post(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        self.request_with_body(shell, Method::Post, argstr)?;
        Ok(())
    }

    fn execute_delete(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let url = shell.interpolate_opt(argstr)?;
        shell.request(Method::Delete, url.as_deref(), None, true)?;
        Ok(())
    }

    fn execute_cd(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let path = shell.interpolate_opt(argstr)?;
        shell.cd(path.as_deref(), false)
    }

    fn execute_cg(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let path = shell.interpolate_opt(argstr)?;
        shell.cd(path.as_deref(), true)
    }

    fn execute_exit(
        &self,
        _shell: &mut ShellContext,
        _argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        Err(ShellError::Quit)
    }

    fn execute_quit(
        &self,
        _shell: &mut ShellContext,
        _argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        Err(ShellError::Quit)
    }

    fn execute_uuids(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let count = match argstr.map(str::trim).filter(|s| !s.is_empty()) {
            None => 1,
            Some(s) => s
                .parse::<u32>()
                .map_err(|_| ShellError::User(format!("invalid count `{s}'")))?,
        };
        shell.request(Method::Get, Some(&format!("/_uuids?count={count}")), None, true)?;
        Ok(())
    }

    fn execute_echo(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        if let Some(arg) = argstr {
            let text = shell.interpolate(arg)?;
            shell.print(&text);
        }
        Ok(())
    }

    fn execute_print(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let expr = argstr.ok_or_else(|| ShellError::user("expression required"))?;
        let value = shell.eval_expr(expr)?;
        shell.print(&value.to_string());
        Ok(())
    }

    fn execute_format(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let expr = argstr.ok_or_else(|| ShellError::user("expression required"))?;
        let value = shell.eval_expr(expr)?;
        shell.print(&value.format_string());
        Ok(())
    }

    fn execute_server(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        shell.set_server(argstr.map(str::trim))
    }

    fn execute_expand(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let path = shell.interpolate_opt(argstr)?;
        let expanded = shell.expand(path.as_deref())?;
        shell.print(&expanded);
        Ok(())
    }

    fn execute_sh(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let argstr = argstr.ok_or_else(|| ShellError::user("argument required"))?;
        let status = Command::new("sh")
            .arg("-c")
            .arg(argstr)
            .status()
            .map_err(|err| ShellError::User(format!("failed to run command: {err}")))?;
        if !status.success() {
            shell.errmsg(&format!(
                "command exited with status {}",
                status.code().unwrap_or(-1)
            ));
        }
        Ok(())
    }

    fn execute_member(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        const GUIDANCE: &str = "`cg' the desired document first, e.g.: `cg /my_db/my_doc_id'";
        let current = shell.responses().current().cloned();
        let json = current.as_ref().and_then(|r| r.json());
        let id = json.and_then(|j| j.attr_or_nil("_id"));
        let rev = json.and_then(|j| j.attr_or_nil("_rev"));
        let positioned = match &id {
            Some(id) => shell
                .pathstack()
                .last()
                .map_or(false, |last| *last == id.to_string()),
            None => false,
        };
        let (mut doc, rev) = match (json, rev, positioned) {
            (Some(json), Some(rev), true) => (json.clone(), rev),
            _ => return Err(ShellError::user(GUIDANCE)),
        };

        let argstr = argstr
            .ok_or_else(|| ShellError::user("attribute name and new value argument required"))?;
        let (attr_name, new_valstr) = split_first_word(argstr);
        let new_valstr = new_valstr
            .ok_or_else(|| ShellError::user("attribute name and new value argument required"))?;
        if new_valstr == "remove" {
            doc.delete_attr(attr_name)?;
        } else {
            let value = JsonValue::parse(new_valstr)
                .map_err(|err| ShellError::User(format!("invalid json value: {err}")))?;
            doc.set_attr(attr_name, value)?;
        }
        shell.request(
            Method::Put,
            Some(&format!("?rev={rev}")),
            Some(RequestBody::Text(doc.to_string())),
            true,
        )?;
        Ok(())
    }

    fn execute_user(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        shell.prompt_msg_partial("Password: ");
        let password = shell.read_secret()?;
        shell.set_password(Some(password));
        // username saved only after the password was entered, so an
        // interrupted prompt leaves the previous credentials intact
        shell.set_username(argstr.map(str::to_string));
        Ok(())
    }

    fn execute_plugin(
        &self,
        shell: &mut ShellContext,
        argstr: Option<&str>,
    ) -> Result<(), ShellError> {
        let name = argstr.ok_or_else(|| ShellError::user("plugin name required"))?;
        shell.load_plugin(name.trim())
    }

    // ========== Variables ==========

    fn lookup_uuid(&self, shell: &mut ShellContext, _rest: &str) -> Result<Value, ShellError> {
        shell.execute("uuids")?;
        let current = shell.responses().current().cloned();
        let response = match current {
            Some(r) if r.ok() => r,
            _ => return Err(ShellError::user("uuids request failed")),
        };
        let uuids = response.json().and_then(|j| j.member("uuids"));
        let first = uuids
            .as_ref()
            .filter(|u| u.is_array())
            .and_then(|u| u.element(0));
        match first {
            Some(uuid) => Ok(Value::Json(uuid)),
            None => Err(ShellError::user("unknown json structure")),
        }
    }

    fn lookup_id(&self, shell: &mut ShellContext, _rest: &str) -> Result<Value, ShellError> {
        shell
            .responses()
            .current()
            .and_then(|r| r.attr("id", Some("_id")))
            .map(Value::Json)
            .ok_or_else(ShellError::var_not_set)
    }

    fn lookup_rev(&self, shell: &mut ShellContext, _rest: &str) -> Result<Value, ShellError> {
        shell
            .responses()
            .current()
            .and_then(|r| r.attr("rev", Some("_rev")))
            .map(Value::Json)
            .ok_or_else(ShellError::var_not_set)
    }

    fn lookup_idr(&self, shell: &mut ShellContext, _rest: &str) -> Result<Value, ShellError> {
        let idr = shell.interpolate("$(id)?rev=$(rev)")?;
        Ok(Value::Text(idr))
    }

    fn lookup_content_type(
        &self,
        shell: &mut ShellContext,
        _rest: &str,
    ) -> Result<Value, ShellError> {
        Ok(shell
            .responses()
            .current()
            .and_then(|r| r.content_type())
            .map(|ct| Value::Text(ct.to_string()))
            .unwrap_or(Value::Null))
    }

    fn lookup_server(&self, shell: &mut ShellContext, _rest: &str) -> Result<Value, ShellError> {
        shell
            .server_display()
            .map(Value::Text)
            .ok_or_else(ShellError::var_not_set)
    }

    fn lookup_prefix_r(&self, shell: &mut ShellContext, rest: &str) -> Result<Value, ShellError> {
        let index: usize = rest.parse().map_err(|_| ShellError::var_not_set())?;
        if !shell.responses().readable_index(index) {
            return Err(ShellError::var_not_set());
        }
        let response = shell.responses().get(index)?.clone();
        Ok(Value::Response(response))
    }

    fn lookup_prefix_j(&self, shell: &mut ShellContext, rest: &str) -> Result<Value, ShellError> {
        let index: usize = rest
            .parse()
            .map_err(|_| ShellError::User(format!("no response index {rest}")))?;
        if !shell.responses().readable_index(index) {
            return Err(ShellError::User(format!("no response index {index}")));
        }
        let response = shell.responses().get(index)?.clone();
        match response.json() {
            Some(json) => Ok(Value::Json(json.clone())),
            None => Err(ShellError::User(format!("no json in response {index}"))),
        }
    }

    fn request_with_body(
        &self,
        shell: &mut ShellContext,
        method: Method,
        argstr: Option<&str>,
    ) -> Result<Option<String>, ShellError> {
        let argstr = argstr.ok_or_else(|| ShellError::user("argument required"))?;
        let (url, bodyarg) = if looks_like_json_doc(argstr) {
            (None, Some(argstr))
        } else {
            let (first, rest) = split_first_word(argstr);
            (Some(first), rest)
        };
        let body = match bodyarg {
            Some(arg) if arg.starts_with('@') => {
                let (filename, content_type) = split_first_word(&arg[1..]);
                Some(RequestBody::File {
                    path: filename.to_string(),
                    content_type: content_type.map(str::to_string),
                })
            }
            Some(arg) => Some(RequestBody::Text(arg.to_string())),
            None => None,
        };
        let real_url = shell.interpolate_opt(url)?;
        shell.request(method, real_url.as_deref(), body, true)?;
        Ok(real_url)
    }
}

//! Shell context
//!
//! The mutable session state every command and variable handler operates
//! on: the registry handle, the response history, server url and path
//! stack, credentials, and the injected transport, ui, and plugin loader.
//! Also home of the dispatcher (`execute`) and the variable resolver
//! (`lookup_var`).

use std::cell::RefCell;
use std::rc::Rc;

use settee_core::{looks_like_json_doc, Response, RingBuffer, ShellError, Value};
use tracing::debug;
use url::Url;

use crate::eval;
use crate::interpolate::interpolate;
use crate::registry::{NullLoader, PluginLoader, Registration, Registry};
use crate::traits::Plugin;
use crate::transport::{HttpRequest, Method, RequestBody, Transport};
use crate::ui::Ui;

/// Capacity of the response history ring buffer.
pub const RESPONSE_HISTORY_SIZE: usize = 10;

/// Split an input line on its first whitespace run into a reference token
/// and the opaque remainder. No quoting or escaping happens at this layer.
pub fn split_first_word(input: &str) -> (&str, Option<&str>) {
    match input.find(char::is_whitespace) {
        None => (input, None),
        Some(pos) => {
            let (head, tail) = input.split_at(pos);
            let tail = tail.trim_start();
            if tail.is_empty() {
                (head, None)
            } else {
                (head, Some(tail))
            }
        }
    }
}

pub struct ShellContext {
    registry: Rc<RefCell<Registry>>,
    responses: RingBuffer<Rc<Response>>,
    server_url: Option<Url>,
    pathstack: Vec<String>,
    username: Option<String>,
    password: Option<String>,
    transport: Box<dyn Transport>,
    ui: Box<dyn Ui>,
    loader: Box<dyn PluginLoader>,
}

impl ShellContext {
    pub fn new(transport: Box<dyn Transport>, ui: Box<dyn Ui>) -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry::new())),
            responses: RingBuffer::new(RESPONSE_HISTORY_SIZE),
            server_url: None,
            pathstack: Vec::new(),
            username: None,
            password: None,
            transport,
            ui,
            loader: Box::new(NullLoader),
        }
    }

    pub fn with_loader(mut self, loader: Box<dyn PluginLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Handle to the registry. Read-mostly after plugin load; the `plugin`
    /// command takes the one mutable borrow.
    pub fn registry(&self) -> Rc<RefCell<Registry>> {
        self.registry.clone()
    }

    // ========== Plugin Management ==========

    pub fn install_plugin<P: Plugin>(&mut self, instance: P) -> Result<(), ShellError> {
        let registration = self.registry.borrow_mut().register(instance)?;
        self.finish_load(registration)
    }

    /// Load a plugin by name through the injected loader.
    pub fn load_plugin(&mut self, name: &str) -> Result<(), ShellError> {
        let registration = {
            let registry = self.registry.clone();
            let mut registry = registry.borrow_mut();
            self.loader.load(name, &mut registry)?
        };
        let plugin = registration.plugin.clone();
        self.finish_load(registration)?;
        self.msg(&format!("Plugin {plugin} loaded."));
        Ok(())
    }

    fn finish_load(&mut self, registration: Registration) -> Result<(), ShellError> {
        for warning in &registration.warnings {
            self.errmsg(&warning.to_string());
        }
        let runtime = self.registry.borrow().runtime(&registration.plugin);
        match runtime {
            Some(runtime) => runtime.setup(self),
            None => Ok(()),
        }
    }

    // ========== Dispatch ==========

    /// Execute one line of input: split off the command token, resolve it
    /// against the registry, and invoke the owning plugin. Errors raised
    /// by the handler pass through unmodified.
    pub fn execute(&mut self, input: &str) -> Result<(), ShellError> {
        let input = input.trim_start();
        if input.is_empty() {
            return Ok(());
        }
        let (token, argstr) = split_first_word(input);
        let reference = token.to_lowercase();
        let binding = {
            let registry = self.registry.borrow();
            registry.resolve_command(&reference)?
        };
        debug!(command = %reference, plugin = %binding.plugin, "dispatch");
        binding.invoke(self, argstr)
    }

    // ========== Variables ==========

    /// Resolve a variable lookup key and invoke the owning plugin's
    /// handler. A `VarNotSet` raised by the handler gets the resolved
    /// variable's qualified label attached before it propagates.
    pub fn lookup_var(&mut self, name: &str) -> Result<Value, ShellError> {
        let (binding, rest) = {
            let registry = self.registry.borrow();
            registry.resolve_variable(name)?
        };
        match binding.invoke(self, &rest) {
            Err(ShellError::VarNotSet { variable: None }) => Err(ShellError::VarNotSet {
                variable: Some(binding.qualified_label()),
            }),
            other => other,
        }
    }

    /// Evaluate an embedded expression (bare identifier plus optional
    /// dotted traversal).
    pub fn eval_expr(&mut self, expr: &str) -> Result<Value, ShellError> {
        eval::eval_expr(self, expr)
    }

    /// Expand `$(...)` spans in `template` against the variable resolver.
    pub fn interpolate(&mut self, template: &str) -> Result<String, ShellError> {
        interpolate(template, |expr| {
            self.eval_expr(expr).map(|value| value.to_string())
        })
    }

    pub fn interpolate_opt(&mut self, template: Option<&str>) -> Result<Option<String>, ShellError> {
        template.map(|t| self.interpolate(t)).transpose()
    }

    // ========== Output ==========

    pub fn msg(&mut self, text: &str) {
        self.ui.println(text);
    }

    pub fn msg_partial(&mut self, text: &str) {
        self.ui.print(text);
    }

    pub fn errmsg(&mut self, text: &str) {
        self.ui.eprintln(text);
    }

    /// Data output, as opposed to status messages.
    pub fn print(&mut self, text: &str) {
        self.ui.println(text);
    }

    pub fn prompt_msg(&mut self, text: &str) {
        self.ui.println(text);
    }

    pub fn prompt_msg_partial(&mut self, text: &str) {
        self.ui.print(text);
    }

    /// Show `text` and require a bare ENTER to continue; anything else
    /// cancels.
    pub fn confirm(&mut self, text: &str) -> Result<(), ShellError> {
        self.prompt_msg_partial(text);
        let line = self
            .ui
            .read_line()
            .map_err(|err| ShellError::User(err.to_string()))?;
        if line.trim().is_empty() {
            Ok(())
        } else {
            Err(ShellError::user("cancelled"))
        }
    }

    pub fn read_secret(&mut self) -> Result<String, ShellError> {
        self.ui
            .read_secret()
            .map_err(|err| ShellError::User(err.to_string()))
    }

    // ========== Session State ==========

    pub fn responses(&self) -> &RingBuffer<Rc<Response>> {
        &self.responses
    }

    pub fn pathstack(&self) -> &[String] {
        &self.pathstack
    }

    pub fn server_url(&self) -> Option<&Url> {
        self.server_url.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    pub fn set_password(&mut self, password: Option<String>) {
        self.password = password;
    }

    // ========== Server and Paths ==========

    /// Strip one trailing slash and default the scheme to http.
    pub fn normalize_server_url(url: &str) -> String {
        let url = url.strip_suffix('/').unwrap_or(url);
        if has_scheme(url) {
            url.to_string()
        } else {
            format!("http://{url}")
        }
    }

    /// Set or clear the server url. Setting pings the server with a GET
    /// request to the root.
    pub fn set_server(&mut self, url: Option<&str>) -> Result<(), ShellError> {
        match url {
            Some(raw) => {
                let normalized = Self::normalize_server_url(raw);
                let parsed = Url::parse(&normalized)
                    .map_err(|err| ShellError::User(format!("invalid server url: {err}")))?;
                let display = server_display(&parsed);
                self.server_url = Some(parsed);
                self.msg(&format!("Set server to {display}"));
                self.request(Method::Get, None, None, true)?;
                Ok(())
            }
            None => {
                self.server_url = None;
                self.msg("Set server to none.");
                Ok(())
            }
        }
    }

    /// Server url as shown to the user, `None` when unset.
    pub fn server_display(&self) -> Option<String> {
        self.server_url.as_ref().map(server_display)
    }

    /// Change the current path. With `get`, the new path is probed with a
    /// GET request and restored on anything but a 200.
    pub fn cd(&mut self, path: Option<&str>, get: bool) -> Result<(), ShellError> {
        let old_pathstack = self.pathstack.clone();
        self.cd_segment(path);
        if get {
            let code = self.request(Method::Get, None, None, true)?;
            if code != Some(200) {
                self.pathstack = old_pathstack;
            }
        }
        Ok(())
    }

    fn cd_segment(&mut self, path: Option<&str>) {
        match path {
            None => self.pathstack.clear(),
            Some("..") => {
                if self.pathstack.is_empty() {
                    self.errmsg("Already at server root, can't go up.");
                } else {
                    self.pathstack.pop();
                }
            }
            Some("/") => self.pathstack.clear(),
            Some(p) if p.starts_with('/') => {
                self.pathstack.clear();
                self.cd_segment(Some(&p[1..]));
            }
            Some(p) if p.contains('/') => {
                for elem in p.split('/') {
                    self.cd_segment(Some(elem));
                }
            }
            Some(p) => self.pathstack.push(p.to_string()),
        }
    }

    /// Absolute path for a request: relative paths stack on the current
    /// path, the server url's own path is always prepended.
    pub fn full_path(&self, path: Option<&str>) -> String {
        let mut stack: Vec<String> = Vec::new();
        if !matches!(path, Some(p) if p.starts_with('/')) {
            stack = self.pathstack.clone();
        }
        if let Some(url) = &self.server_url {
            let base = url.path();
            if !base.is_empty() && base != "/" {
                stack.insert(0, base.to_string());
            }
        }
        if let Some(p) = path {
            if !p.is_empty() && p != "/" {
                stack.push(p.to_string());
            }
        }
        let fpath = stack.join("/");
        if fpath.starts_with('/') {
            fpath
        } else {
            format!("/{fpath}")
        }
    }

    /// Full url for a path, or an error when no server is set.
    pub fn expand(&self, path: Option<&str>) -> Result<String, ShellError> {
        let url = self
            .server_url
            .as_ref()
            .ok_or_else(|| ShellError::user("Server not set - can't expand url."))?;
        Ok(format!("{}{}", origin(url), self.full_path(path)))
    }

    // ========== Requests ==========

    /// Perform a request against the current server and record the
    /// response in the history. Returns the status code, or `None` when no
    /// request was made. The history is only touched once a complete
    /// response exists.
    pub fn request(
        &mut self,
        method: Method,
        path: Option<&str>,
        body: Option<RequestBody>,
        show_body: bool,
    ) -> Result<Option<u16>, ShellError> {
        if self.server_url.is_none() {
            self.errmsg("Server not set - can't perform request.");
            return Ok(None);
        }
        let fpath = self.full_path(path);
        self.msg_partial(&format!("{method} {fpath} "));
        let absolute = self.expand(path)?;
        let url = Url::parse(&absolute)
            .map_err(|err| ShellError::Transport(format!("invalid url {absolute}: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            self.msg("");
            self.errmsg(&format!(
                "Protocol {} not supported, use http or https.",
                url.scheme()
            ));
            return Ok(None);
        }

        let content_type = match &body {
            Some(RequestBody::Text(text)) if looks_like_json_doc(text) => {
                Some("application/json")
            }
            _ => None,
        };
        let auth = match (&self.username, &self.password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        };
        let request = HttpRequest {
            method,
            url,
            body,
            content_type,
            auth,
        };
        let response = Rc::new(self.transport.send(&request)?);
        self.responses.push(response.clone());

        let index = self.responses.index().unwrap_or(0);
        let mut vars = format!("r{index}");
        if response.json().is_some() {
            vars.push_str(&format!(", j{index}"));
        }
        self.print_response(&response, &format!("vars: {vars}"), show_body);
        Ok(Some(response.status()))
    }

    fn print_response(&mut self, response: &Response, label: &str, show_body: bool) {
        self.msg(&format!(
            "{} {}  {label}",
            response.code(),
            response.reason()
        ));
        if show_body {
            if let Some(json) = response.json() {
                let pretty = json.format_string();
                self.print(&pretty);
            } else if let Some(body) = response.body() {
                let body = body.to_string();
                self.print(&body);
            }
        } else if let Some(body) = response.body() {
            let note = format!("body has {} bytes", body.len());
            self.msg(&note);
        }
    }
}

fn has_scheme(url: &str) -> bool {
    let mut chars = url.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    for c in chars {
        if c == ':' {
            return true;
        }
        if !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
            return false;
        }
    }
    false
}

/// scheme://host:port without the url's path.
fn origin(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port_or_known_default() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}

fn server_display(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() || path == "/" {
        origin(url)
    } else {
        format!("{}{}", origin(url), path)
    }
}

//! Scripted doubles shared by the unit tests in this crate.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use settee_core::{Response, ShellError, Value};

use crate::context::ShellContext;
use crate::traits::{CommandDef, Plugin, PluginSpec, VarDef};
use crate::transport::{HttpRequest, Method, RequestBody, Transport, TransportError};
use crate::ui::Ui;

pub(crate) struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
    pub content_type: Option<&'static str>,
}

/// Replays canned responses in order; fails once they run out.
pub(crate) struct ScriptedTransport {
    replies: VecDeque<Response>,
    requests: Rc<RefCell<Vec<RecordedRequest>>>,
}

impl Transport for ScriptedTransport {
    fn send(&mut self, request: &HttpRequest) -> Result<Response, TransportError> {
        let body = match &request.body {
            Some(RequestBody::Text(text)) => Some(text.clone()),
            Some(RequestBody::File { path, .. }) => Some(format!("@{path}")),
            None => None,
        };
        self.requests.borrow_mut().push(RecordedRequest {
            method: request.method,
            url: request.url.to_string(),
            body,
            content_type: request.content_type,
        });
        self.replies
            .pop_front()
            .ok_or_else(|| TransportError::Request("no scripted reply".to_string()))
    }
}

pub(crate) struct RecordingUi {
    out: Rc<RefCell<Vec<String>>>,
    err: Rc<RefCell<Vec<String>>>,
    input: VecDeque<String>,
}

impl Ui for RecordingUi {
    fn print(&mut self, text: &str) {
        self.out.borrow_mut().push(text.to_string());
    }

    fn println(&mut self, text: &str) {
        self.out.borrow_mut().push(text.to_string());
    }

    fn eprintln(&mut self, text: &str) {
        self.err.borrow_mut().push(text.to_string());
    }

    fn read_line(&mut self) -> io::Result<String> {
        Ok(self.input.pop_front().unwrap_or_default())
    }

    fn read_secret(&mut self) -> io::Result<String> {
        self.read_line()
    }
}

pub(crate) struct Handles {
    pub requests: Rc<RefCell<Vec<RecordedRequest>>>,
    pub out: Rc<RefCell<Vec<String>>>,
    pub err: Rc<RefCell<Vec<String>>>,
}

pub(crate) fn test_context(replies: Vec<Response>) -> (ShellContext, Handles) {
    test_context_with_input(replies, Vec::new())
}

pub(crate) fn test_context_with_input(
    replies: Vec<Response>,
    input: Vec<String>,
) -> (ShellContext, Handles) {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let out = Rc::new(RefCell::new(Vec::new()));
    let err = Rc::new(RefCell::new(Vec::new()));
    let transport = ScriptedTransport {
        replies: replies.into(),
        requests: requests.clone(),
    };
    let ui = RecordingUi {
        out: out.clone(),
        err: err.clone(),
        input: input.into(),
    };
    let shell = ShellContext::new(Box::new(transport), Box::new(ui));
    (shell, Handles { requests, out, err })
}

pub(crate) fn json_response(status: u16, body: &str) -> Response {
    Response::new(
        status,
        reason_for(status),
        Some("application/json".to_string()),
        Some(body.to_string()),
    )
}

fn reason_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        404 => "Object Not Found",
        _ => "",
    }
}

#[derive(Default)]
pub(crate) struct AlphaPlugin;

impl Plugin for AlphaPlugin {
    fn spec() -> PluginSpec<Self> {
        PluginSpec::new()
            .with_command(CommandDef::new("mark", "Leave a mark.", |_, shell, _| {
                shell.print("alpha marked");
                Ok(())
            }))
            .with_variable(VarDef::named("unset", "Never set.", |_, _, _| {
                Err(ShellError::var_not_set())
            }))
            .with_variable(VarDef::prefixed(
                "echo",
                "Echo the remainder.",
                |_, _, rest| Ok(Value::Text(format!("echo:{rest}"))),
            ))
    }
}

#[derive(Default)]
pub(crate) struct BravoPlugin;

impl Plugin for BravoPlugin {
    fn spec() -> PluginSpec<Self> {
        PluginSpec::new()
            .with_command(CommandDef::new("mark", "Leave a mark.", |_, shell, _| {
                shell.print("bravo marked");
                Ok(())
            }))
            .with_command(CommandDef::new("bravo_only", "Only in bravo.", |_, _, _| {
                Ok(())
            }))
    }
}

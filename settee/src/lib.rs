//! Settee - an interactive shell for HTTP document stores
//!
//! The pieces fit together like this: a line of input goes to
//! [`Shell::execute`], which dispatches the command token against the
//! plugin registry. Command handlers run against the
//! [`ShellContext`], interpolating `$(...)` expressions in their
//! arguments through the variable resolver, which in turn may consult the
//! response history (`r0`..`r9`, `j0`..`j9`).

pub use settee_core::{JsonValue, Response, RingBuffer, ShellError, Value};
pub use settee_plugin::{
    CommandDef, HttpRequest, Method, Plugin, PluginLoader, PluginSpec, Registry, RequestBody,
    ShellContext, Transport, TransportError, Ui, VarDef, VarMatch,
};
pub use settee_std::{install_standard_plugins, CorePlugin, HelpPlugin};

/// What the read loop should do after a line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Quit,
}

/// Source of input lines for the read loop. `None` means end of input.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Main shell engine
pub struct Shell {
    ctx: ShellContext,
}

impl Shell {
    /// A shell with an empty registry.
    pub fn new(transport: Box<dyn Transport>, ui: Box<dyn Ui>) -> Self {
        Self {
            ctx: ShellContext::new(transport, ui),
        }
    }

    /// A shell with the standard plugins installed.
    pub fn with_standard_plugins(
        transport: Box<dyn Transport>,
        ui: Box<dyn Ui>,
    ) -> Result<Self, ShellError> {
        let mut shell = Self::new(transport, ui);
        install_standard_plugins(&mut shell.ctx)?;
        Ok(shell)
    }

    pub fn context(&mut self) -> &mut ShellContext {
        &mut self.ctx
    }

    pub fn prompt(&self) -> String {
        let stack = self.ctx.pathstack();
        if stack.is_empty() {
            ">> ".to_string()
        } else {
            format!("{} >> ", stack.join("/"))
        }
    }

    /// Execute one line of input, reporting any failure to the ui instead
    /// of propagating it. `None` input means end of input and quits.
    pub fn execute(&mut self, input: Option<&str>) -> Signal {
        let Some(input) = input else {
            return Signal::Quit;
        };
        match self.ctx.execute(input) {
            Ok(()) => Signal::Continue,
            Err(ShellError::Quit) => Signal::Quit,
            Err(err) => {
                self.ctx.errmsg(&err.to_string());
                Signal::Continue
            }
        }
    }

    /// Read and execute lines until a quit signal or end of input.
    pub fn read_execute_loop<L: LineSource>(&mut self, lines: &mut L) {
        loop {
            let prompt = self.prompt();
            let line = lines.read_line(&prompt);
            if self.execute(line.as_deref()) == Signal::Quit {
                self.ctx.msg("bye");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;
    use std::rc::Rc;

    struct RecordedRequest {
        method: Method,
        url: String,
        body: Option<String>,
    }

    struct ScriptedTransport {
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
            });
            self.replies
                .pop_front()
                .ok_or_else(|| TransportError::Request("no scripted reply".to_string()))
        }
    }

    struct RecordingUi {
        out: Rc<RefCell<Vec<String>>>,
        err: Rc<RefCell<Vec<String>>>,
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
            Ok(String::new())
        }

        fn read_secret(&mut self) -> io::Result<String> {
            Ok(String::new())
        }
    }

    struct Handles {
        requests: Rc<RefCell<Vec<RecordedRequest>>>,
        out: Rc<RefCell<Vec<String>>>,
        err: Rc<RefCell<Vec<String>>>,
    }

    fn json_response(status: u16, body: &str) -> Response {
        let reason = match status {
            200 => "OK",
            201 => "Created",
            404 => "Object Not Found",
            _ => "",
        };
        Response::new(
            status,
            reason,
            Some("application/json".to_string()),
            Some(body.to_string()),
        )
    }

    fn test_shell(replies: Vec<Response>) -> (Shell, Handles) {
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
        };
        let shell = Shell::with_standard_plugins(Box::new(transport), Box::new(ui))
            .expect("standard plugins install");
        (shell, Handles { requests, out, err })
    }

    struct ScriptedLines {
        lines: VecDeque<String>,
    }

    impl LineSource for ScriptedLines {
        fn read_line(&mut self, _prompt: &str) -> Option<String> {
            self.lines.pop_front()
        }
    }

    #[test]
    fn test_dispatch_reaches_core_plugin() {
        let (mut shell, handles) = test_shell(vec![
            json_response(200, "{\"couchdb\":\"Welcome\"}"),
            json_response(200, "{\"db_name\":\"foo\"}"),
        ]);
        assert_eq!(shell.execute(Some("server 127.0.0.1:5984")), Signal::Continue);
        assert_eq!(shell.execute(Some("get /foo")), Signal::Continue);
        let requests = handles.requests.borrow();
        assert_eq!(requests[1].method, Method::Get);
        assert_eq!(requests[1].url, "http://127.0.0.1:5984/foo");
        assert!(requests[1].body.is_none());
    }

    #[test]
    fn test_errors_are_reported_not_fatal() {
        let (mut shell, handles) = test_shell(vec![]);
        assert_eq!(shell.execute(Some("frobnicate")), Signal::Continue);
        assert_eq!(shell.execute(Some("print nope")), Signal::Continue);
        let err = handles.err.borrow();
        assert!(err.iter().any(|l| l == "No such command: frobnicate"));
        assert!(err.iter().any(|l| l == "Variable `nope' is not defined."));
    }

    #[test]
    fn test_quit_signals() {
        let (mut shell, _handles) = test_shell(vec![]);
        assert_eq!(shell.execute(Some("exit")), Signal::Quit);
        let (mut shell, _handles) = test_shell(vec![]);
        assert_eq!(shell.execute(None), Signal::Quit);
    }

    #[test]
    fn test_prompt_follows_pathstack() {
        let (mut shell, _handles) = test_shell(vec![]);
        assert_eq!(shell.prompt(), ">> ");
        shell.context().cd(Some("db/docs"), false).unwrap();
        assert_eq!(shell.prompt(), "db/docs >> ");
    }

    #[test]
    fn test_read_execute_loop_runs_until_quit() {
        let (mut shell, handles) = test_shell(vec![
            json_response(200, "{}"),
            json_response(200, "{\"_id\":\"doc1\"}"),
        ]);
        let mut lines = ScriptedLines {
            lines: VecDeque::from([
                "server 127.0.0.1:5984".to_string(),
                "get /db/doc1".to_string(),
                "echo got $(id)".to_string(),
                "quit".to_string(),
                "never reached".to_string(),
            ]),
        };
        shell.read_execute_loop(&mut lines);
        let out = handles.out.borrow();
        assert!(out.iter().any(|l| l == "got doc1"));
        assert_eq!(out.last().map(String::as_str), Some("bye"));
        // the line after quit was never consumed as a command
        assert_eq!(lines.lines.len(), 1);
    }

    #[test]
    fn test_interpolation_end_to_end() {
        let (mut shell, handles) = test_shell(vec![
            json_response(200, "{}"),
            json_response(200, "{\"_id\":\"doc1\",\"_rev\":\"3-c\"}"),
            json_response(200, "{}"),
        ]);
        shell.execute(Some("server 127.0.0.1:5984"));
        shell.execute(Some("get /db/doc1"));
        shell.execute(Some("get /db/$(idr)"));
        let requests = handles.requests.borrow();
        assert_eq!(requests[2].url, "http://127.0.0.1:5984/db/doc1?rev=3-c");
    }

    #[test]
    fn test_escaped_interpolation_is_preserved() {
        let (mut shell, handles) = test_shell(vec![]);
        shell.execute(Some("echo \\$(id) is $not evaluated"));
        let out = handles.out.borrow();
        assert!(out.iter().any(|l| l == "$(id) is $not evaluated"));
    }

    #[test]
    fn test_response_history_variables_after_wraparound() {
        let replies: Vec<Response> = (0..12)
            .map(|n| json_response(200, &format!("{{\"n\":{n}}}")))
            .collect();
        let (mut shell, _handles) = test_shell(replies);
        shell.execute(Some("server 127.0.0.1:5984"));
        for _ in 0..11 {
            shell.execute(Some("get /db"));
        }
        // 12 responses over 10 slots: slot 0 was overwritten by the 11th
        let j0 = shell.context().lookup_var("j0").unwrap();
        assert_eq!(j0.to_string(), "{\"n\":10}");
        let j1 = shell.context().lookup_var("j1").unwrap();
        assert_eq!(j1.to_string(), "{\"n\":11}");
    }

    #[test]
    fn test_qualified_reference_survives_collisions() {
        let (mut shell, handles) = test_shell(vec![]);
        shell.execute(Some("@help.help commands"));
        assert!(handles
            .out
            .borrow()
            .iter()
            .any(|l| l.contains("get [URL] (from core)")));
    }
}

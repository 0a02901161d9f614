//! Shell error taxonomy
//!
//! Every variant except `Quit` is a recoverable, per-line failure: the read
//! loop reports it and keeps the session alive. `Quit` is the one explicit
//! signal that terminates the loop.

use crate::ring::UninitializedAccess;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    /// Explicit request to end the session. Not an error condition.
    #[error("quit")]
    Quit,

    /// Generic user-facing failure with a ready-made message.
    #[error("{0}")]
    User(String),

    #[error("Variable `{0}' is not defined.")]
    UndefinedVariable(String),

    #[error("No such plugin registered: {0}")]
    NoSuchPlugin(String),

    #[error("Plugin {plugin} doesn't define a {command} command.")]
    NoSuchCommandInPlugin { plugin: String, command: String },

    #[error("No such command: {0}")]
    NoSuchCommand(String),

    /// Raised by a variable lookup handler when the variable exists but has
    /// no value yet. The resolver fills in the qualified label before the
    /// failure propagates to the user.
    #[error("Variable {} not set.", .variable.as_deref().unwrap_or("?"))]
    VarNotSet { variable: Option<String> },

    #[error("unterminated $(...) expression")]
    UnterminatedExpression,

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error(transparent)]
    History(#[from] UninitializedAccess),

    #[error("{0}")]
    Transport(String),
}

impl ShellError {
    pub fn user(message: impl Into<String>) -> Self {
        ShellError::User(message.into())
    }

    /// A `VarNotSet` with no label yet; see [`ShellError::VarNotSet`].
    pub fn var_not_set() -> Self {
        ShellError::VarNotSet { variable: None }
    }
}

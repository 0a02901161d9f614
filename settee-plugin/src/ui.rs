//! Ui seam
//!
//! Output and interactive input for the terminal collaborator. Status
//! messages and data share stdout; errors go to stderr.

use std::io;

pub trait Ui {
    /// Write without a trailing newline and flush.
    fn print(&mut self, text: &str);

    fn println(&mut self, text: &str);

    /// One line on the error channel.
    fn eprintln(&mut self, text: &str);

    /// Read one line in response to an interactive prompt.
    fn read_line(&mut self) -> io::Result<String>;

    /// Read one line that should not be echoed back.
    fn read_secret(&mut self) -> io::Result<String>;
}

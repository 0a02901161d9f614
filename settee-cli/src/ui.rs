//! Stdio ui

use std::io::{self, BufRead, Write};

use settee::Ui;

pub struct StdUi;

impl Ui for StdUi {
    fn print(&mut self, text: &str) {
        print!("{text}");
        let _ = io::stdout().flush();
    }

    fn println(&mut self, text: &str) {
        println!("{text}");
    }

    fn eprintln(&mut self, text: &str) {
        eprintln!("{text}");
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn read_secret(&mut self) -> io::Result<String> {
        self.read_line()
    }
}

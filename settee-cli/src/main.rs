//! settee command line entry point

mod editor;
mod transport;
mod ui;

use anyhow::Result;
use clap::Parser;
use settee::Shell;
use tracing_subscriber::EnvFilter;

/// Interactive shell for CouchDB-style document stores.
#[derive(Parser, Debug)]
#[command(name = "settee", version, about)]
struct Args {
    /// Server url, e.g. http://127.0.0.1:5984
    server: Option<String>,

    /// Initial path to change into, e.g. /my_db
    path: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    println!("settee {}", env!("CARGO_PKG_VERSION"));

    let mut shell = Shell::with_standard_plugins(
        Box::new(transport::HttpTransport::new()?),
        Box::new(ui::StdUi),
    )?;
    if let Some(server) = args.server.as_deref() {
        if let Err(err) = shell.context().set_server(Some(server)) {
            eprintln!("{err}");
        }
    }
    if let Some(path) = args.path.as_deref() {
        if let Err(err) = shell.context().cd(Some(path), true) {
            eprintln!("{err}");
        }
    }

    let mut lines = editor::ReadlineSource::new()?;
    shell.read_execute_loop(&mut lines);
    Ok(())
}

mod actions;

use std::io;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    // Optional; RUST_LOG may come from here.
    let _ = dotenvy::dotenv();
    init_tracing();

    let app = actions::build_app()?;
    let argv: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    tracing::debug!(args = ?argv, "dispatching");

    let status = app.main(&argv);
    tracing::debug!(status, "finished");
    std::process::exit(status);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

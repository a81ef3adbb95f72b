//! Session Timeline - Binary Entry Point
//!
//! Composition root: builds the one `SessionHistory` for this session, serves
//! it over stdio, and flushes it on Ctrl+C / SIGTERM or end of input.

use std::io;
use std::sync::Arc;

use session_timeline::types::TimelineResult;
use session_timeline::{HistoryConfig, HistoryServer, SessionHistory};
use tracing_subscriber::EnvFilter;

fn main() -> TimelineResult<()> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = HistoryConfig::from_env()?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        key = %config.storage_key,
        autosave = config.autosave,
        "starting {} v{}",
        session_timeline::NAME,
        session_timeline::VERSION
    );

    let history = Arc::new(SessionHistory::new(config));

    let on_signal = Arc::clone(&history);
    ctrlc::set_handler(move || {
        tracing::info!("shutdown signal received, flushing session history");
        on_signal.flush();
        std::process::exit(0);
    })?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut server = HistoryServer::new(Arc::clone(&history), stdin.lock(), stdout.lock());
    let handled = server.run()?;

    tracing::info!(requests = handled, "input closed, flushing session history");
    history.flush();
    Ok(())
}

//! Tracing setup for pipeline runs.
//!
//! Every stage runs inside a `stage{number,name}` span, so each line a stage logs (row counts,
//! skipped records, elapsed ms) carries the stage it came from.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Send logs to stderr so `train` and `run` can print the evaluation report alone on stdout.
///
/// `RUST_LOG` overrides the default `info` level, e.g. `RUST_LOG=spoiler_scope::nlp=debug` to see
/// extraction progress. A second call is a no-op.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_level(true)
        .with_line_number(true)
        .with_file(true)
        .with_thread_ids(false)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(fmt_layer).try_init()?;

    tracing::debug!("tracing initialised");
    Ok(())
}

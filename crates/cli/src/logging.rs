//! Tracing subscriber setup.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::render::Format;

/// Install the global subscriber, writing to stderr.
///
/// Warnings by default, debug with `--verbose`, errors only with `--quiet`
/// or when JSON output is requested so stdout and stderr stay clean for
/// tooling.
pub(crate) fn initialize_logging(verbose: bool, quiet: bool, format: Format) -> Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else if quiet || format == Format::Json {
        Level::ERROR
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

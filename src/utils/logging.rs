use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "DEPS_LOG";

/// Diagnostics go to stderr so they never interleave with download progress.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::builder()
            .with_default_directive(Level::WARN.into())
            .with_env_var(LOG_ENV)
            .from_env_lossy()
    };

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

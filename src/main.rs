use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use build_deps::commands;
use build_deps::core::config::{FetchConfig, DEFAULT_BACKOFF_SECS, DEFAULT_RETRIES};
use build_deps::utils::logging;

#[derive(Parser)]
#[clap(name = "brave-deps")]
#[clap(about = "Download and unpack build dependencies")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Retries after a failed download attempt
    #[clap(long, global = true, default_value_t = DEFAULT_RETRIES)]
    retries: u32,

    /// Seconds to wait before the first retry, doubled on each retry
    #[clap(long, global = true, default_value_t = DEFAULT_BACKOFF_SECS)]
    backoff: u64,

    /// Enable debug logging
    #[clap(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download an archive and extract it into a directory
    Unpack {
        /// Archive URL (.zip, otherwise gzip-compressed tar)
        url: String,
        /// Directory to extract into
        output_dir: PathBuf,
        /// Only extract tarball entries whose path starts with this prefix
        #[clap(long)]
        prefix: Option<String>,
    },
    /// Download the goma client for this host
    Goma {
        /// Source root; the client lands in <SRC_ROOT>/build/goma
        #[clap(long, default_value = ".")]
        src_root: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = FetchConfig::default()
        .with_retries(cli.retries)
        .with_initial_backoff(Duration::from_secs(cli.backoff));

    let result = match cli.command {
        Commands::Unpack {
            url,
            output_dir,
            prefix,
        } => commands::unpack::unpack(&url, &output_dir, prefix.as_deref(), config)
            .map_err(|e| anyhow::anyhow!(e)),
        Commands::Goma { src_root } => commands::goma::download_goma(&src_root, config)
            .map_err(|e| anyhow::anyhow!(commands::goma::failure_message(&e))),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_named_brave_deps() {
        Cli::command().debug_assert();
        assert_eq!(Cli::command().get_name(), "brave-deps");
    }

    #[test]
    fn test_unpack_accepts_prefix() {
        let cli = Cli::try_parse_from([
            "brave-deps",
            "unpack",
            "https://example.com/pkg.tar.gz",
            "out",
            "--prefix",
            "lib/",
        ])
        .unwrap();
        match cli.command {
            Commands::Unpack { prefix, .. } => assert_eq!(prefix.as_deref(), Some("lib/")),
            Commands::Goma { .. } => panic!("parsed as goma"),
        }
    }
}

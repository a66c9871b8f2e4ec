//! Standalone goma client downloader
//!
//! Same as `brave-deps goma`, kept as its own binary for build scripts that call it
//! directly. Exits 0 on hosts without a prebuilt client.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use build_deps::commands::goma;
use build_deps::core::config::FetchConfig;
use build_deps::utils::logging;

#[derive(Parser)]
#[clap(name = "download-goma")]
#[clap(about = "Download the Brave goma client")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Source root; the client lands in <SRC_ROOT>/build/goma
    #[clap(long, default_value = ".")]
    src_root: PathBuf,

    /// Enable debug logging
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = goma::download_goma(&cli.src_root, FetchConfig::default()) {
        println!("{}", goma::failure_message(&e));
        std::process::exit(1);
    }

    Ok(())
}

use crate::core::{config::FetchConfig, install::Installer};
use crate::error::Result;
use std::path::Path;

pub fn unpack(
    url: &str,
    output_dir: &Path,
    path_prefix: Option<&str>,
    config: FetchConfig,
) -> Result<()> {
    let installer = Installer::new(config)?;
    if installer.install_archive(url, output_dir, path_prefix)? {
        println!("Unpacked {url} into {}", output_dir.display());
    } else {
        println!("{} is already up to date", output_dir.display());
    }
    Ok(())
}

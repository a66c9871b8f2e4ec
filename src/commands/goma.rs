use crate::core::{config::FetchConfig, install::Installer, platform};
use crate::error::{DepsError, Result};
use std::path::{Path, PathBuf};

/// Where the goma client is unpacked, relative to the source root.
pub fn goma_dir(src_root: &Path) -> PathBuf {
    src_root.join("build").join("goma")
}

/// Fetches the goma client for this host into `<src_root>/build/goma`.
/// Hosts without a prebuilt client are a no-op.
pub fn download_goma(src_root: &Path, config: FetchConfig) -> Result<()> {
    let Some(url) = platform::host_goma_client_url() else {
        tracing::debug!(
            "No goma client for {}/{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        return Ok(());
    };

    Installer::new(config)?.install_archive(&url, &goma_dir(src_root), None)?;
    Ok(())
}

/// The line printed when [`download_goma`] fails. A 404 gets a hint, since it
/// usually means no client was published for this host.
pub fn failure_message(error: &DepsError) -> String {
    if error.is_not_found() {
        format!("Failed to download Brave goma: {error} (no client published for this platform)")
    } else {
        format!("Failed to download Brave goma: {error}")
    }
}

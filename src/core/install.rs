//! Download-and-unpack of a single archive into a destination directory,
//! skipped when the destination's stored ETag is still current.

use crate::core::archive::{self, ArchiveKind};
use crate::core::cache;
use crate::core::config::FetchConfig;
use crate::core::fetch::{FetchOutcome, Fetcher, HttpTransport, Sleeper, ThreadSleeper, Transport};
use crate::error::{DepsError, Result};
use crate::utils::fs;
use std::io::{Seek, SeekFrom};
use std::path::Path;

pub struct Installer<T = HttpTransport, S = ThreadSleeper> {
    fetcher: Fetcher<T, S>,
}

impl Installer {
    pub fn new(config: FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(config)?,
        })
    }
}

impl<T: Transport, S: Sleeper> Installer<T, S> {
    pub fn with_fetcher(fetcher: Fetcher<T, S>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Fetcher<T, S> {
        &self.fetcher
    }

    /// Downloads the archive at `url` and extracts it into `output_dir`.
    ///
    /// With `path_prefix`, only tarball entries whose path starts with the
    /// prefix are extracted. Zip archives are always extracted whole, so a
    /// prefix with a `.zip` URL is refused before anything is downloaded.
    ///
    /// Returns `false` when the stored ETag matched and nothing was done.
    pub fn install_archive(
        &self,
        url: &str,
        output_dir: &Path,
        path_prefix: Option<&str>,
    ) -> Result<bool> {
        let kind = ArchiveKind::from_url(url);
        if kind == ArchiveKind::Zip && path_prefix.is_some() {
            return Err(DepsError::PrefixWithZip {
                url: url.to_string(),
            });
        }

        let mut staging = tempfile::tempfile()?;
        let old_etag = cache::read_etag(output_dir);

        let outcome = self
            .fetcher
            .fetch(url, &mut staging, old_etag.as_deref())?;
        match &outcome {
            FetchOutcome::Unchanged => {
                tracing::debug!("{} is up to date", output_dir.display());
                return Ok(false);
            }
            FetchOutcome::Downloaded { bytes, .. } => {
                tracing::debug!("Downloaded {bytes} bytes from {url}");
            }
        }

        fs::ensure_dir_exists(output_dir)?;
        staging.seek(SeekFrom::Start(0))?;

        match kind {
            ArchiveKind::Zip => {
                archive::extract_zip(&mut staging, output_dir)?;
            }
            ArchiveKind::TarGz => {
                archive::extract_tar_gz(&mut staging, output_dir, path_prefix)?;
            }
        }

        if let Some(etag) = outcome.etag().filter(|etag| !etag.is_empty()) {
            cache::write_etag(output_dir, etag);
        }
        Ok(true)
    }
}

use crate::error::{DepsError, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tar::{Archive, Entry, EntryType};
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// `.zip` URLs are zip archives; everything else is taken to be a
    /// gzip-compressed tarball.
    pub fn from_url(url: &str) -> Self {
        if url.ends_with(".zip") {
            ArchiveKind::Zip
        } else {
            ArchiveKind::TarGz
        }
    }
}

/// Extracts every entry of a zip archive into `destination`. Returns the
/// number of entries written.
pub fn extract_zip<R: Read + Seek>(reader: R, destination: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| DepsError::extraction_error(destination, e.to_string()))?;
    let mut written = 0;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| DepsError::extraction_error(destination, e.to_string()))?;
        let outpath = match file.enclosed_name() {
            Some(path) => destination.join(path),
            None => {
                tracing::warn!("Skipping zip entry with unsafe path: {}", file.name());
                continue;
            }
        };

        if file.is_dir() {
            std::fs::create_dir_all(&outpath)?;
        } else {
            if let Some(p) = outpath.parent() {
                if !p.exists() {
                    std::fs::create_dir_all(p)?;
                }
            }
            let mut outfile = File::create(&outpath)?;
            std::io::copy(&mut file, &mut outfile)?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
            }
        }
        written += 1;
    }

    tracing::debug!("Extracted {written} zip entries into {}", destination.display());
    Ok(written)
}

/// Extracts a gzip-compressed tarball into `destination`. With a
/// `path_prefix`, only entries whose archive path starts with it are
/// extracted.
pub fn extract_tar_gz<R: Read>(
    reader: R,
    destination: &Path,
    path_prefix: Option<&str>,
) -> Result<()> {
    let mut archive = Archive::new(GzDecoder::new(reader));
    archive.set_preserve_permissions(true);

    let Some(prefix) = path_prefix else {
        archive
            .unpack(destination)
            .map_err(|e| DepsError::extraction_error(destination, e.to_string()))?;
        tracing::debug!("Extracted tarball into {}", destination.display());
        return Ok(());
    };

    // Directory modes are applied last, as `Archive::unpack` does, so a
    // read-only directory does not block the files inside it.
    let mut directories = Vec::new();
    let mut written = 0;

    let entries = archive
        .entries()
        .map_err(|e| DepsError::extraction_error(destination, e.to_string()))?;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| DepsError::extraction_error(destination, e.to_string()))?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        if !name.starts_with(prefix) {
            continue;
        }

        if entry.header().entry_type() == EntryType::Directory {
            directories.push((name, entry));
            continue;
        }
        written += unpack_entry(&mut entry, &name, destination)?;
    }
    for (name, mut dir) in directories {
        written += unpack_entry(&mut dir, &name, destination)?;
    }

    tracing::debug!(
        "Extracted {written} tar entries under '{prefix}' into {}",
        destination.display()
    );
    Ok(())
}

fn unpack_entry<R: Read>(
    entry: &mut Entry<'_, R>,
    name: &str,
    destination: &Path,
) -> Result<usize> {
    let unpacked = entry
        .unpack_in(destination)
        .map_err(|e| DepsError::extraction_error(destination, format!("{name}: {e}")))?;
    if !unpacked {
        tracing::warn!("Skipping tar entry with unsafe path: {name}");
        return Ok(0);
    }
    Ok(1)
}

//! Archive extraction.
//!
//! Archives are unpacked in full; the caller decides which binary inside the
//! tree to run.

use nsv_action_core::{AcquisitionError, ArchiveFormat};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Unpack `archive` into `dest`, choosing the decoder from `filename`.
///
/// # Errors
///
/// Returns [`AcquisitionError::Extraction`] for unknown or corrupt archives
/// and [`AcquisitionError::CacheWrite`] when `dest` cannot be written.
pub fn extract_archive(archive: &Path, filename: &str, dest: &Path) -> Result<(), AcquisitionError> {
    let format = ArchiveFormat::from_filename(filename)
        .ok_or_else(|| AcquisitionError::extraction(filename, "unsupported archive format"))?;

    std::fs::create_dir_all(dest).map_err(|e| AcquisitionError::cache_write(dest, e))?;
    let file = File::open(archive).map_err(|e| AcquisitionError::cache_write(archive, e))?;
    let reader = BufReader::new(file);

    debug!(?archive, ?dest, ?format, "Extracting archive");
    match format {
        ArchiveFormat::TarGz => extract_tar_gz(reader, filename, dest),
        ArchiveFormat::Zip => extract_zip(reader, filename, dest),
    }
}

fn extract_tar_gz(reader: BufReader<File>, filename: &str, dest: &Path) -> Result<(), AcquisitionError> {
    let decoder = flate2::read::GzDecoder::new(reader);
    let mut archive = tar::Archive::new(decoder);
    archive.set_preserve_permissions(true);
    archive
        .unpack(dest)
        .map_err(|e| AcquisitionError::extraction(filename, e.to_string()))
}

fn extract_zip(reader: BufReader<File>, filename: &str, dest: &Path) -> Result<(), AcquisitionError> {
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| AcquisitionError::extraction(filename, e.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| AcquisitionError::extraction(filename, e.to_string()))?;

        // Entries escaping the destination are skipped
        let Some(relative) = entry.enclosed_name() else {
            debug!(name = entry.name(), "Skipping unsafe zip entry");
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| AcquisitionError::cache_write(&outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AcquisitionError::cache_write(parent, e))?;
        }
        let mut out =
            File::create(&outpath).map_err(|e| AcquisitionError::cache_write(&outpath, e))?;
        std::io::copy(&mut entry, &mut out)
            .map_err(|e| AcquisitionError::extraction(filename, e.to_string()))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                .map_err(|e| AcquisitionError::cache_write(&outpath, e))?;
        }
    }

    Ok(())
}

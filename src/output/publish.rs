//! Writing the document and its gzip copy to disk.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};

/// Paths and sizes of the files produced by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedFiles {
    pub xml_path: PathBuf,
    pub gz_path: PathBuf,
    pub xml_bytes: u64,
    pub gz_bytes: u64,
}

/// Gzip-compress a buffer in memory
pub fn gzip(bytes: &[u8]) -> AppResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .map_err(|e| AppError::output("<gzip>", e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| AppError::output("<gzip>", e.to_string()))
}

/// Write `xml` verbatim to `xml_path` and its gzip copy to `gz_path`.
///
/// The compressed copy is produced before anything touches the disk, and
/// each file is renamed into place only once fully written.
pub fn publish(xml: &[u8], xml_path: &Path, gz_path: &Path) -> AppResult<PublishedFiles> {
    let compressed = gzip(xml)?;

    write_atomically(xml_path, xml)?;
    write_atomically(gz_path, &compressed)?;

    info!(
        "Wrote {} ({} bytes) and {} ({} bytes)",
        xml_path.display(),
        xml.len(),
        gz_path.display(),
        compressed.len()
    );

    Ok(PublishedFiles {
        xml_path: xml_path.to_path_buf(),
        gz_path: gz_path.to_path_buf(),
        xml_bytes: xml.len() as u64,
        gz_bytes: compressed.len() as u64,
    })
}

/// Temp file in the destination directory, then rename over the target
fn write_atomically(path: &Path, contents: &[u8]) -> AppResult<()> {
    let target = path.display().to_string();
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(directory)
        .map_err(|e| AppError::output(&target, format!("creating temp file: {e}")))?;
    temp.write_all(contents)
        .map_err(|e| AppError::output(&target, e.to_string()))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| AppError::output(&target, e.to_string()))?;
    temp.persist(path)
        .map_err(|e| AppError::output(&target, e.error.to_string()))?;

    debug!("Persisted {}", path.display());
    Ok(())
}

//! Backing file reclamation.

use std::io;
use std::path::Path;
use tracing::debug;

/// Outcome of deleting a session's file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactReclaim {
    /// The file existed and was deleted.
    Removed,
    /// The file was already gone.
    Missing,
}

/// Delete `filename` from `download_dir`.
///
/// Only bare file names are accepted so a recorded name can never point
/// outside the download directory.
pub async fn reclaim_artifact(download_dir: &Path, filename: &str) -> io::Result<ArtifactReclaim> {
    if Path::new(filename).file_name().and_then(|n| n.to_str()) != Some(filename) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a bare file name: {}", filename),
        ));
    }

    let path = download_dir.join(filename);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Artifact removed");
            Ok(ArtifactReclaim::Removed)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ArtifactReclaim::Missing),
        Err(e) => Err(e),
    }
}

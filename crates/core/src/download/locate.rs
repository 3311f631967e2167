//! Discovery of the file an engine produced.

use std::io;
use std::path::{Path, PathBuf};

/// Extensions of in-progress or scratch files that are never the final output.
const PARTIAL_EXTENSIONS: &[&str] = &["part", "ytdl", "tmp", "temp"];

/// Find the file produced for `file_id` inside `download_dir`.
///
/// The engine chooses the extension, so the path it reports is trusted only
/// when it names an existing file directly inside `download_dir` whose stem
/// is `file_id`. Otherwise the directory is scanned for such a file.
pub async fn locate_output(
    download_dir: &Path,
    file_id: &str,
    reported: Option<&Path>,
) -> io::Result<Option<PathBuf>> {
    if let Some(name) = reported.and_then(Path::file_name) {
        let candidate = download_dir.join(name);
        if is_output_of(&candidate, file_id) && tokio::fs::try_exists(&candidate).await? {
            return Ok(Some(candidate));
        }
    }

    let mut entries = match tokio::fs::read_dir(download_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut matches = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_output_of(&path, file_id) && entry.file_type().await?.is_file() {
            matches.push(path);
        }
    }

    matches.sort();
    Ok(matches.into_iter().next())
}

fn is_output_of(path: &Path, file_id: &str) -> bool {
    let stem_matches = path.file_stem().and_then(|s| s.to_str()) == Some(file_id);
    let partial = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PARTIAL_EXTENSIONS.contains(&ext));
    stem_matches && !partial
}

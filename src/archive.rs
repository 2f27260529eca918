//! Repository archive download and extraction
//!
//! Both platforms serve branch snapshots as gzipped tarballs with a single
//! platform-named top-level directory. The response body is streamed into a
//! staging file (never buffered whole in memory), then extracted with the
//! top-level component stripped. Staging file and response body are
//! scope-owned, so they are released on every exit path.

use crate::error::{ForgeLinkError, Result};
use flate2::read::GzDecoder;
use futures::TryStreamExt;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Stream an archive response to disk and extract it into `destination`
pub(crate) async fn extract_archive_response(
    response: reqwest::Response,
    destination: &Path,
) -> Result<()> {
    let staging = tempfile::tempdir()?;
    let archive_path = staging.path().join("archive.tar.gz");

    let mut file = tokio::fs::File::create(&archive_path).await?;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.try_next().await? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    drop(file);

    extract_tar_gz(&archive_path, destination).await
}

/// Extract a gzipped tarball into `destination`, stripping the single
/// top-level directory component from every entry
pub async fn extract_tar_gz(archive_path: &Path, destination: &Path) -> Result<()> {
    tokio::fs::create_dir_all(destination).await?;

    // tar and flate2 are blocking readers
    let archive_path = archive_path.to_path_buf();
    let destination = destination.to_path_buf();
    tokio::task::spawn_blocking(move || unpack_stripped(&archive_path, &destination))
        .await
        .map_err(|e| ForgeLinkError::Other(format!("Archive extraction task failed: {}", e)))?
}

fn unpack_stripped(archive_path: &Path, destination: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let stripped: PathBuf = {
            let path = entry.path()?;
            path.components().skip(1).collect()
        };
        // The bare top-level directory entry strips to nothing
        if stripped.as_os_str().is_empty() {
            continue;
        }
        // Entries must not escape the destination
        if stripped
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            continue;
        }

        let target = destination.join(&stripped);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry.unpack(&target)?;
    }

    debug!(destination = %destination.display(), "Archive extraction complete");
    Ok(())
}

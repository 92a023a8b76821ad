//! File system helpers for staging artifacts.

use crate::exporter::error::{Error, ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Creates all directories of `path`; succeeds when it already exists.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .fs_context("failed to create directory", path)
}

/// Removes a file, ignoring one that is already gone.
pub async fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("failed to remove file", path),
    }
}

/// Removes a file or directory tree, ignoring one that is already gone.
pub async fn remove_path_if_exists(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).fs_context("failed to inspect path", path),
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .await
            .fs_context("failed to remove directory", path)
    } else {
        remove_file_if_exists(path).await
    }
}

/// Copies a regular file, creating the destination's parent directories.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(Error::Fs {
            context: "source file does not exist",
            path: from.to_path_buf(),
            error: io::Error::from(io::ErrorKind::NotFound),
        });
    }
    if let Some(dest_dir) = to.parent() {
        create_dir_all(dest_dir).await?;
    }
    fs::copy(from, to).await.fs_context("failed to copy file", from)?;
    Ok(())
}

/// Recursively copies a directory, preserving symlinks.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        return Err(Error::Fs {
            context: "source directory does not exist",
            path: from.to_path_buf(),
            error: io::Error::from(io::ErrorKind::NotFound),
        });
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).fs_context("failed to create directory", parent)?;
        }

        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry.map_err(|e| Error::GenericError(format!("walking {}: {e}", from.display())))?;
            let rel_path = entry
                .path()
                .strip_prefix(&from)
                .map_err(|e| Error::GenericError(e.to_string()))?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_symlink() {
                let target = std::fs::read_link(entry.path())
                    .fs_context("failed to read symlink", entry.path())?;
                symlink(&target, &dest_path).fs_context("failed to create symlink", &dest_path)?;
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path)
                    .fs_context("failed to create directory", &dest_path)?;
            } else {
                std::fs::copy(entry.path(), &dest_path)
                    .fs_context("failed to copy file", entry.path())?;
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| Error::GenericError(format!("Directory copy task panicked: {e}")))?
}

/// Copies a built artifact (plain file or bundle directory) to `to`,
/// replacing anything already there.
pub async fn copy_artifact(from: &Path, to: &Path) -> Result<()> {
    let metadata = fs::metadata(from)
        .await
        .fs_context("built binary not found", from)?;
    remove_path_if_exists(to).await?;
    if metadata.is_dir() {
        copy_dir(from, to).await
    } else {
        copy_file(from, to).await
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copy_artifact_replaces_existing_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("build/Harp.vst3/Contents");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("new"), b"1").unwrap();

        let dest = dir.path().join("Packaging/linux/Harp.vst3");
        std::fs::create_dir_all(dest.join("Contents")).unwrap();
        std::fs::write(dest.join("Contents/stale"), b"0").unwrap();

        copy_artifact(&dir.path().join("build/Harp.vst3"), &dest)
            .await
            .unwrap();
        assert!(dest.join("Contents/new").exists());
        assert!(!dest.join("Contents/stale").exists());
    }

    #[tokio::test]
    async fn missing_origin_is_fs_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_artifact(&dir.path().join("nope.so"), &dir.path().join("out.so"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fs { .. }));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("License.txt");
        std::fs::write(&file, "x").unwrap();
        remove_file_if_exists(&file).await.unwrap();
        remove_file_if_exists(&file).await.unwrap();
        assert!(!file.exists());
    }
}

use crate::shared::Result;
use std::fs;
use std::path::{Component, Path};

/// Largest manifest or config file read from disk (100 MB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum number of bytes unpacked from a single package tarball (512 MB)
pub const MAX_UNPACKED_SIZE: u64 = 512 * 1024 * 1024;

/// Refuses to `operation` on `path` when it is a symbolic link.
///
/// Uses `symlink_metadata` so the link itself is inspected, never its target.
pub fn validate_not_symlink(path: &Path, operation: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Cannot {} {}: {}", operation, path.display(), e))?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: refusing to {} {} because it is a symbolic link",
            operation,
            path.display()
        );
    }

    Ok(())
}

/// Reads a text file after rejecting symlinks, non-regular files and
/// anything larger than `max_size`.
pub fn read_regular_file(path: &Path, file_description: &str, max_size: u64) -> Result<String> {
    let metadata = fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {} metadata: {}", file_description, e))?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} ({}) is a symbolic link and will not be read",
            file_description,
            path.display()
        );
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    validate_file_size(metadata.len(), path, max_size)?;

    fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file_description, e))
}

/// Fails when `file_size` exceeds `max_size`
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes, limit {} bytes)",
            path.display(),
            file_size,
            max_size
        );
    }
    Ok(())
}

/// Validates the path of an archive entry before it is unpacked
///
/// # Security
/// Rejects absolute paths and `..` components so that an entry can never be
/// written outside the extraction directory.
pub fn validate_archive_entry(path: &Path) -> Result<()> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                anyhow::bail!(
                    "Security: archive entry {} escapes the extraction directory",
                    path.display()
                );
            }
        }
    }
    Ok(())
}

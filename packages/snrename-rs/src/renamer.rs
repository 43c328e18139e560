//! Builds the new file name from extracted serials and moves the image to it.
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;
use tokio::fs;

/// Stem used when no serial number was found.
pub const UNNAMED: &str = "unnamed";

/// Joins multiple serials in one file name.
pub const SERIAL_SEPARATOR: &str = " + ";

/// What to do when the destination name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Leave the file alone and report an error.
    Fail,
    /// Replace the existing file.
    Overwrite,
    /// Append ` (1)`, ` (2)`, ... to the name until it is free.
    #[default]
    Suffix,
}

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("{} has no parent folder", .0.display())]
    NoParent(PathBuf),
    #[error("destination {} already exists", .0.display())]
    Exists(PathBuf),
    #[error("file name of {} is not valid UTF-8", .0.display())]
    InvalidName(PathBuf),
    #[error("new name {} leaves the image's folder", .0.display())]
    OutsideFolder(PathBuf),
    #[error("failed to rename {} to {}: {source}", .from.display(), .to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Text after the last `.` of a file name, or the whole name when it has none.
pub fn extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx + 1..],
        None => file_name,
    }
}

fn target_stem(serials: &[String]) -> String {
    if serials.is_empty() {
        UNNAMED.to_string()
    } else {
        serials.join(SERIAL_SEPARATOR)
    }
}

/// The file name an image should carry given its serials. No filesystem access.
///
/// Non-UTF-8 names are converted lossily here; [`resolve_destination`] refuses them.
pub fn target_file_name(path: &Path, serials: &[String]) -> String {
    let original = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.{}", target_stem(serials), extension(&original))
}

async fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok()
}

/// Where `path` would be moved to under `policy`, without moving it.
///
/// A destination equal to `path` itself is always accepted. The destination
/// always stays in the folder of `path`.
pub async fn resolve_destination(
    path: &Path,
    serials: &[String],
    policy: CollisionPolicy,
) -> Result<PathBuf, RenameError> {
    let dir = path
        .parent()
        .ok_or_else(|| RenameError::NoParent(path.to_path_buf()))?;
    let original = path
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| RenameError::InvalidName(path.to_path_buf()))?;
    let stem = target_stem(serials);
    let ext = extension(original);

    let dest = dir.join(format!("{}.{}", stem, ext));
    if dest.parent() != Some(dir) {
        return Err(RenameError::OutsideFolder(dest));
    }

    if dest == path || !occupied(&dest).await {
        return Ok(dest);
    }

    match policy {
        CollisionPolicy::Overwrite => Ok(dest),
        CollisionPolicy::Fail => Err(RenameError::Exists(dest)),
        CollisionPolicy::Suffix => {
            let mut n: u32 = 1;
            loop {
                let candidate = dir.join(format!("{} ({}).{}", stem, n, ext));
                if candidate == path || !occupied(&candidate).await {
                    return Ok(candidate);
                }
                n += 1;
            }
        }
    }
}

/// Moves `path` within its folder to the name derived from `serials`.
/// Returns the new path.
pub async fn rename_image(
    path: &Path,
    serials: &[String],
    policy: CollisionPolicy,
) -> Result<PathBuf, RenameError> {
    let dest = resolve_destination(path, serials, policy).await?;
    if dest == path {
        return Ok(dest);
    }

    fs::rename(path, &dest).await.map_err(|source| RenameError::Io {
        from: path.to_path_buf(),
        to: dest.clone(),
        source,
    })?;
    Ok(dest)
}

//! Depth-first enumeration of the files under a root folder.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("cannot open folder {}: {source}", .path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a folder", .0.display())]
    NotADirectory(PathBuf),
}

/// Lazy iterator over the absolute paths of files below a root folder.
///
/// Within each directory files are yielded before subdirectories are entered,
/// both sorted by name. With a limit, at most that many non-directory entries
/// are considered per directory; the rest of that directory's files are never
/// visited.
pub struct ImageWalker {
    entries: walkdir::IntoIter,
    limit: Option<usize>,
    per_dir: HashMap<PathBuf, usize>,
}

/// Starts a walk at `root`. A missing or unreadable root is an error here;
/// problems further down the tree are logged and skipped during iteration.
pub fn walk(root: impl AsRef<Path>, limit: Option<usize>) -> Result<ImageWalker, WalkError> {
    let root = root.as_ref();
    let root = std::fs::canonicalize(root).map_err(|source| WalkError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    if !root.is_dir() {
        return Err(WalkError::NotADirectory(root));
    }

    // sorting makes walkdir read each directory in full before yielding from it,
    // so files renamed while the walk is running are not visited twice
    let entries = WalkDir::new(&root)
        .min_depth(1)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter();

    Ok(ImageWalker {
        entries,
        limit,
        per_dir: HashMap::new(),
    })
}

fn is_directory(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

impl ImageWalker {
    /// Counts `entry` against its directory's limit; false once the limit is reached.
    fn admit(&mut self, entry: &DirEntry) -> bool {
        let Some(limit) = self.limit else {
            return true;
        };
        let parent = entry.path().parent().map(Path::to_path_buf).unwrap_or_default();
        let seen = self.per_dir.entry(parent).or_insert(0);
        if *seen >= limit {
            return false;
        }
        *seen += 1;
        true
    }
}

impl Iterator for ImageWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if is_directory(&entry) || !self.admit(&entry) {
                continue;
            }

            // broken symlinks, sockets and the like
            if !entry.path().is_file() {
                tracing::debug!(path = %entry.path().display(), "skipping non-file entry");
                continue;
            }

            return Some(entry.into_path());
        }
    }
}

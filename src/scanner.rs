use crate::error::SweepError;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf, is_separator};
use walkdir::WalkDir;

/// Rejects names that could never equal a single path component.
pub fn validate_name(name: &str) -> Result<(), SweepError> {
    if name.is_empty() || name == "." || name == ".." || name.chars().any(is_separator) {
        return Err(SweepError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Walks `root` depth-first in file-name order and returns every directory
/// named exactly `name` (case-sensitive, raw OS string comparison).
///
/// A matched directory is never descended into. Symlinks are not followed,
/// so a symlink pointing at a directory is neither matched nor walked.
/// Subtrees that cannot be read contribute nothing; only a root that cannot
/// be enumerated is an error.
pub fn find_matches(root: &Path, name: &str) -> Result<Vec<PathBuf>, SweepError> {
    let meta = fs::metadata(root).map_err(|e| SweepError::io(root, e))?;
    if !meta.is_dir() {
        return Err(SweepError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    fs::read_dir(root).map_err(|e| SweepError::io(root, e))?;

    let target = OsStr::new(name);
    let mut found = Vec::new();
    let mut it = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    loop {
        let entry = match it.next() {
            None => break,
            Some(Ok(entry)) => entry,
            Some(Err(err)) => {
                tracing::debug!(
                    path = ?err.path(),
                    depth = err.depth(),
                    error = %err,
                    "skipping unreadable entry"
                );
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        if entry.file_name() == target {
            tracing::debug!(path = %entry.path().display(), "match");
            found.push(entry.into_path());
            it.skip_current_dir();
        }
    }

    Ok(found)
}

/// Drops every path that lies strictly inside another path of the list,
/// keeping the original order of the survivors.
pub fn remove_nested(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let keep: Vec<bool> = paths
        .iter()
        .map(|path| {
            !paths
                .iter()
                .any(|other| other != path && path.starts_with(other))
        })
        .collect();

    paths
        .into_iter()
        .zip(keep)
        .filter_map(|(path, keep)| keep.then_some(path))
        .collect()
}

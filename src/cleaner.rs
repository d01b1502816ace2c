use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const UNITS: [&str; 5] = ["bytes", "KB", "MB", "GB", "TB"];

pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Sum of the lengths of all regular files under `path`.
///
/// Symlinks are not followed and count as zero. Anything that cannot be
/// read or stat'ed is skipped rather than failing the whole computation.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(path = ?err.path(), error = %err, "size: skipping entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedMatch {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl SizedMatch {
    /// Sizes `path` once; the value is what gets credited if it is deleted.
    pub fn measure(path: PathBuf) -> Self {
        let size_bytes = dir_size(&path);
        Self { path, size_bytes }
    }

    pub fn size_human(&self) -> String {
        format_size(self.size_bytes)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReclamationResult {
    pub deleted: usize,
    pub failed: usize,
    pub bytes_freed: u64,
}

impl ReclamationResult {
    pub fn freed_human(&self) -> String {
        format_size(self.bytes_freed)
    }
}

/// Recursive removal where a path that is already gone counts as removed.
pub fn remove_match(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

pub fn reclaim(matches: &[SizedMatch], confirmed: bool) -> ReclamationResult {
    reclaim_with(matches, confirmed, remove_match, |_, _| {})
}

/// Deletes every match when `confirmed`, crediting the size captured before
/// deletion began. A failure is counted and the next match is attempted.
pub fn reclaim_with<R, F>(
    matches: &[SizedMatch],
    confirmed: bool,
    mut remove: R,
    mut on_item: F,
) -> ReclamationResult
where
    R: FnMut(&Path) -> io::Result<()>,
    F: FnMut(&SizedMatch, Result<(), &io::Error>),
{
    let mut result = ReclamationResult::default();
    if !confirmed {
        return result;
    }

    for item in matches {
        match remove(&item.path) {
            Ok(()) => {
                result.deleted += 1;
                result.bytes_freed += item.size_bytes;
                on_item(item, Ok(()));
            }
            Err(error) => {
                tracing::debug!(path = %item.path.display(), %error, "delete failed");
                result.failed += 1;
                on_item(item, Err(&error));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sized_dir(root: &Path, name: &str, bytes: usize) -> SizedMatch {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("pkg")).unwrap();
        fs::write(dir.join("pkg/blob"), vec![0u8; bytes]).unwrap();
        SizedMatch::measure(dir)
    }

    #[test]
    fn format_size_uses_binary_units() {
        assert_eq!(format_size(0), "0.00 bytes");
        assert_eq!(format_size(600), "600.00 bytes");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
        assert_eq!(format_size(2048 * 1024u64.pow(4)), "2048.00 TB");
    }

    #[test]
    fn dir_size_sums_regular_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("a"), vec![0u8; 100]).unwrap();
        fs::write(dir.join("b"), vec![0u8; 200]).unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/c"), vec![0u8; 300]).unwrap();
        fs::create_dir(dir.join("empty")).unwrap();

        assert_eq!(dir_size(dir), 600);
    }

    #[cfg(unix)]
    #[test]
    fn dir_size_ignores_symlinks() {
        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("outside");
        let dir = temp.path().join("dir");
        fs::create_dir_all(&outside).unwrap();
        fs::create_dir_all(&dir).unwrap();
        fs::write(outside.join("big"), vec![0u8; 4096]).unwrap();
        fs::write(dir.join("small"), vec![0u8; 10]).unwrap();
        std::os::unix::fs::symlink(outside.join("big"), dir.join("big-link")).unwrap();
        std::os::unix::fs::symlink(&outside, dir.join("dir-link")).unwrap();

        assert_eq!(dir_size(&dir), 10);
    }

    #[cfg(unix)]
    #[test]
    fn dir_size_skips_unreadable_directories() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("a"), vec![0u8; 100]).unwrap();
        let locked = dir.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden"), vec![0u8; 50]).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let bypassed = fs::read_dir(&locked).is_ok();
        let size = dir_size(dir);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if bypassed {
            return;
        }

        assert_eq!(size, 100);
    }

    #[test]
    fn dir_size_of_missing_path_is_zero() {
        let temp = TempDir::new().unwrap();
        assert_eq!(dir_size(&temp.path().join("gone")), 0);
    }

    #[test]
    fn unconfirmed_reclaim_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let matches = vec![sized_dir(temp.path(), "a", 10)];

        let result = reclaim(&matches, false);
        assert_eq!((result.deleted, result.failed, result.bytes_freed), (0, 0, 0));
        assert!(matches[0].path.exists());
    }

    #[test]
    fn reclaim_deletes_and_credits_sizes() {
        let temp = TempDir::new().unwrap();
        let matches = vec![
            sized_dir(temp.path(), "a", 10),
            sized_dir(temp.path(), "b", 20),
        ];

        let result = reclaim(&matches, true);
        assert_eq!(result.deleted, 2);
        assert_eq!(result.failed, 0);
        assert_eq!(result.bytes_freed, 30);
        assert!(matches.iter().all(|m| !m.path.exists()));
    }

    #[test]
    fn deleting_a_missing_path_counts_as_success() {
        let temp = TempDir::new().unwrap();
        let matches = vec![sized_dir(temp.path(), "a", 10)];

        let first = reclaim(&matches, true);
        let second = reclaim(&matches, true);
        assert_eq!((first.deleted, first.failed), (1, 0));
        assert_eq!((second.deleted, second.failed), (1, 0));
    }

    #[test]
    fn one_failure_does_not_stop_the_rest() {
        let temp = TempDir::new().unwrap();
        let matches = vec![
            sized_dir(temp.path(), "a", 100),
            sized_dir(temp.path(), "b", 200),
            sized_dir(temp.path(), "c", 300),
        ];
        let locked = matches[1].path.clone();
        let remover = |path: &Path| {
            if path == locked {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            } else {
                remove_match(path)
            }
        };

        let mut seen = Vec::new();
        let result = reclaim_with(&matches, true, remover, |item, outcome| {
            seen.push((item.path.clone(), outcome.is_ok()));
        });

        assert_eq!(result.deleted, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.bytes_freed, matches[0].size_bytes + matches[2].size_bytes);
        assert_eq!(
            seen,
            vec![
                (matches[0].path.clone(), true),
                (matches[1].path.clone(), false),
                (matches[2].path.clone(), true),
            ]
        );
        assert!(matches[1].path.exists());
    }

    #[test]
    fn freed_bytes_use_the_size_captured_before_deletion() {
        let temp = TempDir::new().unwrap();
        let item = sized_dir(temp.path(), "a", 50);
        fs::write(item.path.join("late"), vec![0u8; 1000]).unwrap();

        let result = reclaim(std::slice::from_ref(&item), true);
        assert_eq!(result.bytes_freed, 50);
    }
}

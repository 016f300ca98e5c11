use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::path::normalize_relative;

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("project directory not found: {}", .0.display())]
    RootNotFound(PathBuf),
}

/// One regular file found beneath the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub absolute: PathBuf,
    /// Forward-slash path relative to the root; doubles as the remote key.
    pub relative: String,
}

/// Why a directory entry was not yielded as a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Symlinks are never followed; the link itself is not uploaded either.
    Symlink,
    /// Sockets, FIFOs, device nodes.
    Special,
    /// The file name is not valid UTF-8, so no unambiguous remote key
    /// exists for it.
    NonUnicode,
}

/// One step of a directory walk.
#[derive(Debug)]
pub enum WalkItem {
    File(WalkEntry),
    Skipped { path: PathBuf, reason: SkipReason },
    Unreadable { path: PathBuf, error: io::Error },
}

/// Depth-first walker over the regular files beneath a root directory.
///
/// Each [`iter`](Self::iter) call re-reads the filesystem; nothing is
/// cached between walks, so a fresh iterator always reflects the current
/// tree and partial consumption is well-defined. Yield order within one
/// walk is stable but not significant.
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    root: PathBuf,
}

impl DirectoryWalker {
    /// Checked up front so the local failure surfaces before any remote
    /// call is attempted.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, WalkError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(WalkError::RootNotFound(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iter(&self) -> Walk {
        Walk {
            root: self.root.clone(),
            dirs: vec![self.root.clone()],
            queue: VecDeque::new(),
        }
    }
}

/// Lazy iterator produced by [`DirectoryWalker::iter`].
pub struct Walk {
    root: PathBuf,
    dirs: Vec<PathBuf>,
    queue: VecDeque<WalkItem>,
}

impl Walk {
    fn enqueue(&mut self, entry: fs::DirEntry) {
        let path = entry.path();

        // file_type on the DirEntry does not follow symlinks, which is
        // exactly the policy: report the link, never traverse it.
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(error) => {
                self.queue.push_back(WalkItem::Unreadable { path, error });
                return;
            }
        };

        if file_type.is_symlink() {
            self.queue.push_back(WalkItem::Skipped {
                path,
                reason: SkipReason::Symlink,
            });
        } else if file_type.is_dir() {
            self.dirs.push(path);
        } else if file_type.is_file() {
            let Ok(relative) = path.strip_prefix(&self.root) else {
                // Entries always live under the root we started from.
                return;
            };
            match normalize_relative(relative) {
                Some(relative) => self.queue.push_back(WalkItem::File(WalkEntry {
                    absolute: path,
                    relative,
                })),
                None => self.queue.push_back(WalkItem::Skipped {
                    path,
                    reason: SkipReason::NonUnicode,
                }),
            }
        } else {
            self.queue.push_back(WalkItem::Skipped {
                path,
                reason: SkipReason::Special,
            });
        }
    }
}

impl Iterator for Walk {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        loop {
            if let Some(item) = self.queue.pop_front() {
                return Some(item);
            }

            let dir = self.dirs.pop()?;
            match fs::read_dir(&dir) {
                Ok(entries) => {
                    for entry in entries {
                        match entry {
                            Ok(entry) => self.enqueue(entry),
                            Err(error) => self.queue.push_back(WalkItem::Unreadable {
                                path: dir.clone(),
                                error,
                            }),
                        }
                    }
                }
                Err(error) => {
                    self.queue.push_back(WalkItem::Unreadable { path: dir, error });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn setup_tree(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("repo-seed-walk-{label}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("b")).unwrap();
        std::fs::write(dir.join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.join("b").join("c.txt"), "gamma").unwrap();
        dir
    }

    fn file_keys(walker: &DirectoryWalker) -> Vec<String> {
        let mut keys: Vec<String> = walker
            .iter()
            .filter_map(|item| match item {
                WalkItem::File(entry) => Some(entry.relative),
                _ => None,
            })
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn yields_every_regular_file_with_normalized_keys() {
        let root = setup_tree("basic");
        let walker = DirectoryWalker::new(&root).unwrap();

        assert_eq!(file_keys(&walker), vec!["a.txt", "b/c.txt"]);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn iter_is_restartable() {
        let root = setup_tree("restart");
        let walker = DirectoryWalker::new(&root).unwrap();

        let first = file_keys(&walker);
        let second = file_keys(&walker);
        assert_eq!(first, second);

        // A fresh walk reflects filesystem changes made in between.
        std::fs::write(root.join("d.txt"), "delta").unwrap();
        assert_eq!(file_keys(&walker), vec!["a.txt", "b/c.txt", "d.txt"]);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_root_fails_before_iteration() {
        let result = DirectoryWalker::new("/definitely/not/a/real/dir");
        assert!(matches!(result, Err(WalkError::RootNotFound(_))));
    }

    #[test]
    fn file_as_root_fails() {
        let root = setup_tree("file-root");
        let result = DirectoryWalker::new(root.join("a.txt"));
        assert!(matches!(result, Err(WalkError::RootNotFound(_))));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped_not_followed() {
        let root = setup_tree("symlink");
        std::os::unix::fs::symlink(root.join("a.txt"), root.join("link.txt")).unwrap();

        let walker = DirectoryWalker::new(&root).unwrap();
        assert_eq!(file_keys(&walker), vec!["a.txt", "b/c.txt"]);

        let skipped: Vec<PathBuf> = walker
            .iter()
            .filter_map(|item| match item {
                WalkItem::Skipped {
                    path,
                    reason: SkipReason::Symlink,
                } => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec![root.join("link.txt")]);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_file_names_are_skipped_not_mangled() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let root = setup_tree("non-utf8");
        // Distinct names that only differ in bytes lossy conversion would
        // erase; uploading either under a mangled key would be ambiguous.
        let odd = root.join(OsString::from_vec(b"a\xff.txt".to_vec()));
        std::fs::write(&odd, "opaque").unwrap();

        let walker = DirectoryWalker::new(&root).unwrap();
        assert_eq!(file_keys(&walker), vec!["a.txt", "b/c.txt"]);

        let skipped: Vec<PathBuf> = walker
            .iter()
            .filter_map(|item| match item {
                WalkItem::Skipped {
                    path,
                    reason: SkipReason::NonUnicode,
                } => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec![odd]);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = std::env::temp_dir().join("repo-seed-walk-empty");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let walker = DirectoryWalker::new(&dir).unwrap();
        assert_eq!(walker.iter().count(), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }
}

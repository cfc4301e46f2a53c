//! Directory traversal with a configurable depth.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::{DirEntry, WalkDir};

/// How deep to descend from a root path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WalkDepth {
    /// Immediate children of a directory, or the file itself.
    #[default]
    OneLevel,
    /// The whole tree including the root.
    Recursive,
}

impl WalkDepth {
    #[must_use]
    pub const fn from_recurse(recurse: bool) -> Self {
        if recurse { Self::Recursive } else { Self::OneLevel }
    }
}

/// A single visited filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

impl FileCandidate {
    fn from_entry(entry: &DirEntry) -> Self {
        Self {
            path: entry.path().to_path_buf(),
            name: crate::os_str_to_string(entry.file_name()),
            is_dir: entry.file_type().is_dir(),
        }
    }
}

/// Walk `root` with the given depth, yielding entries sorted by name.
///
/// Errors are yielded in place so the caller decides when to stop.
/// Symbolic links below the root are not followed.
pub fn walk(root: &Path, depth: WalkDepth) -> impl Iterator<Item = Result<FileCandidate>> + use<> {
    let walker = match depth {
        WalkDepth::OneLevel => {
            // Skip the directory itself, but keep a single file root.
            let min_depth = usize::from(root.is_dir());
            WalkDir::new(root).min_depth(min_depth).max_depth(1)
        }
        WalkDepth::Recursive => WalkDir::new(root),
    };
    let root = root.to_path_buf();
    walker.sort_by_file_name().into_iter().map(move |entry| {
        entry
            .map(|entry| FileCandidate::from_entry(&entry))
            .with_context(|| format!("Failed to walk {}", root.display()))
    })
}

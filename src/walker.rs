use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::Result;

/// A discovered prompt file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Path relative to the root directory.
    pub relative_path: PathBuf,
    /// Absolute path below the canonicalized root.
    pub absolute_path: PathBuf,
    /// Size in bytes at discovery time.
    pub size: u64,
}

/// Decides which files under a root are prompt candidates.
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// Lower-cased extensions without the leading dot.
    extensions: Vec<String>,
    ignore: GlobSet,
    max_file_size: Option<u64>,
}

impl FileFilter {
    /// Build a filter. Invalid ignore patterns are logged and skipped.
    pub fn new(
        extensions: &[String],
        ignore_patterns: &[String],
        max_file_size: Option<u64>,
    ) -> Self {
        let extensions = extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        let mut builder = GlobSetBuilder::new();
        for pattern in ignore_patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => {
                    tracing::warn!(%pattern, error = %e, "skipping invalid ignore pattern");
                }
            }
        }
        let ignore = builder.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignore patterns disabled");
            GlobSet::empty()
        });

        Self {
            extensions,
            ignore,
            max_file_size,
        }
    }

    /// Whether `name` (a single path segment) or `relative_path` hits an
    /// ignore pattern.
    fn is_ignored(&self, name: &std::ffi::OsStr, relative_path: &Path) -> bool {
        self.ignore.is_match(name) || self.ignore.is_match(relative_path)
    }

    /// An empty extension list accepts every file.
    fn has_allowed_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
    }

    fn within_size(&self, size: u64) -> bool {
        self.max_file_size.is_none_or(|max| size <= max)
    }
}

/// Recursively walk `root` and discover prompt candidates.
///
/// Fails only if `root` itself cannot be resolved or listed. Unreadable
/// subdirectories and entries are logged and skipped. Results are sorted by
/// relative path.
pub fn discover_files(
    root: &Path,
    filter: &FileFilter,
) -> Result<Vec<DiscoveredFile>> {
    let canonical_root = root.canonicalize()?;
    let entries = std::fs::read_dir(&canonical_root)?;

    let mut results = Vec::new();
    walk_entries(&canonical_root, entries, filter, &mut results);
    results.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(results)
}

fn walk_dir(
    root: &Path,
    current: &Path,
    filter: &FileFilter,
    results: &mut Vec<DiscoveredFile>,
) {
    match std::fs::read_dir(current) {
        Ok(entries) => walk_entries(root, entries, filter, results),
        Err(e) => {
            tracing::warn!(
                path = %current.display(),
                error = %e,
                "skipping unreadable directory"
            );
        }
    }
}

fn walk_entries(
    root: &Path,
    entries: std::fs::ReadDir,
    filter: &FileFilter,
    results: &mut Vec<DiscoveredFile>,
) {
    for entry in entries {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();
        let relative_path = path.strip_prefix(root).unwrap_or(&path);

        if filter.is_ignored(&entry.file_name(), relative_path) {
            tracing::trace!(path = %relative_path.display(), "ignored");
            continue;
        }

        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            walk_dir(root, &path, filter, results);
            continue;
        }

        // Symlinked files are followed; symlinked directories are not, which
        // keeps the walk free of cycles.
        let is_file = if file_type.is_symlink() {
            path.canonicalize().is_ok_and(|resolved| resolved.is_file())
        } else {
            file_type.is_file()
        };

        if !is_file || !filter.has_allowed_extension(&path) {
            continue;
        }

        if let Some(file) = make_discovered(relative_path, &path, filter) {
            results.push(file);
        }
    }
}

fn make_discovered(
    relative_path: &Path,
    absolute_path: &Path,
    filter: &FileFilter,
) -> Option<DiscoveredFile> {
    let size = match std::fs::metadata(absolute_path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            tracing::debug!(
                path = %absolute_path.display(),
                error = %e,
                "skipping file that vanished during discovery"
            );
            return None;
        }
    };

    if !filter.within_size(size) {
        tracing::debug!(
            path = %relative_path.display(),
            size,
            "skipping file over the size limit"
        );
        return None;
    }

    Some(DiscoveredFile {
        relative_path: relative_path.to_path_buf(),
        absolute_path: absolute_path.to_path_buf(),
        size,
    })
}

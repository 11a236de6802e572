use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use serde::Serialize;

use crate::{
    error::{Error, Result},
    front_matter::{self, Metadata},
    walker::{self, DiscoveredFile, FileFilter},
};

/// A single prompt loaded from disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    /// File name without extension.
    pub name: String,
    /// Where the prompt was read from.
    pub path: PathBuf,
    /// Body text with any front matter removed.
    pub content: String,
    /// Decoded front matter, if the file had a usable block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Projection of the `tags` front matter key.
    pub tags: Vec<String>,
}

impl Prompt {
    /// Build a prompt from a file path and its raw text.
    pub fn from_raw(path: &Path, raw: &str) -> Self {
        let parsed = front_matter::parse(raw);
        let tags = parsed
            .metadata
            .as_ref()
            .map(front_matter::tags)
            .unwrap_or_default();

        Self {
            name: prompt_name(path),
            path: path.to_path_buf(),
            content: parsed.content,
            metadata: parsed.metadata,
            tags,
        }
    }
}

/// Options for one loader invocation.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Allowed extensions, with or without the leading dot. Empty allows all.
    pub extensions: Vec<String>,
    /// Glob patterns matched against each path segment below a root.
    pub ignore_patterns: Vec<String>,
    /// Files larger than this many bytes are skipped. `None` means no limit.
    pub max_file_size: Option<u64>,
}

/// Load every prompt under `dirs`.
///
/// Roots are walked in the given order. A root that cannot be listed is
/// logged and skipped; the call fails only if every root fails. Files that
/// vanish or cannot be read are skipped. When two files share a name
/// (case-insensitively), the first one discovered wins.
pub fn load_from_dirs<P: AsRef<Path>>(
    dirs: &[P],
    options: &LoadOptions,
) -> Result<Vec<Prompt>> {
    let filter = FileFilter::new(
        &options.extensions,
        &options.ignore_patterns,
        options.max_file_size,
    );

    let mut discovered: Vec<DiscoveredFile> = Vec::new();
    let mut failures = Vec::new();

    for dir in dirs {
        let dir = dir.as_ref();
        match walker::discover_files(dir, &filter) {
            Ok(files) => {
                tracing::debug!(
                    root = %dir.display(),
                    count = files.len(),
                    "discovered prompt files"
                );
                discovered.extend(files);
            }
            Err(e) => {
                tracing::warn!(
                    root = %dir.display(),
                    error = %e,
                    "skipping unreadable prompt directory"
                );
                match e {
                    Error::Io(io) => failures.push((dir.to_path_buf(), io)),
                    other => return Err(other),
                }
            }
        }
    }

    if !dirs.is_empty() && failures.len() == dirs.len() {
        return Err(Error::NoReadableRoots { roots: failures });
    }

    Ok(read_prompts(&discovered))
}

/// Read discovered files into prompts, dropping files that can no longer be
/// read and later duplicates of a name.
fn read_prompts(discovered: &[DiscoveredFile]) -> Vec<Prompt> {
    // Read in parallel; `collect` keeps discovery order.
    let loaded: Vec<Prompt> = discovered
        .par_iter()
        .filter_map(read_prompt)
        .collect();

    let mut seen = HashSet::new();
    loaded
        .into_iter()
        .filter(|prompt| {
            let first = seen.insert(prompt.name.to_lowercase());
            if !first {
                tracing::debug!(
                    name = %prompt.name,
                    path = %prompt.path.display(),
                    "skipping prompt with duplicate name"
                );
            }
            first
        })
        .collect()
}

/// Find a prompt by name, ignoring case.
pub fn find_by_name<'a>(prompts: &'a [Prompt], name: &str) -> Option<&'a Prompt> {
    let wanted = name.to_lowercase();
    prompts.iter().find(|p| p.name.to_lowercase() == wanted)
}

fn read_prompt(file: &DiscoveredFile) -> Option<Prompt> {
    let bytes = match std::fs::read(&file.absolute_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(
                path = %file.absolute_path.display(),
                error = %e,
                "skipping unreadable prompt file"
            );
            return None;
        }
    };
    let raw = String::from_utf8_lossy(&bytes);
    Some(Prompt::from_raw(&file.absolute_path, &raw))
}

fn prompt_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

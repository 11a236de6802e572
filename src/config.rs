use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    error::Result,
    prompt::LoadOptions,
    search::SearchOptions,
};

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "PROMPTM_CONFIG";

/// Settings file looked up relative to the working directory.
const LOCAL_CONFIG: &str = "config/settings.toml";

/// User settings, read from `settings.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prompt directories searched when `--dir` is not given.
    #[serde(rename = "default_dir", deserialize_with = "one_or_many")]
    pub default_dirs: Vec<String>,
    pub file_system: FileSystemSettings,
    pub fuzzy_search: FuzzySearchSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileSystemSettings {
    pub extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
    /// `0` disables the size limit.
    pub max_file_size_kb: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FuzzySearchSettings {
    /// `0` or negative returns every match.
    pub max_results: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_dirs: vec![default_prompt_dir()],
            file_system: FileSystemSettings::default(),
            fuzzy_search: FuzzySearchSettings::default(),
        }
    }
}

impl Default for FileSystemSettings {
    fn default() -> Self {
        Self {
            extensions: vec![".md".into(), ".txt".into()],
            ignore_patterns: vec![".DS_Store".into(), ".git".into()],
            max_file_size_kb: 512,
        }
    }
}

impl Default for FuzzySearchSettings {
    fn default() -> Self {
        Self { max_results: 20 }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults.
    ///
    /// A missing file silently yields defaults; an unreadable or invalid
    /// one is logged and also yields defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Self::default();
        }

        match Self::read(path) {
            Ok(settings) => {
                tracing::debug!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring invalid settings file"
                );
                Self::default()
            }
        }
    }

    /// Read and parse a settings file, reporting every failure.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Prompt directories with `~/` expanded.
    pub fn prompt_dirs(&self) -> Vec<PathBuf> {
        self.default_dirs.iter().map(|d| expand_home(d)).collect()
    }

    pub fn load_options(&self) -> LoadOptions {
        let kb = self.file_system.max_file_size_kb;
        LoadOptions {
            extensions: self.file_system.extensions.clone(),
            ignore_patterns: self.file_system.ignore_patterns.clone(),
            max_file_size: (kb > 0).then(|| kb.saturating_mul(1024)),
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_results: usize::try_from(self.fuzzy_search.max_results)
                .unwrap_or(0),
        }
    }
}

/// Resolve the settings file path, in order of priority:
/// 1. An explicit path (from --config)
/// 2. The PROMPTM_CONFIG environment variable
/// 3. `config/settings.toml` in the working directory, if it exists
/// 4. The XDG config directory (~/.config/promptm/settings.toml)
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(val) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(val);
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.is_file() {
        return local;
    }

    xdg::BaseDirectories::with_prefix("promptm")
        .get_config_home()
        .map(|home| home.join("settings.toml"))
        .unwrap_or(local)
}

/// Split a comma separated `--dir` value into trimmed, non-empty paths.
pub fn split_dirs(input: &str) -> Vec<PathBuf> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(expand_home)
        .collect()
}

/// Expand a leading `~/` (or a bare `~`) to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

fn default_prompt_dir() -> String {
    xdg::BaseDirectories::with_prefix("promptm")
        .get_data_home()
        .map(|home| home.join("prompts").to_string_lossy().into_owned())
        .unwrap_or_else(|| "prompts".to_string())
}

/// Accept either `default_dir = "a"` or `default_dir = ["a", "b"]`.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(dir) => vec![dir],
        OneOrMany::Many(dirs) => dirs,
    })
}

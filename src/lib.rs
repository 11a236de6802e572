//! promptm - find and reuse text prompts stored as plain files.
//!
//! Prompts are markdown or text files, optionally starting with a YAML
//! (`---`) or TOML (`+++`) front matter block. The loader walks one or more
//! prompt directories, parses each file, and the search engine ranks the
//! result against a free-text query with a weighted fuzzy score.
//!
//! # Quick start
//!
//! ```no_run
//! use promptm::{LoadOptions, SearchOptions, load_from_dirs, search};
//!
//! let prompts = load_from_dirs(&["prompts"], &LoadOptions::default()).unwrap();
//! let options = SearchOptions { max_results: 5 };
//!
//! for prompt in search(&prompts, "code review", &options) {
//!     println!("{} ({})", prompt.name, prompt.path.display());
//! }
//! ```

pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod error;
pub mod front_matter;
pub mod fuzzy;
pub mod picker;
pub mod prompt;
pub mod search;
pub mod text_util;
pub mod walker;

pub use config::Settings;
pub use error::{Error, Result};
pub use prompt::{LoadOptions, Prompt, load_from_dirs};
pub use search::{SearchOptions, search};

//! Front matter parsing.
//!
//! A prompt file may start with a metadata block fenced by `---` lines
//! (YAML) or `+++` lines (TOML). The block is decoded into a recursive
//! [`MetaValue`] tree and removed from the prompt body. A block that cannot
//! be decoded is ignored entirely: the file keeps its original text as
//! content and carries no metadata.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use crate::text_util::trim_trailing_newlines;

/// Top-level front matter: string keys to arbitrarily nested values.
pub type Metadata = BTreeMap<String, MetaValue>;

/// A decoded front matter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<MetaValue>),
    Mapping(BTreeMap<String, MetaValue>),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Collect every non-blank leaf of this value as a string.
    ///
    /// Sequences and mappings are walked recursively; `Null` contributes
    /// nothing.
    pub fn flatten_strings(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<String>) {
        match self {
            Self::Null => {}
            Self::String(s) => {
                if !s.trim().is_empty() {
                    out.push(s.clone());
                }
            }
            Self::Bool(_) | Self::Number(_) => out.push(self.to_string()),
            Self::Sequence(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            Self::Mapping(map) => {
                for item in map.values() {
                    item.flatten_into(out);
                }
            }
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Sequence(items) => {
                let parts: Vec<String> =
                    items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Mapping(map) => {
                let parts: Vec<String> =
                    map.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

/// Result of splitting a raw prompt file.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    /// Decoded metadata, or `None` if there was no usable block.
    pub metadata: Option<Metadata>,
    /// Prompt body with the metadata block removed.
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn from_marker(line: &str) -> Option<Self> {
        match line {
            "---" => Some(Self::Yaml),
            "+++" => Some(Self::Toml),
            _ => None,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split `raw` into front matter and body.
///
/// Never fails. Without a complete block the content is `raw` minus its
/// trailing line breaks. When the block does not decode to a mapping, the
/// content is `raw` byte for byte.
pub fn parse(raw: &str) -> FrontMatter {
    let Some((format, block, body)) = split_block(raw) else {
        return FrontMatter {
            metadata: None,
            content: trim_trailing_newlines(raw).to_string(),
        };
    };

    let metadata = if block.trim().is_empty() {
        None
    } else {
        let decoded = match format {
            Format::Yaml => decode_yaml(block),
            Format::Toml => decode_toml(block),
        };
        match decoded {
            Ok(metadata) => Some(metadata),
            Err(reason) => {
                tracing::debug!(%reason, "ignoring malformed front matter");
                return FrontMatter {
                    metadata: None,
                    content: raw.to_string(),
                };
            }
        }
    };

    let content = body.trim_start_matches(['\r', '\n']);
    FrontMatter {
        metadata,
        content: trim_trailing_newlines(content).to_string(),
    }
}

/// Project the `tags` key into a flat list of strings.
///
/// A single string becomes a one-element list, a list of strings is copied,
/// and any other shape yields no tags.
pub fn tags(metadata: &Metadata) -> Vec<String> {
    match metadata.get("tags") {
        Some(MetaValue::String(tag)) => vec![tag.clone()],
        Some(MetaValue::Sequence(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Locate a fenced block at the very start of `raw`.
///
/// Returns the format, the block text between the fences and the remainder
/// after the closing fence line.
fn split_block(raw: &str) -> Option<(Format, &str, &str)> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = text.split_inclusive('\n');

    let first = lines.next()?;
    let format = Format::from_marker(first.trim_end())?;
    let block_start = first.len();

    let mut offset = block_start;
    for line in lines {
        if line.trim_end() == format.marker() {
            let block = &text[block_start..offset];
            let body = &text[offset + line.len()..];
            return Some((format, block, body));
        }
        offset += line.len();
    }

    None
}

fn decode_yaml(block: &str) -> Result<Metadata, String> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|e| e.to_string())?;
    match from_yaml(value)? {
        MetaValue::Mapping(map) => Ok(map),
        MetaValue::Null => Ok(Metadata::new()),
        other => Err(format!("expected a mapping, found `{other}`")),
    }
}

fn from_yaml(value: serde_yaml::Value) -> Result<MetaValue, String> {
    use serde_yaml::Value;

    Ok(match value {
        Value::Null => MetaValue::Null,
        Value::Bool(b) => MetaValue::Bool(b),
        Value::Number(n) => match n.as_f64() {
            Some(f) => MetaValue::Number(f),
            None => MetaValue::String(n.to_string()),
        },
        Value::String(s) => MetaValue::String(s),
        Value::Sequence(items) => MetaValue::Sequence(
            items.into_iter().map(from_yaml).collect::<Result<_, _>>()?,
        ),
        Value::Mapping(map) => {
            let mut out = BTreeMap::new();
            for (key, value) in map {
                let key = match key {
                    Value::String(s) => s,
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    other => {
                        return Err(format!(
                            "unsupported mapping key: {other:?}"
                        ));
                    }
                };
                out.insert(key, from_yaml(value)?);
            }
            MetaValue::Mapping(out)
        }
        Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

fn decode_toml(block: &str) -> Result<Metadata, String> {
    let table: toml::Table = toml::from_str(block).map_err(|e| e.to_string())?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, from_toml(value)))
        .collect())
}

fn from_toml(value: toml::Value) -> MetaValue {
    use toml::Value;

    match value {
        Value::String(s) => MetaValue::String(s),
        Value::Integer(i) => MetaValue::Number(i as f64),
        Value::Float(f) => MetaValue::Number(f),
        Value::Boolean(b) => MetaValue::Bool(b),
        Value::Datetime(dt) => MetaValue::String(dt.to_string()),
        Value::Array(items) => {
            MetaValue::Sequence(items.into_iter().map(from_toml).collect())
        }
        Value::Table(table) => MetaValue::Mapping(
            table
                .into_iter()
                .map(|(key, value)| (key, from_toml(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_BRIEF: &str = "---\n\
title: Product Brief\n\
tags: [discovery, planning]\n\
metadata:\n  audience: product\n  stage: discovery\n\
aliases:\n  - prd\n  - brief\n\
---\n\
\n\
# Product Brief\n\
\n\
Write a one-page brief.\n";

    #[test]
    fn parses_yaml_block() {
        let parsed = parse(PRODUCT_BRIEF);
        let meta = parsed.metadata.expect("metadata");

        assert_eq!(
            meta.get("title"),
            Some(&MetaValue::String("Product Brief".into()))
        );

        let MetaValue::Mapping(nested) = &meta["metadata"] else {
            panic!("expected nested mapping, got {:?}", meta["metadata"]);
        };
        assert_eq!(nested.len(), 2);
        assert_eq!(nested["audience"].as_str(), Some("product"));
        assert_eq!(nested["stage"].as_str(), Some("discovery"));

        assert_eq!(
            meta["aliases"],
            MetaValue::Sequence(vec![
                MetaValue::String("prd".into()),
                MetaValue::String("brief".into()),
            ])
        );
    }

    #[test]
    fn content_excludes_block() {
        let parsed = parse(PRODUCT_BRIEF);
        assert_eq!(
            parsed.content,
            "# Product Brief\n\nWrite a one-page brief."
        );
        assert!(!parsed.content.contains("title:"));
    }

    #[test]
    fn no_block_keeps_text_without_trailing_newlines() {
        let raw = "# Code Review\n\nReview this diff.\n\r\n";
        let parsed = parse(raw);
        assert!(parsed.metadata.is_none());
        assert_eq!(parsed.content, "# Code Review\n\nReview this diff.");
    }

    #[test]
    fn malformed_block_keeps_original_text() {
        let raw = "---\ntitle: [unclosed\n  : :\n---\nBody\n\n";
        let parsed = parse(raw);
        assert!(parsed.metadata.is_none());
        assert_eq!(parsed.content, raw);
    }

    #[test]
    fn non_mapping_block_is_malformed() {
        let raw = "---\n- just\n- a list\n---\nBody\n";
        let parsed = parse(raw);
        assert!(parsed.metadata.is_none());
        assert_eq!(parsed.content, raw);
    }

    #[test]
    fn unclosed_block_is_not_front_matter() {
        let raw = "---\ntitle: Lost\nBody without a closing fence\n";
        let parsed = parse(raw);
        assert!(parsed.metadata.is_none());
        assert_eq!(parsed.content, raw.trim_end());
    }

    #[test]
    fn empty_block_is_stripped_without_metadata() {
        let parsed = parse("---\n---\nBody\n");
        assert!(parsed.metadata.is_none());
        assert_eq!(parsed.content, "Body");
    }

    #[test]
    fn crlf_fences_are_recognized() {
        let parsed = parse("---\r\ntitle: Windows\r\n---\r\nBody\r\n");
        let meta = parsed.metadata.expect("metadata");
        assert_eq!(meta["title"].as_str(), Some("Windows"));
        assert_eq!(parsed.content, "Body");
    }

    #[test]
    fn parses_toml_block() {
        let raw = "+++\ntitle = \"Release Notes\"\ntags = \"release\"\n\
                   version = 3\n[owner]\nteam = \"docs\"\n+++\nSummarize.\n";
        let parsed = parse(raw);
        let meta = parsed.metadata.expect("metadata");
        assert_eq!(meta["title"].as_str(), Some("Release Notes"));
        assert_eq!(meta["version"], MetaValue::Number(3.0));
        let MetaValue::Mapping(owner) = &meta["owner"] else {
            panic!("expected table");
        };
        assert_eq!(owner["team"].as_str(), Some("docs"));
        assert_eq!(parsed.content, "Summarize.");
    }

    #[test]
    fn deep_nesting_is_preserved() {
        let raw = "---\na:\n  b:\n    c:\n      - d: [1, true, x]\n---\n";
        let meta = parse(raw).metadata.expect("metadata");
        assert_eq!(meta["a"].flatten_strings(), vec!["1", "true", "x"]);
    }

    #[test]
    fn numeric_keys_are_stringified() {
        let meta = parse("---\n2024: launch\n---\n").metadata.unwrap();
        assert_eq!(meta["2024"].as_str(), Some("launch"));
    }

    #[test]
    fn tags_single_string_is_promoted() {
        let meta = parse("---\ntags: planning\n---\n").metadata.unwrap();
        assert_eq!(tags(&meta), vec!["planning"]);
    }

    #[test]
    fn tags_sequence_is_copied() {
        let meta = parse(PRODUCT_BRIEF).metadata.unwrap();
        assert_eq!(tags(&meta), vec!["discovery", "planning"]);
    }

    #[test]
    fn tags_other_shapes_are_empty() {
        let meta = parse("---\ntags:\n  kind: x\n---\n").metadata.unwrap();
        assert!(tags(&meta).is_empty());
        assert!(meta.contains_key("tags"));

        let mixed = parse("---\ntags: [a, 2]\n---\n").metadata.unwrap();
        assert!(tags(&mixed).is_empty());
    }

    #[test]
    fn flatten_skips_blank_and_null() {
        let value = MetaValue::Sequence(vec![
            MetaValue::Null,
            MetaValue::String("  ".into()),
            MetaValue::String("kept".into()),
            MetaValue::Number(1.5),
        ]);
        assert_eq!(value.flatten_strings(), vec!["kept", "1.5"]);
    }
}

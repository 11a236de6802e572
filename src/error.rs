use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not parse settings: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("could not load any prompts: {}", describe_roots(.roots))]
    NoReadableRoots { roots: Vec<(PathBuf, std::io::Error)> },

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("no prompts available in the prompt directories")]
    NoPrompts,

    #[error("no prompts found for query {query:?}")]
    NoMatches { query: String },

    #[error("selection cancelled")]
    Cancelled,

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

fn describe_roots(roots: &[(PathBuf, std::io::Error)]) -> String {
    roots
        .iter()
        .map(|(path, err)| format!("{}: {err}", path.display()))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_readable_roots_lists_every_root() {
        let err = Error::NoReadableRoots {
            roots: vec![
                (
                    PathBuf::from("/missing/a"),
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                ),
                (
                    PathBuf::from("/missing/b"),
                    std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                ),
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("could not load any prompts"));
        assert!(msg.contains("/missing/a"));
        assert!(msg.contains("/missing/b"));
    }

    #[test]
    fn no_prompts_does_not_mention_a_query() {
        let msg = Error::NoPrompts.to_string();
        assert_eq!(msg, "no prompts available in the prompt directories");
    }

    #[test]
    fn no_matches_quotes_query() {
        let err = Error::NoMatches {
            query: "prdct".to_string(),
        };
        assert_eq!(err.to_string(), "no prompts found for query \"prdct\"");
    }
}

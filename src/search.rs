use std::io::Write;

use serde::Serialize;

use crate::{
    front_matter::Metadata,
    fuzzy::fuzzy_score,
    prompt::Prompt,
    text_util::{CONTENT_SNIPPET_MAX_CHARS, normalize, snippet_for_search},
};

const NAME_WEIGHT: f64 = 5.0;
const ALIAS_WEIGHT: f64 = 4.0;
const TAG_WEIGHT: f64 = 3.0;
const METADATA_WEIGHT: f64 = 2.0;

const CONTENT_NORMALIZED_HIT: f64 = 1.5;
const CONTENT_RAW_HIT: f64 = 1.0;
const CONTENT_FUZZY_FACTOR: f64 = 0.75;

/// Prompts scoring at or below this are dropped from query results.
pub const MIN_SCORE: f64 = 0.25;

/// Scores closer than this are treated as tied and ordered by name.
pub const SCORE_EPSILON: f64 = 1e-6;

/// Front matter keys with a dedicated signal, excluded from the generic
/// metadata signal (compared case-insensitively).
const DEDICATED_KEYS: &[&str] = &["tags", "aliases"];

/// Options for one ranking invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of results. `0` returns every match.
    pub max_results: usize,
}

/// A prompt together with its aggregate relevance score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedPrompt<'a> {
    pub prompt: &'a Prompt,
    pub score: f64,
}

/// Rank `prompts` against `query` and return the ordered, truncated matches.
///
/// An empty (or all-whitespace) query returns every prompt sorted by name.
pub fn search(
    prompts: &[Prompt],
    query: &str,
    options: &SearchOptions,
) -> Vec<Prompt> {
    rank(prompts, query, options)
        .into_iter()
        .map(|ranked| ranked.prompt.clone())
        .collect()
}

/// Like [`search`], but keeps the scores and borrows the prompts.
///
/// Scores are `0.0` on the empty-query path.
pub fn rank<'a>(
    prompts: &'a [Prompt],
    query: &str,
    options: &SearchOptions,
) -> Vec<RankedPrompt<'a>> {
    let trimmed = query.trim();

    let mut ranked: Vec<RankedPrompt<'a>> = if trimmed.is_empty() {
        let mut all: Vec<_> = prompts
            .iter()
            .map(|prompt| RankedPrompt { prompt, score: 0.0 })
            .collect();
        all.sort_by(|a, b| a.prompt.name.cmp(&b.prompt.name));
        all
    } else {
        let normalized = normalize(trimmed);
        let mut matches: Vec<_> = prompts
            .iter()
            .map(|prompt| RankedPrompt {
                prompt,
                score: aggregate_score(prompt, trimmed, &normalized),
            })
            .filter(|ranked| ranked.score > MIN_SCORE)
            .collect();
        sort_ranked(&mut matches);
        matches
    };

    if options.max_results > 0 {
        ranked.truncate(options.max_results);
    }
    ranked
}

/// Weighted sum of the name, alias, tag, metadata and content signals.
///
/// `raw_query` is the trimmed query as typed; `normalized_query` is its
/// [`normalize`]d form.
pub fn aggregate_score(
    prompt: &Prompt,
    raw_query: &str,
    normalized_query: &str,
) -> f64 {
    let metadata = prompt.metadata.as_ref();

    let name = fuzzy_score(normalized_query, &normalize(&prompt.name));
    let alias =
        best_score(metadata.map(aliases).unwrap_or_default(), normalized_query);
    let tag = best_score(prompt.tags.iter().cloned(), normalized_query);
    let other = best_score(
        metadata.map(other_metadata).unwrap_or_default(),
        normalized_query,
    );
    let content =
        content_relevance(&prompt.content, raw_query, normalized_query);

    name * NAME_WEIGHT
        + alias * ALIAS_WEIGHT
        + tag * TAG_WEIGHT
        + other * METADATA_WEIGHT
        + content
}

/// Score descending, then name ascending among scores within
/// [`SCORE_EPSILON`] of each other.
///
/// Neighbours whose gap is at most the epsilon form one run, and each run
/// is ordered by name.
fn sort_ranked(ranked: &mut [RankedPrompt<'_>]) {
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    let runs = ranked.chunk_by_mut(|a, b| a.score - b.score <= SCORE_EPSILON);
    for run in runs {
        run.sort_by(|a, b| a.prompt.name.cmp(&b.prompt.name));
    }
}

fn best_score<I>(values: I, normalized_query: &str) -> f64
where
    I: IntoIterator<Item = String>,
{
    values
        .into_iter()
        .map(|value| fuzzy_score(normalized_query, &normalize(&value)))
        .fold(0.0, f64::max)
}

fn aliases(metadata: &Metadata) -> Vec<String> {
    metadata
        .get("aliases")
        .map(|value| value.flatten_strings())
        .unwrap_or_default()
}

fn other_metadata(metadata: &Metadata) -> Vec<String> {
    metadata
        .iter()
        .filter(|(key, _)| {
            !DEDICATED_KEYS.contains(&key.to_lowercase().as_str())
        })
        .flat_map(|(_, value)| value.flatten_strings())
        .collect()
}

/// Body-text signal.
///
/// A normalized substring hit in the first [`CONTENT_SNIPPET_MAX_CHARS`]
/// characters beats a case-insensitive raw hit anywhere, which beats a
/// discounted fuzzy match.
fn content_relevance(
    content: &str,
    raw_query: &str,
    normalized_query: &str,
) -> f64 {
    if content.is_empty() || normalized_query.is_empty() {
        return 0.0;
    }

    let content_norm =
        normalize(snippet_for_search(content, CONTENT_SNIPPET_MAX_CHARS));
    if content_norm.is_empty() {
        return 0.0;
    }

    if content_norm.contains(normalized_query) {
        return CONTENT_NORMALIZED_HIT;
    }

    if content
        .to_lowercase()
        .contains(&raw_query.to_lowercase())
    {
        return CONTENT_RAW_HIT;
    }

    fuzzy_score(normalized_query, &content_norm) * CONTENT_FUZZY_FACTOR
}

/// Write `name<TAB>path` for each result.
pub fn format_human<W: Write + ?Sized>(
    results: &[RankedPrompt<'_>],
    out: &mut W,
) -> std::io::Result<()> {
    for r in results {
        writeln!(out, "{}\t{}", r.prompt.name, r.prompt.path.display())?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonResults<'a> {
    query: &'a str,
    result_count: usize,
    results: Vec<JsonResult<'a>>,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    rank: usize,
    score: f64,
    name: &'a str,
    path: String,
    tags: &'a [String],
}

/// Write results as a single JSON document.
pub fn format_json<W: Write + ?Sized>(
    results: &[RankedPrompt<'_>],
    query: &str,
    out: &mut W,
) -> crate::error::Result<()> {
    let doc = JsonResults {
        query,
        result_count: results.len(),
        results: results
            .iter()
            .enumerate()
            .map(|(i, r)| JsonResult {
                rank: i + 1,
                score: r.score,
                name: &r.prompt.name,
                path: r.prompt.path.to_string_lossy().into_owned(),
                tags: &r.prompt.tags,
            })
            .collect(),
    };
    serde_json::to_writer(&mut *out, &doc)?;
    writeln!(out)?;
    Ok(())
}

//! Line-oriented prompt picker.
//!
//! Shows a numbered list of ranked prompts and reads one line at a time:
//! a number selects, other text re-ranks with that text as the query, and
//! an empty line or end of input cancels.

use std::io::{BufRead, Write};

use crate::{
    error::{Error, Result},
    prompt::Prompt,
    search::{self, RankedPrompt, SearchOptions},
};

/// Let the user choose one prompt, starting from `query`.
pub fn pick<'a, R, W>(
    prompts: &'a [Prompt],
    query: &str,
    options: &SearchOptions,
    input: &mut R,
    output: &mut W,
) -> Result<&'a Prompt>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    let mut query = query.trim().to_string();

    loop {
        let ranked = search::rank(prompts, &query, options);
        render(&ranked, &query, output)?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::Cancelled);
        }
        let answer = line.trim();
        if answer.is_empty() {
            return Err(Error::Cancelled);
        }

        match answer.parse::<usize>() {
            Ok(n) if (1..=ranked.len()).contains(&n) => {
                return Ok(ranked[n - 1].prompt);
            }
            Ok(n) => {
                writeln!(output, "No entry {n}.")?;
            }
            Err(_) => query = answer.to_string(),
        }
    }
}

fn render<W: Write + ?Sized>(
    ranked: &[RankedPrompt<'_>],
    query: &str,
    output: &mut W,
) -> Result<()> {
    if ranked.is_empty() {
        writeln!(output, "No prompts match {query:?}.")?;
        write!(output, "Type a new query, or press Enter to cancel: ")?;
        output.flush()?;
        return Ok(());
    }

    if !query.is_empty() {
        writeln!(output, "Matches for {query:?}:")?;
    }
    for (i, r) in ranked.iter().enumerate() {
        if r.prompt.tags.is_empty() {
            writeln!(output, "{:>3}. {}", i + 1, r.prompt.name)?;
        } else {
            writeln!(
                output,
                "{:>3}. {}  [{}]",
                i + 1,
                r.prompt.name,
                r.prompt.tags.join(", ")
            )?;
        }
    }
    write!(
        output,
        "Select 1-{}, type to refine, or press Enter to cancel: ",
        ranked.len()
    )?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, path::Path};

    use super::*;

    fn corpus() -> Vec<Prompt> {
        vec![
            Prompt::from_raw(Path::new("/p/code-review.md"), "Review the diff."),
            Prompt::from_raw(
                Path::new("/p/product-brief.md"),
                "---\ntags: [discovery]\n---\nWrite a brief.",
            ),
            Prompt::from_raw(Path::new("/p/release-notes.md"), "Summarize."),
        ]
    }

    fn run(input: &str, query: &str) -> (Result<String>, String) {
        let prompts = corpus();
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let picked = pick(
            &prompts,
            query,
            &SearchOptions::default(),
            &mut reader,
            &mut out,
        )
        .map(|p| p.name.clone());
        (picked, String::from_utf8(out).unwrap())
    }

    #[test]
    fn number_selects_from_sorted_list() {
        let (picked, out) = run("1\n", "");
        assert_eq!(picked.unwrap(), "code-review");
        assert!(out.contains("  1. code-review"));
        assert!(out.contains("  2. product-brief  [discovery]"));
    }

    #[test]
    fn text_refines_the_query() {
        let (picked, out) = run("brief\n1\n", "");
        assert_eq!(picked.unwrap(), "product-brief");
        assert!(out.contains("Matches for \"brief\":"));
    }

    #[test]
    fn seeded_query_is_used() {
        let (picked, _) = run("1\n", "release");
        assert_eq!(picked.unwrap(), "release-notes");
    }

    #[test]
    fn out_of_range_asks_again() {
        let (picked, out) = run("9\n2\n", "");
        assert_eq!(picked.unwrap(), "product-brief");
        assert!(out.contains("No entry 9."));
    }

    #[test]
    fn empty_line_cancels() {
        let (picked, _) = run("\n", "");
        assert!(matches!(picked, Err(Error::Cancelled)));
    }

    #[test]
    fn eof_cancels() {
        let (picked, _) = run("", "");
        assert!(matches!(picked, Err(Error::Cancelled)));
    }

    #[test]
    fn no_match_prompts_for_new_query() {
        let (picked, out) = run("qqqzzz\nreview\n1\n", "");
        assert_eq!(picked.unwrap(), "code-review");
        assert!(out.contains("No prompts match \"qqqzzz\"."));
    }
}

//! Subcommand implementations.
//!
//! Every command takes its output streams and clipboard explicitly so the
//! binary can wire real stdio while tests pass in-memory buffers.

use std::io::{BufRead, Read, Write};

use serde::Serialize;

use crate::{
    cli::{CatArgs, ListArgs, MeshArgs, PickArgs, SearchArgs},
    clipboard::ClipboardProvider,
    config::{self, Settings},
    error::{Error, Result},
    picker,
    prompt::{self, LoadOptions, Prompt},
    search::{self, SearchOptions},
    text_util::trim_trailing_newlines,
};

/// Settings resolved once per invocation.
#[derive(Debug, Clone)]
pub struct App {
    settings: Settings,
    load_options: LoadOptions,
    search_options: SearchOptions,
    dir_override: Option<String>,
}

impl App {
    pub fn new(settings: Settings, dir_override: Option<String>) -> Self {
        Self {
            load_options: settings.load_options(),
            search_options: settings.search_options(),
            settings,
            dir_override,
        }
    }

    /// Load prompts from `--dir` if given, else the configured directories.
    pub fn load_prompts(&self) -> Result<Vec<Prompt>> {
        let dirs = match self.dir_override.as_deref() {
            Some(dirs) => config::split_dirs(dirs),
            None => self.settings.prompt_dirs(),
        };
        let prompts = prompt::load_from_dirs(&dirs, &self.load_options)?;
        tracing::debug!(count = prompts.len(), "loaded prompts");
        Ok(prompts)
    }

    /// Like [`App::load_prompts`], but an empty corpus is an error.
    fn require_prompts(&self) -> Result<Vec<Prompt>> {
        let prompts = self.load_prompts()?;
        if prompts.is_empty() {
            return Err(Error::NoPrompts);
        }
        Ok(prompts)
    }
}

/// Streams and capabilities a command may use.
pub struct Io<'a> {
    /// Answers for the interactive picker.
    pub input: &'a mut dyn BufRead,
    /// Where prompt text and listings go.
    pub out: &'a mut dyn Write,
    /// Where the picker draws, kept apart from `out`.
    pub ui: &'a mut dyn Write,
    pub clipboard: &'a dyn ClipboardProvider,
}

/// `pm pick` and the bare `pm [words]` form.
pub fn pick(app: &App, args: &PickArgs, io: &mut Io<'_>) -> Result<()> {
    let query = args.query_text();
    if !args.interactive && !query.trim().is_empty() {
        return pick_with_query(app, &query, args.copy, io);
    }

    let prompts = app.require_prompts()?;
    let selected = picker::pick(
        &prompts,
        &query,
        &app.search_options,
        &mut *io.input,
        &mut *io.ui,
    )?;
    output_prompt(&selected.content, args.copy, io)
}

/// Print the best match for `query`.
pub fn pick_with_query(
    app: &App,
    query: &str,
    copy: bool,
    io: &mut Io<'_>,
) -> Result<()> {
    let prompts = app.require_prompts()?;
    let results = search::rank(&prompts, query, &app.search_options);
    let best = results.first().ok_or_else(|| Error::NoMatches {
        query: query.to_string(),
    })?;
    tracing::debug!(name = %best.prompt.name, score = best.score, "picked");
    output_prompt(&best.prompt.content, copy, io)
}

/// `pm search`.
pub fn search(app: &App, args: &SearchArgs, io: &mut Io<'_>) -> Result<()> {
    let query = args.query.join(" ");
    let prompts = app.require_prompts()?;

    let mut options = app.search_options;
    if let Some(limit) = args.limit.filter(|&n| n > 0) {
        options.max_results = limit;
    }

    let results = search::rank(&prompts, &query, &options);
    if results.is_empty() {
        return Err(Error::NoMatches { query });
    }

    if args.interactive {
        let selected =
            picker::pick(&prompts, &query, &options, &mut *io.input, &mut *io.ui)?;
        return write_prompt(&mut *io.out, &selected.content);
    }

    if args.json {
        search::format_json(&results, &query, &mut *io.out)
    } else {
        search::format_human(&results, &mut *io.out)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ListEntry<'a> {
    name: &'a str,
    path: String,
    tags: &'a [String],
}

/// `pm ls`.
pub fn list(app: &App, args: &ListArgs, out: &mut dyn Write) -> Result<()> {
    let prompts = app.load_prompts()?;
    let sorted = search::rank(&prompts, "", &SearchOptions::default());

    if args.json {
        let entries: Vec<_> = sorted
            .iter()
            .map(|r| ListEntry {
                name: &r.prompt.name,
                path: r.prompt.path.to_string_lossy().into_owned(),
                tags: &r.prompt.tags,
            })
            .collect();
        serde_json::to_writer(&mut *out, &entries)?;
        writeln!(out)?;
    } else {
        for r in &sorted {
            writeln!(out, "{}", r.prompt.name)?;
        }
    }
    Ok(())
}

/// `pm cat`.
pub fn cat(app: &App, args: &CatArgs, out: &mut dyn Write) -> Result<()> {
    let name = args.name.join(" ");
    let prompts = app.load_prompts()?;
    let found = find(&prompts, &name)?;
    write_prompt(out, &found.content)
}

/// `pm mesh`: each named prompt followed by a blank line, then `extra`.
pub fn mesh(
    app: &App,
    args: &MeshArgs,
    extra: Option<&mut dyn Read>,
    out: &mut dyn Write,
) -> Result<()> {
    let prompts = app.load_prompts()?;

    // Resolve every name before printing anything.
    let found = args
        .names
        .iter()
        .map(|name| find(&prompts, name))
        .collect::<Result<Vec<_>>>()?;

    for prompt in found {
        write_prompt(&mut *out, &prompt.content)?;
        writeln!(out)?;
    }

    if let Some(reader) = extra {
        let mut piped = String::new();
        reader.read_to_string(&mut piped)?;
        if !piped.is_empty() {
            write_prompt(out, &piped)?;
        }
    }
    Ok(())
}

/// Write prompt text with trailing line breaks collapsed to one newline.
pub fn write_prompt(out: &mut dyn Write, content: &str) -> Result<()> {
    writeln!(out, "{}", trim_trailing_newlines(content))?;
    Ok(())
}

fn output_prompt(content: &str, copy: bool, io: &mut Io<'_>) -> Result<()> {
    write_prompt(&mut *io.out, content)?;
    if copy {
        io.clipboard.write(trim_trailing_newlines(content))?;
    }
    Ok(())
}

fn find<'a>(prompts: &'a [Prompt], name: &str) -> Result<&'a Prompt> {
    prompt::find_by_name(prompts, name).ok_or_else(|| Error::NotFound {
        kind: "prompt",
        name: name.to_string(),
    })
}

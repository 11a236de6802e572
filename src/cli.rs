use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "pm",
    version,
    about = "Find, print and copy prompts from your prompt directories",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Override prompt directories (comma separated)
    #[arg(long, global = true)]
    pub dir: Option<String>,

    /// Path to settings.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Picker options used when no subcommand is given
    #[command(flatten)]
    pub pick: PickArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the best match for a query, or choose one interactively
    Pick(PickArgs),
    /// List prompts ranked against a query
    Search(SearchArgs),
    /// List every prompt name
    Ls(ListArgs),
    /// Print a prompt by name
    Cat(CatArgs),
    /// Print several prompts in order, followed by piped input
    Mesh(MeshArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Pick --

#[derive(Debug, Clone, Default, Args)]
pub struct PickArgs {
    /// Query used to select a prompt non-interactively
    #[arg(long, conflicts_with = "interactive")]
    pub query: Option<String>,

    /// Always open the interactive picker
    #[arg(short, long)]
    pub interactive: bool,

    /// Also copy the chosen prompt to the clipboard
    #[arg(short, long)]
    pub copy: bool,

    /// Query words (joined with spaces)
    pub words: Vec<String>,
}

impl PickArgs {
    /// The `--query` value, or the positional words joined by spaces.
    pub fn query_text(&self) -> String {
        self.query.clone().unwrap_or_else(|| self.words.join(" "))
    }
}

// -- Search --

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// The search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Maximum number of results (overrides the configured default)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output results as JSON
    #[arg(long, conflicts_with = "interactive")]
    pub json: bool,

    /// Open the interactive picker seeded with the query
    #[arg(short, long)]
    pub interactive: bool,
}

// -- Ls --

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Cat --

#[derive(Debug, Args)]
pub struct CatArgs {
    /// Prompt name (words are joined with spaces)
    #[arg(required = true)]
    pub name: Vec<String>,
}

// -- Mesh --

#[derive(Debug, Args)]
pub struct MeshArgs {
    /// Prompt names, printed in the given order
    #[arg(required = true)]
    pub names: Vec<String>,
}

// -- Completions --

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(self.shell, &mut cmd, "pm", &mut std::io::stdout());
    }
}

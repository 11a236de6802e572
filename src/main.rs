use std::{
    io::{self, IsTerminal, Read},
    process::ExitCode,
};

use clap::Parser;
use promptm::{
    cli::{Cli, Command},
    clipboard::SystemClipboard,
    commands::{self, App, Io},
    config::{self, Settings},
    error,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("PROMPTM_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pm: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> error::Result<()> {
    if let Some(Command::Completions(args)) = &cli.command {
        args.generate();
        return Ok(());
    }

    let config_path = config::resolve_config_path(cli.config.as_deref());
    let settings = Settings::load(&config_path);
    let app = App::new(settings, cli.dir);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    let clipboard = SystemClipboard;
    let mut io = Io {
        input: &mut input,
        out: &mut stdout,
        ui: &mut stderr,
        clipboard: &clipboard,
    };

    match cli.command {
        None => commands::pick(&app, &cli.pick, &mut io)?,
        Some(Command::Pick(args)) => commands::pick(&app, &args, &mut io)?,
        Some(Command::Search(args)) => commands::search(&app, &args, &mut io)?,
        Some(Command::Ls(args)) => commands::list(&app, &args, io.out)?,
        Some(Command::Cat(args)) => commands::cat(&app, &args, io.out)?,
        Some(Command::Mesh(args)) => {
            let piped: Option<&mut dyn Read> = if stdin.is_terminal() {
                None
            } else {
                Some(&mut input)
            };
            commands::mesh(&app, &args, piped, &mut stdout)?;
        }
        Some(Command::Completions(_)) => {}
    }

    Ok(())
}

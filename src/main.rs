mod config;
mod errors;
mod logging;
mod sandbox;
mod tools;


use crate::{config::Config, errors::AppError, sandbox::SandboxedFileSystem, tools::checksum::Algorithm};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::{fmt::Display, path::PathBuf, process::ExitCode};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "safe-toolkit", version, about = "Safe file operations toolkit")]
struct Cli {
    /// Sandbox root; overrides root_dir from the config file
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Config file (TOML, or JSON with a .json extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Show full error chains and debug logs
    #[arg(long, global = true)]
    debug: bool,
    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read a text file safely
    Read { file: String },
    /// Search for a pattern in text files safely
    #[command(alias = "search")]
    Grep {
        pattern: String,
        /// File pattern (e.g. *.txt, **/*.py)
        glob: String,
    },
    /// Calculate file checksum
    Checksum {
        file: String,
        #[arg(long, value_enum)]
        algorithm: Option<Algorithm>,
    },
    /// Format JSON with 2-space indentation
    #[command(name = "json-pretty", alias = "format-json")]
    JsonPretty { file: String },
    /// Search and replace text in files (dry run unless --apply)
    Replace {
        search: String,
        replace: String,
        glob: String,
        #[arg(long)]
        apply: bool,
    },
    /// List files matching a glob pattern
    List { glob: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let (json, debug) = (cli.json, cli.debug);
    match run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err, json, debug);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let mut cfg = Config::discover(cli.config.as_deref()).context("loading config")?;
    if let Some(root) = cli.root {
        cfg.root.root_dir = root;
    }
    logging::init(&cfg.logging, cli.debug);
    cfg.validate().context("validating config")?;

    let fs = SandboxedFileSystem::new(&cfg.root.root_dir)
        .context("opening sandbox root")?
        .reject_intermediate_symlinks(cfg.sandbox.reject_intermediate_symlinks);
    debug!(root = %fs.root().display(), command = ?cli.command, "sandbox ready");

    execute(&fs, &cfg, cli.command, cli.json)
}

fn execute(fs: &SandboxedFileSystem, cfg: &Config, command: Command, json: bool) -> anyhow::Result<String> {
    use crate::tools::{checksum, grep, json_pretty, list, read, replace};
    match command {
        Command::Read { file } => render(read::read_file(fs, &file)?, json),
        Command::Grep { pattern, glob } => render(grep::search(fs, &pattern, &glob)?, json),
        Command::Checksum { file, algorithm } => {
            let algorithm = algorithm.unwrap_or(cfg.checksum.default_algorithm);
            render(checksum::checksum(fs, &file, algorithm)?, json)
        }
        Command::JsonPretty { file } => render(json_pretty::json_pretty(fs, &file)?, json),
        Command::Replace { search, replace: replacement, glob, apply } => {
            render(replace::replace(fs, &search, &replacement, &glob, apply)?, json)
        }
        Command::List { glob } => render(list::list(fs, &glob)?, json),
    }
}

fn render<T: Display + Serialize>(value: T, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(&serde_json::json!({ "result": value }))?)
    } else {
        Ok(value.to_string())
    }
}

fn report(err: &anyhow::Error, json: bool, debug: bool) {
    match err.downcast_ref::<AppError>() {
        Some(app) if json => println!("{}", errors::into_json(app)),
        Some(app) if app.is_expected() => eprintln!("Error: {app}"),
        _ if debug => eprintln!("{err:?}"),
        _ => eprintln!("Unexpected error: {err:#}"),
    }
}

//! linkweave CLI

use anyhow::Context;
use clap::{Parser, Subcommand};
use linkweave::commands;
use linkweave::settings::{Overrides, expand_path, load_settings};
use linkweave_core::WikilinkSyntax;
use linkweave_workspace::load_workspace;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Resolve, check and rewrite wikilinks in a markdown note workspace
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the note workspace
    #[arg(env = "LINKWEAVE_VAULT")]
    vault: PathBuf,

    /// Wikilink syntax (standard, gollum); overrides configuration files
    #[arg(short, long, global = true)]
    syntax: Option<WikilinkSyntax>,

    /// Link configuration file (YAML, TOML or JSON)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show what each link resolves to
    Resolve {
        /// Single note to resolve; every note when omitted
        file: Option<PathBuf>,
    },
    /// Report links to non-existing resources; exits non-zero when any exist
    Check,
    /// Print reference definitions for the wikilinks of a note
    References {
        file: PathBuf,
        /// Keep the default note extension in URLs
        #[arg(long)]
        with_extension: bool,
    },
    /// Print a note, or only one of its sections
    Show {
        file: PathBuf,
        /// Heading text or anchor of the section
        section: Option<String>,
    },
    /// Point every link to FROM at a new target
    Retarget {
        from: PathBuf,
        /// Target text written into each link
        to: String,
        /// Rewrite the files instead of printing the edits
        #[arg(long)]
        write: bool,
    },
    /// Print the effective link configuration
    Config,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let vault = expand_path(&args.vault)?;
    let overrides = Overrides {
        syntax: args.syntax,
        config_file: args.config.clone(),
    };
    let config = load_settings(&vault, &overrides)?;

    if let Command::Config = args.command {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            print!("{}", config.to_yaml_string()?);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let workspace = load_workspace(&vault, &config)
        .with_context(|| format!("Failed to load workspace {}", vault.display()))?;

    match args.command {
        Command::Resolve { file } => {
            let reports = commands::resolve_notes(&workspace, file.as_deref(), &config)?;
            print(&reports, args.json, || {
                commands::render_file_reports(&reports, &workspace)
            })?;
        }
        Command::Check => {
            let problems = commands::check(&workspace, &config);
            print(&problems, args.json, || commands::render_problems(&problems))?;
            if !problems.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::References {
            file,
            with_extension,
        } => {
            let definitions = commands::references(&workspace, &file, with_extension, &config)?;
            print(&definitions, args.json, || {
                commands::render_definitions(&definitions)
            })?;
        }
        Command::Show { file, section } => {
            let text = commands::show(&workspace, &file, section.as_deref())?;
            print!("{}", text);
        }
        Command::Retarget { from, to, write } => {
            let changes = commands::retarget(&workspace, &from, &to, &config)?;
            if write {
                commands::write_edits(&changes)?;
            }
            print(&changes, args.json, || commands::render_file_edits(&changes))?;
        }
        Command::Config => {}
    }

    Ok(ExitCode::SUCCESS)
}

fn print<T: Serialize>(value: &T, json: bool, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

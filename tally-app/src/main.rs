//! `tally` — resolve spoken inventory commands from stdin.
//!
//! One transcript per line, optionally followed by recognizer alternatives:
//!
//! ```text
//! rebs at twelve | ribs at twelve | crabs at twelve
//! ```
//!
//! Each decision is printed to stdout as one JSON document. Logs go to
//! stderr.

mod project;
mod session;
mod settings;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use project::{load_project, save_project, ProjectSnapshot};
use session::Session;
use settings::{default_settings_path, load_settings, save_settings, AppSettings};

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Resolve spoken inventory commands against a canonical item list")]
struct Args {
    /// Settings file (defaults to the user data directory)
    #[arg(long, env = "TALLY_SETTINGS")]
    settings: Option<PathBuf>,

    /// Project file with `canonicalItems` and `aliasTable`
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Extra canonical item; may be repeated
    #[arg(short, long = "item")]
    items: Vec<String>,

    /// Never recommend or record aliases
    #[arg(long)]
    no_auto_save: bool,

    /// Write learned aliases back into the project file on exit
    #[arg(long, requires = "project")]
    write_back: bool,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    print_settings: bool,

    /// Store the effective settings in the settings file and exit
    #[arg(long)]
    save_settings: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn settings_path(args: &Args) -> PathBuf {
    args.settings.clone().unwrap_or_else(default_settings_path)
}

fn effective_settings(args: &Args) -> AppSettings {
    let path = settings_path(args);
    let mut settings = load_settings(&path);
    settings.apply_env_overrides();
    if args.no_auto_save {
        settings.resolver.allow_alias_auto_save = false;
    }
    info!(path = %path.display(), "settings loaded");
    settings
}

fn run(args: Args) -> Result<()> {
    let settings = effective_settings(&args);
    if args.print_settings {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }
    if args.save_settings {
        let path = settings_path(&args);
        save_settings(&path, &settings)
            .with_context(|| format!("writing settings file {}", path.display()))?;
        info!(path = %path.display(), "settings saved");
        return Ok(());
    }

    let project = match &args.project {
        Some(path) => load_project(path)?,
        None => ProjectSnapshot::default(),
    }
    .with_extra_items(args.items.iter().cloned());
    if project.canonical_items.is_empty() {
        bail!("no canonical items: pass --project or --item");
    }
    info!(
        items = project.canonical_items.len(),
        aliases = project.alias_table.len(),
        "project loaded"
    );

    let mut session = Session::new(&settings, project);
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let decision = match session.handle_line(&line) {
            Ok(Some(decision)) => decision,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = %line.trim(), "skipped: {e:#}");
                continue;
            }
        };
        let json = if settings.pretty_json {
            serde_json::to_string_pretty(&decision)?
        } else {
            serde_json::to_string(&decision)?
        };
        writeln!(out, "{json}").context("writing decision")?;
    }
    out.flush().context("flushing stdout")?;

    for (item, count) in session.counts() {
        info!(%item, count, "final count");
    }

    if args.write_back {
        if let Some(path) = &args.project {
            save_project(path, &session.project())?;
            info!(path = %path.display(), "aliases written back");
        }
    }
    Ok(())
}

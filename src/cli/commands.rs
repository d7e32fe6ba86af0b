//! Command dispatch

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::{demo_seed, load_seed, Session};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::{output, render};
use crate::config::{global_config_path, local_config_path, OutputFormat, Settings};
use crate::domain::{Edit, ROLLUP_TOLERANCE};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let dir = cli.dir.clone().or_else(|| std::env::current_dir().ok());
    let settings = Settings::load(dir.as_deref())?;

    match &cli.command {
        Some(Commands::Show { format }) => cmd_show(cli, &settings, *format),
        Some(Commands::Edit { edits, format }) => cmd_edit(cli, &settings, edits, *format),
        Some(Commands::Check) => cmd_check(cli, &settings),
        Some(Commands::Config { command }) => cmd_config(command, &settings, dir),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

/// Start a session from `--seed`, the configured seed, or the demo seed.
fn open_session(cli: &Cli, settings: &Settings) -> CliResult<Session> {
    let tree = match cli.seed.as_ref().or(settings.seed.as_ref()) {
        Some(path) => {
            debug!("open_session: seed {}", path.display());
            load_seed(path)?
        }
        None => {
            debug!("open_session: demo seed");
            demo_seed()?
        }
    };
    Ok(Session::new(tree))
}

fn print_session(
    session: &Session,
    settings: &Settings,
    format: Option<OutputFormat>,
) -> CliResult<()> {
    match format.unwrap_or(settings.display.format) {
        OutputFormat::Text => print!("{}", render::render_text(session, &settings.display)),
        OutputFormat::Json => output::info(&render::render_json(session, &settings.display)?),
    }
    Ok(())
}

#[instrument(skip(cli, settings))]
fn cmd_show(cli: &Cli, settings: &Settings, format: Option<OutputFormat>) -> CliResult<()> {
    let session = open_session(cli, settings)?;
    print_session(&session, settings, format)
}

#[instrument(skip(cli, settings))]
fn cmd_edit(
    cli: &Cli,
    settings: &Settings,
    edits: &[Edit],
    format: Option<OutputFormat>,
) -> CliResult<()> {
    let mut session = open_session(cli, settings)?;
    for edit in edits {
        session.apply(edit.clone())?;
    }
    print_session(&session, settings, format)
}

#[instrument(skip(cli, settings))]
fn cmd_check(cli: &Cli, settings: &Settings) -> CliResult<()> {
    let session = open_session(cli, settings)?;
    let violations = session.tree().rollup_violations(ROLLUP_TOLERANCE);
    if violations.is_empty() {
        output::success("all parents match their children's total");
        return Ok(());
    }
    output::header("Inconsistent parents:");
    for v in &violations {
        output::failure(v);
    }
    Err(CliError::Inconsistent(violations.len()))
}

fn cmd_config(
    command: &ConfigCommands,
    settings: &Settings,
    dir: Option<PathBuf>,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            output::header("Config paths:");
            match global_config_path() {
                Some(p) => output::detail(&format!("global: {}", p.display())),
                None => output::detail("global: <unavailable>"),
            }
            match dir {
                Some(d) => output::detail(&format!("local:  {}", local_config_path(&d).display())),
                None => output::detail("local:  <unavailable>"),
            }
        }
    }
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::application::parse_magnitude;
use crate::config::OutputFormat;
use crate::domain::Edit;

/// Hierarchical allocation model: rollup totals, proportional redistribution and variance tracking
#[derive(Parser, Debug)]
#[command(name = "allotree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Seed file (.toml or .json), default: configured seed or built-in demo
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub seed: Option<PathBuf>,

    /// Directory holding the local .allotree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the tree with values and variance
    Show {
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Apply edits in order and show the result
    Edit {
        /// Edits: `id%25` applies +25%, `id=3000` sets the value
        #[arg(required = true, value_parser = parse_edit)]
        edits: Vec<Edit>,
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Report parents whose value differs from their children's total
    Check,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print config template
    Template,

    /// Show config paths
    Path,
}

/// Parse `id%percent` or `id=value`.
pub fn parse_edit(s: &str) -> Result<Edit, String> {
    let (target, magnitude, percentage) = if let Some((target, pct)) = s.split_once('%') {
        (target, pct, true)
    } else if let Some((target, value)) = s.split_once('=') {
        (target, value, false)
    } else {
        return Err(format!("expected ID%PERCENT or ID=VALUE, got {s:?}"));
    };

    let target = target.trim();
    if target.is_empty() {
        return Err(format!("missing node id in {s:?}"));
    }
    let magnitude = parse_magnitude(magnitude).map_err(|e| e.to_string())?;

    Ok(if percentage {
        Edit::percentage(target, magnitude)
    } else {
        Edit::absolute(target, magnitude)
    })
}

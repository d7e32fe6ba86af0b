//! Tests for argument parsing and command dispatch

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use allotree::cli::args::{Cli, Commands};
use allotree::cli::commands::execute_command;
use allotree::cli::CliError;
use allotree::domain::EditKind;
use allotree::exitcode;

fn run(args: &[&str]) -> Result<(), CliError> {
    // isolate from any .allotree.toml in the working directory
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_string_lossy().to_string();
    let mut argv = vec!["allotree", "-C", dir_arg.as_str()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    execute_command(&cli)
}

#[test]
fn given_edit_args_when_parsing_then_edits_in_order() {
    let cli = Cli::try_parse_from(["allotree", "edit", "phones%25", "electronics=3000"]).unwrap();

    match cli.command {
        Some(Commands::Edit { edits, .. }) => {
            assert_eq!(edits.len(), 2);
            assert_eq!(edits[0].kind, EditKind::Percentage);
            assert_eq!(edits[1].kind, EditKind::Absolute);
            assert_eq!(edits[1].target, "electronics");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[rstest]
#[case(&["allotree", "edit"])]
#[case(&["allotree", "edit", "phones"])]
#[case(&["allotree", "edit", "phones=abc"])]
fn given_bad_edit_args_when_parsing_then_rejected(#[case] argv: &[&str]) {
    assert!(Cli::try_parse_from(argv).is_err());
}

#[test]
fn given_demo_seed_when_show_then_ok() {
    assert!(run(&["show"]).is_ok());
    assert!(run(&["show", "--format", "json"]).is_ok());
}

#[test]
fn given_seed_file_when_edit_then_ok() {
    let result = run(&[
        "--seed",
        "tests/resources/seeds/budget.toml",
        "edit",
        "phones%25",
        "company=5000",
    ]);
    assert!(result.is_ok());
}

#[test]
fn given_unknown_id_when_edit_then_data_error() {
    let err = run(&["edit", "garden%10"]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert!(err.to_string().contains("garden"));
}

#[test]
fn given_inconsistent_seed_when_check_then_data_error() {
    let err = run(&["--seed", "tests/resources/seeds/inconsistent.toml", "check"]).unwrap_err();
    assert!(matches!(err, CliError::Inconsistent(1)));
    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_missing_seed_when_show_then_no_input() {
    let err = run(&["--seed", "tests/resources/seeds/nope.toml", "show"]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_no_command_when_run_then_usage_error() {
    let err = run(&[]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

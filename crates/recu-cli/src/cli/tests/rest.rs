//! Tests for import, init, completions and manpage subcommands.

use super::parse;
use crate::cli::CliCommand;

#[test]
fn cli_parse_import() {
    match parse(&["recu", "import", "https://site.example/performer/alice"]) {
        CliCommand::Import { url } => assert_eq!(url, "https://site.example/performer/alice"),
        _ => panic!("expected Import"),
    }
}

#[test]
fn cli_parse_init() {
    match parse(&["recu", "init"]) {
        CliCommand::Init => {}
        _ => panic!("expected Init"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["recu", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_parse_manpage() {
    match parse(&["recu", "manpage"]) {
        CliCommand::Manpage => {}
        _ => panic!("expected Manpage"),
    }
}

#[test]
fn cli_command_is_well_formed() {
    use clap::CommandFactory;
    crate::cli::Cli::command().debug_assert();
}

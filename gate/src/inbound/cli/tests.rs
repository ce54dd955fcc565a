//! Tests for `gate-scan` argument parsing and input handling.

use std::io::Cursor;

use clap::Parser;
use rstest::rstest;

use super::*;

fn parse_args(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("gate-scan").chain(args.iter().copied()))
        .expect("arguments parse")
}

#[test]
fn scan_flags_build_a_review() {
    let cli = parse_args(&[
        "scan",
        "--payload",
        "Casa: 12\nVisitante: Ana",
        "--confirm",
        "--authorized",
        "--name-match",
        "--trunk-photo",
        "trunk.jpg",
    ]);

    let Command::Scan(args) = cli.command else {
        panic!("expected the scan command");
    };
    assert_eq!(args.payload.as_deref(), Some("Casa: 12\nVisitante: Ana"));
    assert!(args.confirm);
    let review = args.review();
    assert!(review.checklist.authorized);
    assert!(review.checklist.name_match);
    assert!(!review.checklist.people_match);
    assert_eq!(review.trunk_photo.as_deref(), Some("trunk.jpg"));
    assert_eq!(review.plate_photo, None);
}

#[test]
fn store_dir_is_accepted_after_the_subcommand() {
    let cli = parse_args(&["list", "--store-dir", "/var/lib/gate"]);

    assert_eq!(cli.store_dir, Some(PathBuf::from("/var/lib/gate")));
    assert!(matches!(cli.command, Command::List));
}

#[rstest]
#[case(&["prune"], None)]
#[case(&["prune", "--older-than-days", "7"], Some(7))]
fn prune_window_is_optional(#[case] args: &[&str], #[case] expected: Option<u32>) {
    let Command::Prune { older_than_days } = parse_args(args).command else {
        panic!("expected the prune command");
    };
    assert_eq!(older_than_days, expected);
}

#[rstest]
#[case(&["status"])]
#[case(&["prune", "--older-than-days", "soon"])]
#[case(&["teleport"])]
fn invalid_arguments_are_rejected(#[case] args: &[&str]) {
    let result = Cli::try_parse_from(std::iter::once("gate-scan").chain(args.iter().copied()));
    assert!(result.is_err());
}

#[test]
fn payload_is_read_from_input() {
    let mut input = Cursor::new("Casa: 12\nVisitante: Ana\n");

    let payload = read_payload(&mut input).expect("payload read");

    assert_eq!(payload, "Casa: 12\nVisitante: Ana\n");
}

#[test]
fn missing_visit_file_is_reported_with_its_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("visits.json");

    let err = read_text_file(&path).expect_err("missing file");

    assert!(matches!(err, CliError::ReadFile { path: reported, .. } if reported == path));
}

#[test]
fn visit_file_is_read_through_its_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("visits.json");
    std::fs::write(&path, "[]").expect("write fixture");

    assert_eq!(read_text_file(&path).expect("file read"), "[]");
}

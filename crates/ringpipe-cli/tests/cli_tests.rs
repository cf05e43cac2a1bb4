use clap::Parser;
use ringpipe_cli::{run, Cli};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

fn cli(input: &Path, output: &Path, capacity: &str, chunk: &str) -> Cli {
    Cli::try_parse_from([
        OsStr::new("ringpipe"),
        input.as_os_str(),
        output.as_os_str(),
        OsStr::new("--capacity"),
        OsStr::new(capacity),
        OsStr::new("--chunk-size"),
        OsStr::new(chunk),
    ])
    .unwrap()
}

#[test]
fn test_copies_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output.txt");
    let payload: Vec<u8> = (0..50_000u32).map(|i| (i % 97) as u8).collect();
    fs::write(&input, &payload).unwrap();

    let report = run(&cli(&input, &output, "100", "1024")).unwrap();

    assert_eq!(fs::read(&output).unwrap(), payload);
    assert_eq!(report.bytes_written(), payload.len() as u64);
    assert!(report.buffer.peak_len <= 100);
}

#[test]
fn test_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty");
    let output = dir.path().join("copy");
    fs::write(&input, b"").unwrap();

    run(&cli(&input, &output, "4", "5")).unwrap();

    assert!(fs::read(&output).unwrap().is_empty());
}

#[test]
fn test_missing_input_leaves_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("does-not-exist");
    let output = dir.path().join("keep.txt");
    fs::write(&output, b"precious").unwrap();

    let err = run(&cli(&input, &output, "4", "5")).unwrap_err();

    assert!(err.to_string().starts_with("could not open input file"));
    assert_eq!(fs::read(&output).unwrap(), b"precious");
}

#[test]
fn test_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, b"data").unwrap();
    let output = dir.path().join("no-such-dir").join("out.txt");

    let err = run(&cli(&input, &output, "4", "5")).unwrap_err();

    assert!(err.to_string().starts_with("could not open output file"));
}

#[test]
fn test_zero_capacity_rejected_before_opening_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output.txt");
    fs::write(&input, b"data").unwrap();

    let err = run(&cli(&input, &output, "0", "5")).unwrap_err();

    assert!(err.to_string().contains("capacity must be greater than 0"));
    assert!(!output.exists());
}

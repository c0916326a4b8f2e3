//! In-process runs of the `stache` command.

use std::fs;
use std::path::Path;

use clap::Parser;
use stache_cli::{run, Cli, ExitStatus};
use tempfile::TempDir;

struct Run {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

fn stache(args: &[&str], stdin: &str) -> Run {
    let cli = Cli::try_parse_from(std::iter::once("stache").chain(args.iter().copied())).unwrap();
    let mut input = stdin.as_bytes();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let status = run(&cli, &mut input, &mut stdout, &mut stderr).unwrap();
    Run {
        status,
        stdout: String::from_utf8(stdout).unwrap(),
        stderr: String::from_utf8(stderr).unwrap(),
    }
}

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path_str(&path)
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn renders_every_template_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let json = write(&dir, "data.json", r#"{"name": "World", "n": [1, 2]}"#);
    let a = write(&dir, "a.mustache", "Hello {{name}}\n");
    let b = write(&dir, "b.mustache", "{{#n}}{{.}}{{/n}}\n");

    let out = stache(&[&json, &a, &b], "");
    assert_eq!(out.status, ExitStatus::Success);
    assert_eq!(out.stdout, "Hello World\n12\n");
    assert!(out.stderr.is_empty());
}

#[test]
fn json_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let t = write(&dir, "t", "{{x}}");
    let out = stache(&["-", &t], r#"{"x": "piped"}"#);
    assert_eq!(out.status, ExitStatus::Success);
    assert_eq!(out.stdout, "piped");
}

#[test]
fn template_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let json = write(&dir, "d.json", r#"{"x": 1}"#);
    let out = stache(&[&json, "-"], "x={{x}}");
    assert_eq!(out.stdout, "x=1");
}

#[test]
fn stdin_is_read_only_once() {
    let out = stache(&["-", "-"], r#"{"x": 1}"#);
    assert_eq!(out.status, ExitStatus::InputError);
    assert_eq!(out.stderr, "Can't open file: -\n");
}

// ============================================================================
// Partials
// ============================================================================

#[test]
fn partials_default_to_template_directory() {
    let dir = tempfile::tempdir().unwrap();
    let json = write(&dir, "d.json", r#"{"who": "dir"}"#);
    write(&dir, "views/header.mustache", "<{{who}}>");
    let t = write(&dir, "views/page.mustache", "{{>header}}!");

    let out = stache(&[&json, &t], "");
    assert_eq!(out.stdout, "<dir>!");
}

#[test]
fn partial_directories_from_flags() {
    let dir = tempfile::tempdir().unwrap();
    let json = write(&dir, "d.json", "{}");
    write(&dir, "shared/footer", "-- footer");
    let t = write(&dir, "t.mustache", "{{>footer}}");
    let shared = path_str(&dir.path().join("shared"));

    let out = stache(&["-I", &shared, &json, &t], "");
    assert_eq!(out.stdout, "-- footer");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn template_error_reported_and_rest_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let json = write(&dir, "d.json", r#"{"ok": "yes"}"#);
    let bad = write(&dir, "bad.mustache", "{{#open}}never closed");
    let good = write(&dir, "good.mustache", "{{ok}}");

    let out = stache(&[&json, &bad, &good], "");
    assert_eq!(out.status, ExitStatus::TemplateError);
    assert_eq!(out.status.code(), 2);
    assert_eq!(out.stdout, "yes");
    assert_eq!(
        out.stderr,
        format!("Template error unexpected end (file {})\n", bad)
    );
}

#[test]
fn unreadable_json_reports_reason() {
    let dir = tempfile::tempdir().unwrap();
    let json = write(&dir, "broken.json", "{not json");
    let t = write(&dir, "t", "x");

    let out = stache(&[&json, &t], "");
    assert_eq!(out.status, ExitStatus::InputError);
    assert!(out
        .stderr
        .starts_with(&format!("Can't load json file {}\n   reason: ", json)));
    assert!(out.stdout.is_empty());
}

#[test]
fn missing_template_stops_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let json = write(&dir, "d.json", "{}");
    let missing = path_str(&dir.path().join("missing.mustache"));

    let out = stache(&[&json, &missing], "");
    assert_eq!(out.status.code(), 1);
    assert_eq!(out.stderr, format!("Can't open file: {}\n", missing));
}

#[test]
fn error_undefined_flag() {
    let dir = tempfile::tempdir().unwrap();
    let json = write(&dir, "d.json", "{}");
    let t = write(&dir, "t", "{{missing}}");

    let lenient = stache(&[&json, &t], "");
    assert_eq!(lenient.status, ExitStatus::Success);

    let strict = stache(&["--error-undefined", &json, &t], "");
    assert_eq!(strict.status, ExitStatus::TemplateError);
    assert!(strict.stderr.contains("item not found"));
}

#[test]
fn strict_tags_rejects_empty_tag() {
    let dir = tempfile::tempdir().unwrap();
    let json = write(&dir, "d.json", "{}");
    let t = write(&dir, "t", "a{{}}b");

    // An empty name is the current value, here the whole document.
    assert_eq!(stache(&[&json, &t], "").stdout, "a{}b");
    let strict = stache(&["--strict-tags", &json, &t], "");
    assert!(strict.stderr.contains("empty tag"));
}

#[test]
fn no_extensions_disables_comparisons() {
    let dir = tempfile::tempdir().unwrap();
    let json = write(&dir, "d.json", r#"{"n": 5}"#);
    let t = write(&dir, "t", "{{#n>1}}big{{/n>1}}");

    assert_eq!(stache(&[&json, &t], "").stdout, "big");
    assert_eq!(stache(&["--no-extensions", &json, &t], "").stdout, "");
}

#[test]
fn templates_are_required() {
    assert!(Cli::try_parse_from(["stache", "data.json"]).is_err());
}

#[test]
fn verbosity_selects_log_level() {
    let quiet = Cli::try_parse_from(["stache", "d", "t"]).unwrap();
    let loud = Cli::try_parse_from(["stache", "-vv", "d", "t"]).unwrap();
    assert_eq!(quiet.log_level(), "warn");
    assert_eq!(loud.log_level(), "debug");
}

//! The `stache` command: render mustache templates against a JSON document.
//!
//! ```text
//! stache [OPTIONS] <JSON> <TEMPLATE>...
//! ```
//!
//! Every template is rendered in turn to standard output. A template that
//! fails to render is reported on standard error and skipped; the command
//! then finishes with status 2. Unreadable input stops the command with
//! status 1.
//!
//! The command logic lives in [`run`] so it can be driven in-process with
//! arbitrary streams.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{ArgAction, Parser};
use console::style;
use serde_json::Value;
use stache::Renderer;
use stache_json::{JsonOptions, JsonProvider};
use tracing::{debug, info};

/// Name that designates standard input.
pub const STDIN: &str = "-";

/// Render mustache templates from a JSON file
#[derive(Debug, Parser)]
#[command(name = "stache")]
#[command(version)]
#[command(about = "Render mustache templates from a JSON file")]
pub struct Cli {
    /// JSON data file, `-` for standard input
    #[arg(value_name = "JSON")]
    pub json: String,

    /// Templates to render, `-` for standard input
    #[arg(value_name = "TEMPLATE", required = true)]
    pub templates: Vec<String>,

    /// Directory searched for partials (repeatable; default: the template's directory)
    #[arg(short = 'I', long = "partials", value_name = "DIR")]
    pub partials: Vec<PathBuf>,

    /// Fail on values and partials missing from the data
    #[arg(long)]
    pub error_undefined: bool,

    /// Plain mustache: no JSON pointers, member iteration or comparisons
    #[arg(long)]
    pub no_extensions: bool,

    /// Reject empty tags and treat `:` as part of names
    #[arg(long)]
    pub strict_tags: bool,

    /// More log output (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter used when `STACHE_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn renderer(&self) -> Renderer {
        if self.strict_tags {
            Renderer::strict()
        } else {
            Renderer::new()
        }
    }

    fn json_options(&self, template: &str) -> JsonOptions {
        let base = if self.no_extensions {
            JsonOptions::none()
        } else {
            JsonOptions::default()
        };
        let base = base.error_undefined(self.error_undefined);
        if self.partials.is_empty() {
            return base.partial_dir(template_dir(template));
        }
        self.partials
            .iter()
            .fold(base, |options, dir| options.partial_dir(dir))
    }
}

fn template_dir(template: &str) -> PathBuf {
    if template == STDIN {
        return PathBuf::from(".");
    }
    match Path::new(template).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// How the command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every template rendered.
    Success,
    /// The JSON document or a template could not be read.
    InputError,
    /// At least one template failed to render.
    TemplateError,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::InputError => 1,
            ExitStatus::TemplateError => 2,
        }
    }
}

/// Hands out standard input at most once.
struct Stdin<'r> {
    reader: Option<&'r mut dyn Read>,
}

impl Stdin<'_> {
    fn take(&mut self) -> Option<String> {
        let reader = self.reader.take()?;
        let mut text = String::new();
        reader.read_to_string(&mut text).ok()?;
        Some(text)
    }
}

fn read_input(name: &str, stdin: &mut Stdin<'_>) -> std::result::Result<String, String> {
    if name == STDIN {
        return stdin
            .take()
            .ok_or_else(|| "standard input is not available".to_string());
    }
    fs::read_to_string(name).map_err(|err| err.to_string())
}

/// Runs the command with the given streams.
///
/// Render and input failures are reported on `stderr` and reflected in the
/// returned status. An `Err` means `stdout` or `stderr` could not be written.
pub fn run(
    cli: &Cli,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<ExitStatus> {
    let mut stdin = Stdin {
        reader: Some(stdin),
    };

    let data: Value = match read_input(&cli.json, &mut stdin)
        .and_then(|text| serde_json::from_str(&text).map_err(|err| err.to_string()))
    {
        Ok(data) => data,
        Err(reason) => {
            writeln!(stderr, "Can't load json file {}", cli.json)?;
            writeln!(stderr, "   reason: {}", reason)?;
            return Ok(ExitStatus::InputError);
        }
    };
    debug!(file = %cli.json, "json loaded");

    let renderer = cli.renderer();
    let mut status = ExitStatus::Success;
    for name in &cli.templates {
        let template = match read_input(name, &mut stdin) {
            Ok(template) => template,
            Err(reason) => {
                debug!(file = %name, %reason, "template unreadable");
                writeln!(stderr, "Can't open file: {}", name)?;
                return Ok(ExitStatus::InputError);
            }
        };

        let mut provider = JsonProvider::with_options(&data, cli.json_options(name));
        match renderer.render_to_string(&template, &mut provider) {
            Ok(output) => {
                info!(file = %name, bytes = output.len(), "rendered");
                stdout.write_all(output.as_bytes())?;
            }
            Err(err) => {
                info!(file = %name, error = %err, "render failed");
                writeln!(
                    stderr,
                    "{} {} (file {})",
                    style("Template error").for_stderr().red().bold(),
                    err.kind().label(),
                    name
                )?;
                status = ExitStatus::TemplateError;
            }
        }
    }
    stdout.flush()?;
    Ok(status)
}

//! Terminal output for the CLI.

use crate::exporter::ProgressEvent;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Colored, level-aware terminal output.
///
/// With `json` set, progress events are written to stdout as one JSON object
/// per line and decorative output is suppressed.
#[derive(Debug, Clone, Copy)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    json: bool,
}

impl OutputManager {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    fn color_choice() -> ColorChoice {
        if std::env::var_os("NO_COLOR").is_some() {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        }
    }

    fn write_tagged(&self, color: Color, tag: &str, message: &str) -> io::Result<()> {
        let mut stderr = StandardStream::stderr(Self::color_choice());
        stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(&mut stderr, "{tag:>12}")?;
        stderr.reset()?;
        writeln!(&mut stderr, " {message}")
    }

    /// Section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet || self.json {
            return Ok(());
        }
        let mut stderr = StandardStream::stderr(Self::color_choice());
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        writeln!(&mut stderr, "\n{title}")?;
        stderr.reset()
    }

    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet || self.json {
            return Ok(());
        }
        self.write_tagged(Color::Cyan, "Running", message)
    }

    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet || self.json {
            return Ok(());
        }
        self.write_tagged(Color::Green, "Finished", message)
    }

    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_tagged(Color::Yellow, "Warning", message)
    }

    /// Errors are always shown.
    pub fn error(&self, message: &str) -> io::Result<()> {
        self.write_tagged(Color::Red, "Error", message)
    }

    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose || self.quiet || self.json {
            return Ok(());
        }
        writeln!(io::stderr(), "  {message}")
    }

    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet || self.json {
            return Ok(());
        }
        writeln!(io::stderr(), "  {message}")
    }

    /// Plain result text on stdout (command output, not decoration).
    pub fn println(&self, message: &str) -> io::Result<()> {
        writeln!(io::stdout(), "{message}")
    }

    /// Print one JSON value as a line on stdout.
    pub fn json_line<T: serde::Serialize>(&self, value: &T) -> io::Result<()> {
        let line = serde_json::to_string(value).map_err(io::Error::other)?;
        writeln!(io::stdout(), "{line}")
    }

    /// Show an event coming from a running queue.
    pub fn event(&self, event: &ProgressEvent) -> io::Result<()> {
        if self.json {
            return self.json_line(event);
        }
        match event {
            ProgressEvent::Progress(update) => self.progress(&update.to_string()),
            ProgressEvent::Notice { message } => self.warn(message),
            ProgressEvent::Idle => Ok(()),
        }
    }
}

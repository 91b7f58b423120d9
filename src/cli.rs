// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Plumbing shared by the command-line tools.
//!
//! Every tool reads one whole input buffer (a file or standard input),
//! calls into the library, and writes one whole output buffer (a file or
//! standard output). This module holds the parts they have in common:
//! argument handling, informational text, I/O and logging setup.
//!
//! Options may be written Go style with a single dash (`-pretty`) or with
//! two (`--pretty`); [`Args`] rewrites the former into the latter before
//! handing them to `lexopt`.

use crate::parser::{self, ParseError};
use crate::renderer::RenderError;
use crate::tree::MergeError;
use lexopt::ValueExt;
use snafu::prelude::*;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Errors reported by the command-line tools.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// The command line could not be parsed.
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs {
        /// The underlying argument error.
        source: lexopt::Error,
    },

    /// The input could not be read.
    #[snafu(display("failed to read {name}: {source}"))]
    ReadInput {
        /// File name, or `standard input`.
        name: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The output could not be written.
    #[snafu(display("failed to write {name}: {source}"))]
    WriteOutput {
        /// File name, or `standard output`.
        name: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An input did not parse as OPML.
    #[snafu(display("failed to parse {name}: {source}"))]
    Parse {
        /// File name, or `standard input`.
        name: String,
        /// The underlying parse error.
        source: ParseError,
    },

    /// The input of a text tool is not UTF-8.
    #[snafu(display("{name} is not valid UTF-8: {source}"))]
    NotUtf8 {
        /// File name, or `standard input`.
        name: String,
        /// The underlying decoding error.
        source: std::str::Utf8Error,
    },

    /// The output could not be rendered.
    #[snafu(display("failed to render output: {source}"))]
    Render {
        /// The underlying render error.
        source: RenderError,
    },

    /// Documents could not be merged.
    #[snafu(display("failed to merge documents: {source}"))]
    Merge {
        /// The underlying merge error.
        source: MergeError,
    },

    /// A directory could not be searched.
    #[snafu(display("failed to search directory: {source}"))]
    WalkDir {
        /// The underlying directory walk error.
        source: walkdir::Error,
    },
}

/// Informational output requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Info {
    /// `-help`
    Help,
    /// `-version`
    Version,
    /// `-license`
    License,
}

/// Static description of one tool.
#[derive(Debug, Clone, Copy)]
pub struct Tool {
    /// Binary name.
    pub name: &'static str,
    /// One-line summary.
    pub about: &'static str,
    /// Usage line, without the binary name.
    pub usage: &'static str,
    /// Tool-specific option lines.
    pub options: &'static str,
    /// Example invocations.
    pub examples: &'static str,
}

const COMMON_OPTIONS: &str = "\
  -i, -input <FILE>    Read from FILE instead of standard input
  -o, -output <FILE>   Write to FILE instead of standard output
  -pretty              Indent the output
  -newline             Append a trailing newline
  -quiet               Only report errors
  -help                Print help
  -version             Print version
  -license             Print license";

impl Tool {
    /// The text printed for `-help`.
    #[must_use]
    pub fn help(&self) -> String {
        let mut options = String::from(self.options);
        if !options.is_empty() {
            options.push('\n');
        }
        options.push_str(COMMON_OPTIONS);

        format!(
            "\
{name} {version}
{about}

Usage: {name} {usage}

Options:
{options}

Examples:
{examples}",
            name = self.name,
            version = env!("CARGO_PKG_VERSION"),
            about = self.about,
            usage = self.usage,
            examples = self.examples,
        )
    }

    /// The text printed for `-version`.
    #[must_use]
    pub fn version(&self) -> String {
        format!("{} {}", self.name, env!("CARGO_PKG_VERSION"))
    }

    /// The text printed for `-license`.
    #[must_use]
    pub fn license(&self) -> String {
        format!(
            "\
{name} is part of {package} {version}.
Copyright (C) 2025 Brian Hetro <whee@smaertness.net>
License {license}: GNU GPL version 3 <https://www.gnu.org/licenses/gpl-3.0.html>
This is free software: you are free to change and redistribute it.
There is NO WARRANTY, to the extent permitted by law.",
            name = self.name,
            package = env!("CARGO_PKG_NAME"),
            version = env!("CARGO_PKG_VERSION"),
            license = env!("CARGO_PKG_LICENSE"),
        )
    }

    /// Prints the requested informational text to standard output.
    pub fn print(&self, info: Info) {
        match info {
            Info::Help => println!("{}", self.help()),
            Info::Version => println!("{}", self.version()),
            Info::License => println!("{}", self.license()),
        }
    }
}

/// An owned command-line argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// A single-character option, e.g. `-i`.
    Short(char),
    /// A long option, e.g. `--pretty`; single-dash spellings are normalized.
    Long(String),
    /// A positional argument.
    Value(OsString),
}

impl Arg {
    /// The error to report when a tool does not accept this argument.
    #[must_use]
    pub fn unexpected(&self) -> lexopt::Error {
        match self {
            Self::Short(c) => lexopt::Error::UnexpectedOption(format!("-{c}")),
            Self::Long(name) => lexopt::Error::UnexpectedOption(format!("--{name}")),
            Self::Value(value) => lexopt::Error::UnexpectedArgument(value.clone()),
        }
    }
}

/// Command-line argument reader.
pub struct Args {
    parser: lexopt::Parser,
}

impl Args {
    /// Reads the arguments of the current process.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::args_os().skip(1))
    }

    /// Reads the given arguments, which must not include the binary name.
    pub fn new<I>(args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        let mut literal = false;
        let args: Vec<OsString> = args
            .into_iter()
            .map(|arg| {
                let arg = arg.into();
                if literal {
                    return arg;
                }
                if arg == "--" {
                    literal = true;
                }
                normalize(arg)
            })
            .collect();

        Self {
            parser: lexopt::Parser::from_args(args),
        }
    }

    /// Returns the next argument.
    ///
    /// # Errors
    ///
    /// Returns an error if an option is followed by an unexpected value.
    pub fn next_arg(&mut self) -> Result<Option<Arg>, lexopt::Error> {
        use lexopt::Arg as Raw;

        Ok(self.parser.next()?.map(|arg| match arg {
            Raw::Short(c) => Arg::Short(c),
            Raw::Long(name) => Arg::Long(name.to_owned()),
            Raw::Value(value) => Arg::Value(value),
        }))
    }

    /// Returns the value of the option just read.
    ///
    /// # Errors
    ///
    /// Returns an error if no value follows.
    pub fn value(&mut self) -> Result<OsString, lexopt::Error> {
        self.parser.value()
    }

    /// Reads the `=true`/`=false` suffix of a boolean option.
    ///
    /// A bare option means `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the suffix is not a boolean.
    pub fn flag(&mut self) -> Result<bool, lexopt::Error> {
        let Some(value) = self.parser.optional_value() else {
            return Ok(true);
        };
        let value = value.string()?;
        parser::parse_bool(&value).ok_or_else(|| format!("invalid boolean value {value:?}").into())
    }
}

/// Rewrites `-name` and `-name=value` into their `--` forms.
///
/// Single-character options (`-i`) and anything that does not look like an
/// option name (`-`, `-1`, `-i.opml`) are left alone.
fn normalize(arg: OsString) -> OsString {
    let Some(s) = arg.to_str() else {
        return arg;
    };
    let Some(rest) = s.strip_prefix('-') else {
        return arg;
    };
    if rest.starts_with('-') {
        return arg;
    }

    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    let is_long_name = name.len() > 1
        && name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_lowercase() || c == '-');

    if is_long_name {
        OsString::from(format!("-{s}"))
    } else {
        arg
    }
}

/// Settings every tool accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Input file; `None` reads standard input.
    pub input: Option<PathBuf>,
    /// Output file; `None` writes standard output.
    pub output: Option<PathBuf>,
    /// Indent the output.
    pub pretty: bool,
    /// Append a newline to the output.
    pub newline: bool,
    /// Only log errors.
    pub quiet: bool,
    /// Informational text to print instead of running.
    pub info: Option<Info>,
}

impl Config {
    /// Applies `arg` if it is one of the common options.
    ///
    /// Returns `false` for arguments the tool has to handle itself,
    /// including positional ones.
    ///
    /// # Errors
    ///
    /// Returns an error if an option's value is missing or malformed.
    pub fn apply(&mut self, arg: &Arg, args: &mut Args) -> Result<bool, lexopt::Error> {
        match arg {
            Arg::Short('i') => self.input = path_arg(args.value()?),
            Arg::Short('o') => self.output = path_arg(args.value()?),
            Arg::Short('h') => self.info = Some(Info::Help),
            Arg::Short('V') => self.info = Some(Info::Version),
            Arg::Long(name) => match name.as_str() {
                "input" => self.input = path_arg(args.value()?),
                "output" => self.output = path_arg(args.value()?),
                "pretty" => self.pretty = args.flag()?,
                "newline" => self.newline = args.flag()?,
                "quiet" => self.quiet = args.flag()?,
                "help" => self.info = Some(Info::Help),
                "version" => self.info = Some(Info::Version),
                "license" => self.info = Some(Info::License),
                _ => return Ok(false),
            },
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Takes a positional argument as the input file, then the output file.
    ///
    /// # Errors
    ///
    /// Returns an error on a third positional argument.
    pub fn positional(&mut self, value: OsString) -> Result<(), lexopt::Error> {
        if self.input.is_none() {
            self.input = path_arg(value);
        } else if self.output.is_none() {
            self.output = path_arg(value);
        } else {
            return Err(lexopt::Error::UnexpectedArgument(value));
        }
        Ok(())
    }

    /// Display name of the input.
    #[must_use]
    pub fn input_name(&self) -> String {
        display_name(self.input.as_deref(), "standard input")
    }

    /// Display name of the output.
    #[must_use]
    pub fn output_name(&self) -> String {
        display_name(self.output.as_deref(), "standard output")
    }

    /// Reads the whole input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub fn read_input(&self) -> Result<Vec<u8>, Error> {
        read_all(self.input.as_deref())
    }

    /// Writes `bytes` to the output, followed by a newline if requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_output(&self, bytes: &[u8]) -> Result<(), Error> {
        let mut buf = bytes.to_vec();
        if self.newline {
            buf.push(b'\n');
        }

        let name = self.output_name();
        match &self.output {
            Some(path) => std::fs::write(path, &buf).context(WriteOutputSnafu { name })?,
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(&buf)
                    .and_then(|()| stdout.flush())
                    .context(WriteOutputSnafu { name })?;
            }
        }
        tracing::debug!(bytes = buf.len(), output = %self.output_name(), "wrote output");
        Ok(())
    }
}

/// Reads a whole file, or standard input for `None`.
///
/// # Errors
///
/// Returns an error if reading fails.
pub fn read_all(path: Option<&Path>) -> Result<Vec<u8>, Error> {
    let name = display_name(path, "standard input");
    let buf = match path {
        Some(path) => std::fs::read(path).context(ReadInputSnafu { name: &name })?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context(ReadInputSnafu { name: &name })?;
            buf
        }
    };
    tracing::debug!(bytes = buf.len(), input = %name, "read input");
    Ok(buf)
}

/// `-` stands for standard input or output.
fn path_arg(value: OsString) -> Option<PathBuf> {
    (value != "-").then(|| PathBuf::from(value))
}

fn display_name(path: Option<&Path>, fallback: &str) -> String {
    path.map_or_else(|| fallback.to_owned(), |p| p.display().to_string())
}

/// Installs the stderr log subscriber.
///
/// Warnings and errors are shown by default, only errors with `quiet`.
/// `RUST_LOG` overrides both.
pub fn init_logging(quiet: bool) {
    let level = if quiet { "error" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

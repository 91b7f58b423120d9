// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Concatenates OPML documents into one.
//!
//! The top-level outlines of every input become siblings in the output
//! body, in the order the inputs were named. Directories are searched for
//! `.opml` files.

use opml::cli::{self, Args, Config, Tool};
use opml::outline::Document;
use opml::{parser, renderer};
use snafu::prelude::*;
use std::path::PathBuf;
use walkdir::WalkDir;

const TOOL: Tool = Tool {
    name: "opmlcat",
    about: "Concatenate OPML documents",
    usage: "[OPTIONS] [INPUT]...",
    options: "",
    examples: "\
  opmlcat news.opml blogs.opml -o all.opml
  opmlcat -pretty ~/feeds/ > all.opml",
};

fn parse_args() -> Result<(Config, Vec<PathBuf>), lexopt::Error> {
    let mut args = Args::from_env();
    let mut config = Config::default();
    let mut inputs = Vec::new();

    while let Some(arg) = args.next_arg()? {
        if config.apply(&arg, &mut args)? {
            continue;
        }
        match arg {
            cli::Arg::Value(val) => inputs.push(PathBuf::from(val)),
            _ => return Err(arg.unexpected()),
        }
    }
    if let Some(input) = config.input.take() {
        inputs.insert(0, input);
    }

    Ok((config, inputs))
}

/// Expands directories into the `.opml` files below them, sorted by path.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == "opml")
                {
                    found.push(entry.into_path());
                }
            }
            if found.is_empty() {
                tracing::warn!(dir = %input.display(), "no .opml files found");
            }
            files.append(&mut found);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// Standard input passes through whole; named inputs are merged into a
/// fresh document.
fn concat(config: &Config, inputs: &[PathBuf]) -> Result<Document, cli::Error> {
    if inputs.is_empty() {
        let src = config.read_input()?;
        return parser::parse(&src).context(cli::ParseSnafu {
            name: config.input_name(),
        });
    }

    let files = collect_inputs(inputs).context(cli::WalkDirSnafu)?;
    let docs = files
        .iter()
        .map(|path| {
            let src = cli::read_all(Some(path.as_path()))?;
            parser::parse(&src).context(cli::ParseSnafu {
                name: path.display().to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut doc = Document::new();
    doc.merge(docs).context(cli::MergeSnafu)?;
    Ok(doc)
}

#[snafu::report]
fn main() -> Result<(), cli::Error> {
    let (config, inputs) = parse_args().context(cli::ParseArgsSnafu)?;
    if let Some(info) = config.info {
        TOOL.print(info);
        return Ok(());
    }
    cli::init_logging(config.quiet);

    let doc = concat(&config, &inputs)?;

    let opts = renderer::RenderOptions {
        pretty: config.pretty,
        declaration: true,
        ..Default::default()
    };
    let xml = renderer::render_xml(&doc, &opts).context(cli::RenderSnafu)?;

    config.write_output(&xml)
}

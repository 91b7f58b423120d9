// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Converts an OPML document to JSON.

use opml::cli::{self, Args, Config, Tool};
use opml::{parser, renderer};
use snafu::prelude::*;

const TOOL: Tool = Tool {
    name: "opml2json",
    about: "Convert OPML XML to JSON",
    usage: "[OPTIONS] [INPUT] [OUTPUT]",
    options: "",
    examples: "\
  opml2json myfeeds.opml myfeeds.json
  opml2json -pretty < myfeeds.opml",
};

fn parse_args() -> Result<Config, lexopt::Error> {
    let mut args = Args::from_env();
    let mut config = Config::default();

    while let Some(arg) = args.next_arg()? {
        if config.apply(&arg, &mut args)? {
            continue;
        }
        match arg {
            cli::Arg::Value(val) => config.positional(val)?,
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(config)
}

#[snafu::report]
fn main() -> Result<(), cli::Error> {
    let config = parse_args().context(cli::ParseArgsSnafu)?;
    if let Some(info) = config.info {
        TOOL.print(info);
        return Ok(());
    }
    cli::init_logging(config.quiet);

    let src = config.read_input()?;
    let doc = parser::parse(&src).context(cli::ParseSnafu {
        name: config.input_name(),
    })?;
    let json = renderer::render_json(&doc, config.pretty).context(cli::RenderSnafu)?;

    config.write_output(&json)
}

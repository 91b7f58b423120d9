// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Sorts the outlines of an OPML document at every level.

use opml::cli::{self, Args, Config, Tool};
use opml::tree::{CaseMode, SortKey};
use opml::{parser, renderer};
use snafu::prelude::*;

const TOOL: Tool = Tool {
    name: "opmlsort",
    about: "Sort OPML outlines recursively by title or type",
    usage: "[OPTIONS] [INPUT] [OUTPUT]",
    options: "\
  -title               Sort by the text attribute (default)
  -type                Sort by the type attribute
  -case-insensitive    Ignore case when comparing",
    examples: "\
  opmlsort myfeeds.opml sorted.opml
  opmlsort -case-insensitive -pretty < myfeeds.opml",
};

struct Cli {
    config: Config,
    key: SortKey,
    case: CaseMode,
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    let mut args = Args::from_env();
    let mut config = Config::default();
    let mut key = SortKey::default();
    let mut case = CaseMode::default();

    while let Some(arg) = args.next_arg()? {
        if config.apply(&arg, &mut args)? {
            continue;
        }
        match arg {
            cli::Arg::Long(ref name) if name == "title" => key = SortKey::Label,
            cli::Arg::Long(ref name) if name == "type" => key = SortKey::Kind,
            cli::Arg::Long(ref name) if name == "case-insensitive" => {
                case = if args.flag()? {
                    CaseMode::Insensitive
                } else {
                    CaseMode::Sensitive
                };
            }
            cli::Arg::Value(val) => config.positional(val)?,
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli { config, key, case })
}

#[snafu::report]
fn main() -> Result<(), cli::Error> {
    let Cli { config, key, case } = parse_args().context(cli::ParseArgsSnafu)?;
    if let Some(info) = config.info {
        TOOL.print(info);
        return Ok(());
    }
    cli::init_logging(config.quiet);

    let src = config.read_input()?;
    let mut doc = parser::parse(&src).context(cli::ParseSnafu {
        name: config.input_name(),
    })?;
    doc.sort(key, case);

    let opts = renderer::RenderOptions {
        pretty: config.pretty,
        declaration: true,
        ..Default::default()
    };
    let xml = renderer::render_xml(&doc, &opts).context(cli::RenderSnafu)?;

    config.write_output(&xml)
}

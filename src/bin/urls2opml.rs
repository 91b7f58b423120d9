// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Builds an OPML document from a list of URLs, one per line.

use lexopt::ValueExt;
use opml::cli::{self, Args, Config, Tool};
use opml::renderer;
use opml::urls;
use snafu::prelude::*;

const TOOL: Tool = Tool {
    name: "urls2opml",
    about: "Convert a list of URLs, one per line, to OPML",
    usage: "[OPTIONS] [INPUT] [OUTPUT]",
    options: "\
  -title <TEXT>        Title for the document head",
    examples: "\
  cut -d '\"' -f 1 ~/.newsboat/urls | urls2opml > subscriptions.opml
  urls2opml -title 'My feeds' urls.txt feeds.opml",
};

fn parse_args() -> Result<(Config, Option<String>), lexopt::Error> {
    let mut args = Args::from_env();
    // Output is always indented unless -pretty=false is given.
    let mut config = Config {
        pretty: true,
        ..Config::default()
    };
    let mut title = None;

    while let Some(arg) = args.next_arg()? {
        if config.apply(&arg, &mut args)? {
            continue;
        }
        match arg {
            cli::Arg::Long(ref name) if name == "title" => {
                title = Some(args.value()?.string()?);
            }
            cli::Arg::Value(val) => config.positional(val)?,
            _ => return Err(arg.unexpected()),
        }
    }

    Ok((config, title))
}

#[snafu::report]
fn main() -> Result<(), cli::Error> {
    let (config, title) = parse_args().context(cli::ParseArgsSnafu)?;
    if let Some(info) = config.info {
        TOOL.print(info);
        return Ok(());
    }
    cli::init_logging(config.quiet);

    let src = config.read_input()?;
    let text = std::str::from_utf8(&src).context(cli::NotUtf8Snafu {
        name: config.input_name(),
    })?;

    let list = urls::read_url_list(text);
    for rejected in &list.rejected {
        tracing::warn!(
            line = rejected.line,
            text = %rejected.text,
            "skipping line: {}",
            rejected.reason
        );
    }

    let title = title.unwrap_or_else(|| {
        format!(
            "url list converted with {} {}",
            TOOL.name,
            env!("CARGO_PKG_VERSION")
        )
    });
    let created = urls::rfc822(&chrono::Local::now());
    let doc = list.into_document(&title, &created);

    let opts = renderer::RenderOptions {
        pretty: config.pretty,
        declaration: true,
        ..Default::default()
    };
    let xml = renderer::render_xml(&doc, &opts).context(cli::RenderSnafu)?;

    config.write_output(&xml)
}

// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Lists the feed URLs held by an OPML document.

use opml::cli::{self, Args, Config, Tool};
use opml::parser;
use opml::urls::{self, UrlOptions};
use snafu::prelude::*;

const TOOL: Tool = Tool {
    name: "opml2urls",
    about: "List the URLs of an OPML document, one per line",
    usage: "[OPTIONS] [INPUT] [OUTPUT]",
    options: "\
  -xmlurl[=BOOL]       Print xmlUrl attributes (default: true)
  -htmlurl[=BOOL]      Print htmlUrl attributes (default: false)
  -text-as-comment[=BOOL]
                       Print each outline's text as a # comment (default: false)
  -newsboat            Write a newsboat urls file",
    examples: "\
  opml2urls < subscriptions.opml > urls.txt
  opml2urls -newsboat subscriptions.opml ~/.newsboat/urls",
};

fn parse_args() -> Result<(Config, UrlOptions), lexopt::Error> {
    let mut args = Args::from_env();
    let mut config = Config::default();
    let mut opts = UrlOptions::default();

    while let Some(arg) = args.next_arg()? {
        if config.apply(&arg, &mut args)? {
            continue;
        }
        match arg {
            cli::Arg::Long(ref name) => match name.as_str() {
                "xmlurl" => opts.xml_url = args.flag()?,
                "htmlurl" => opts.html_url = args.flag()?,
                "text-as-comment" => opts.text_as_comment = args.flag()?,
                "newsboat" => opts.newsboat = args.flag()?,
                _ => return Err(arg.unexpected()),
            },
            cli::Arg::Value(val) => config.positional(val)?,
            cli::Arg::Short(_) => return Err(arg.unexpected()),
        }
    }

    Ok((config, opts))
}

#[snafu::report]
fn main() -> Result<(), cli::Error> {
    let (config, opts) = parse_args().context(cli::ParseArgsSnafu)?;
    if let Some(info) = config.info {
        TOOL.print(info);
        return Ok(());
    }
    cli::init_logging(config.quiet);

    let src = config.read_input()?;
    let doc = parser::parse(&src).context(cli::ParseSnafu {
        name: config.input_name(),
    })?;

    let mut out = Vec::new();
    urls::write_urls(&doc, &opts, &mut out).context(cli::WriteOutputSnafu {
        name: config.output_name(),
    })?;

    config.write_output(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_documents_every_boolean_option() {
        let help = TOOL.help();

        for option in ["-xmlurl[=BOOL]", "-htmlurl[=BOOL]", "-text-as-comment[=BOOL]"] {
            assert!(help.contains(option), "{option} missing from help");
        }
        assert!(help.contains("as a # comment (default: false)"));
    }
}

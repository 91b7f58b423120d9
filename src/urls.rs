// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Plain-text URL lists in and out of OPML.
//!
//! [`write_urls`] walks a document and prints the feed addresses it holds,
//! either one per line or in the newsboat `urls` file format.
//! [`read_url_list`] goes the other way, turning a list of URLs into
//! outlines.
//!
//! # Example
//!
//! ```
//! use opml::urls::{read_url_list, write_urls, UrlOptions};
//!
//! let list = read_url_list("# my feeds\nhttps://lwn.net/headlines/rss\n\nftp://old.example\n");
//! assert_eq!(list.rejected.len(), 1);
//!
//! let doc = list.into_document("My feeds", "");
//! let mut out = Vec::new();
//! write_urls(&doc, &UrlOptions::default(), &mut out).unwrap();
//! assert_eq!(out, b"https://lwn.net/headlines/rss\n");
//! ```

use crate::outline::{Document, Outline};
use chrono::{DateTime, TimeZone};
use snafu::prelude::*;
use std::fmt::Display;
use std::io::{self, Write};
use url::Url;

/// Why a line of a URL list was rejected.
#[derive(Debug, Snafu)]
pub enum UrlError {
    /// The line does not parse as an absolute URL.
    #[snafu(display("not a URL: {source}"))]
    Invalid {
        /// The underlying parse error.
        source: url::ParseError,
    },

    /// The URL uses a scheme other than http or https.
    #[snafu(display("unsupported URL scheme {scheme:?}"))]
    UnsupportedScheme {
        /// The scheme that was found.
        scheme: String,
    },
}

/// Which outline attributes [`write_urls`] prints.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct UrlOptions {
    /// Print `xmlUrl` values.
    pub xml_url: bool,

    /// Print `htmlUrl` values.
    pub html_url: bool,

    /// Print each outline's label as a `# ` comment line.
    pub text_as_comment: bool,

    /// Write the newsboat `urls` format instead; the other options are
    /// ignored.
    pub newsboat: bool,
}

impl Default for UrlOptions {
    fn default() -> Self {
        Self {
            xml_url: true,
            html_url: false,
            text_as_comment: false,
            newsboat: false,
        }
    }
}

/// Writes the URLs held by `doc`, in document order.
///
/// In plain mode each outline contributes, in order, an optional `# label`
/// comment, its `xmlUrl` and its `htmlUrl`, each on its own line and each
/// only when enabled and non-empty. In newsboat mode every outline with an
/// `xmlUrl` contributes `URL "~label"`, or just `URL` when it has no label.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn write_urls<W: Write>(doc: &Document, opts: &UrlOptions, out: &mut W) -> io::Result<()> {
    doc.try_walk(|outline| {
        if opts.newsboat {
            write_newsboat_line(outline, out)?;
        } else {
            write_plain_lines(outline, opts, out)?;
        }
        Ok::<_, io::Error>(true)
    })?;
    Ok(())
}

fn write_plain_lines<W: Write>(outline: &Outline, opts: &UrlOptions, out: &mut W) -> io::Result<()> {
    if opts.text_as_comment && !outline.label.is_empty() {
        writeln!(out, "# {}", outline.label)?;
    }
    if opts.xml_url && !outline.feed_url.is_empty() {
        writeln!(out, "{}", outline.feed_url)?;
    }
    if opts.html_url && !outline.html_url.is_empty() {
        writeln!(out, "{}", outline.html_url)?;
    }
    Ok(())
}

fn write_newsboat_line<W: Write>(outline: &Outline, out: &mut W) -> io::Result<()> {
    if outline.feed_url.is_empty() {
        return Ok(());
    }
    if outline.label.is_empty() {
        writeln!(out, "{}", outline.feed_url)
    } else {
        writeln!(out, "{} \"~{}\"", outline.feed_url, quote(&outline.label))
    }
}

/// Escapes a newsboat title so it survives inside double quotes.
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted
}

/// A line of input that [`read_url_list`] did not accept.
#[derive(Debug)]
pub struct RejectedLine {
    /// One-based line number.
    pub line: usize,
    /// The trimmed line content.
    pub text: String,
    /// Why it was rejected.
    pub reason: UrlError,
}

/// The result of reading a URL list.
#[derive(Debug, Default)]
pub struct UrlList {
    /// One outline per accepted URL, in input order.
    pub outlines: Vec<Outline>,
    /// Lines that looked like URLs but were not usable.
    pub rejected: Vec<RejectedLine>,
}

impl UrlList {
    /// Wraps the accepted outlines in a new document.
    ///
    /// `title` and `created` go into the head; empty values are left out of
    /// the rendered output.
    #[must_use]
    pub fn into_document(self, title: &str, created: &str) -> Document {
        let mut doc = Document::new();
        doc.head.title = title.to_owned();
        doc.head.date_created = created.to_owned();
        doc.body.outlines = self.outlines;
        doc
    }
}

/// Reads one URL per line.
///
/// Blank lines and lines starting with `#` are skipped. Every other line must
/// be an absolute `http` or `https` URL; lines that are not are collected in
/// [`UrlList::rejected`] and reading carries on.
#[must_use]
pub fn read_url_list(input: &str) -> UrlList {
    let mut list = UrlList::default();

    for (i, line) in input.lines().enumerate() {
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            tracing::debug!(line = i + 1, "skipping blank or comment line");
            continue;
        }

        match check_url(text) {
            Ok(_) => list.outlines.push(Outline {
                kind: "rss".to_owned(),
                feed_url: text.to_owned(),
                ..Outline::new(text)
            }),
            Err(reason) => list.rejected.push(RejectedLine {
                line: i + 1,
                text: text.to_owned(),
                reason,
            }),
        }
    }

    list
}

/// Checks that `text` is an absolute http(s) URL.
///
/// # Errors
///
/// Returns an error if `text` does not parse or uses another scheme.
pub fn check_url(text: &str) -> Result<Url, UrlError> {
    let url = Url::parse(text).context(InvalidSnafu)?;
    ensure!(
        matches!(url.scheme(), "http" | "https"),
        UnsupportedSchemeSnafu {
            scheme: url.scheme()
        }
    );
    Ok(url)
}

/// Formats a timestamp the way OPML heads carry them (RFC 822 with a
/// numeric zone).
#[must_use]
pub fn rfc822<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%d %b %y %H:%M %z").to_string()
}

// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Writing OPML documents.
//!
//! [`render_xml`] produces OPML/XML and [`render_json`] the JSON projection
//! of the same document.
//!
//! # Output Format
//!
//! The XML output has a literal `opml` root carrying `version`, a `head`
//! with one child element per non-empty field, and a `body` with one
//! `outline` element per node. Elements are always written as start/end
//! pairs. Outline attributes are only written when they hold a value,
//! except `text`, which is always present.
//!
//! [`render_head`], [`render_body`] and [`render_outline`] write a single
//! element as an XML fragment. `Document`, `Head`, `Body` and `Outline` also
//! implement [`Display`](fmt::Display) through these functions; the
//! alternate form (`{:#}`) is indented.
//!
//! A document without top-level outlines is written with a single empty
//! `<outline text="">` placeholder unless
//! [`RenderOptions::empty_placeholder`] is turned off. Existing readers of
//! our output rely on the placeholder, so it is on by default.
//!
//! # Example
//!
//! ```
//! use opml::outline::Document;
//! use opml::renderer::{render_xml, RenderOptions};
//!
//! let xml = render_xml(&Document::new(), &RenderOptions::default()).unwrap();
//! assert_eq!(
//!     String::from_utf8(xml).unwrap(),
//!     r#"<opml version="2.0"><head></head><body><outline text=""></outline></body></opml>"#
//! );
//! ```

use crate::outline::{Body, Document, Head, Outline};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;
use snafu::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};

/// The XML declaration printed ahead of documents by the command-line tools.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Error type for rendering failures.
#[derive(Debug, Snafu)]
pub enum RenderError {
    /// The XML writer failed.
    #[snafu(display("failed to write XML: {source}"))]
    Xml {
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The JSON serializer failed.
    #[snafu(display("failed to write JSON: {source}"))]
    Json {
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The output file could not be written.
    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        /// Path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Configuration options for XML rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Indent nested elements by four spaces.
    pub pretty: bool,

    /// Write a placeholder outline when the body is empty.
    pub empty_placeholder: bool,

    /// Start the output with [`XML_DECLARATION`] and a newline.
    pub declaration: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            empty_placeholder: true,
            declaration: false,
        }
    }
}

/// Renders a document as OPML/XML.
///
/// The document is not modified; the empty-body placeholder only exists in
/// the output.
///
/// # Errors
///
/// Returns an error if the XML writer fails.
pub fn render_xml(doc: &Document, opts: &RenderOptions) -> Result<Vec<u8>, RenderError> {
    let mut out = Vec::new();
    if opts.declaration {
        out.extend_from_slice(XML_DECLARATION.as_bytes());
        out.push(b'\n');
    }

    let mut writer = new_writer(out, opts);

    let mut opml = BytesStart::new("opml");
    opml.push_attribute(("version", doc.version.as_str()));
    writer.write_event(Event::Start(opml)).context(XmlSnafu)?;

    write_head(&mut writer, &doc.head)?;
    write_body(&mut writer, &doc.body, opts.empty_placeholder)?;

    writer
        .write_event(Event::End(BytesEnd::new("opml")))
        .context(XmlSnafu)?;

    Ok(writer.into_inner())
}

/// Renders a `<head>` element on its own.
///
/// Only [`RenderOptions::pretty`] applies.
///
/// # Errors
///
/// Returns an error if the XML writer fails.
pub fn render_head(head: &Head, opts: &RenderOptions) -> Result<Vec<u8>, RenderError> {
    let mut writer = new_writer(Vec::new(), opts);
    write_head(&mut writer, head)?;
    Ok(writer.into_inner())
}

/// Renders a `<body>` element on its own.
///
/// The empty-body placeholder follows [`RenderOptions::empty_placeholder`].
///
/// # Errors
///
/// Returns an error if the XML writer fails.
pub fn render_body(body: &Body, opts: &RenderOptions) -> Result<Vec<u8>, RenderError> {
    let mut writer = new_writer(Vec::new(), opts);
    write_body(&mut writer, body, opts.empty_placeholder)?;
    Ok(writer.into_inner())
}

/// Renders one `<outline>` element and its children.
///
/// Only [`RenderOptions::pretty`] applies.
///
/// # Errors
///
/// Returns an error if the XML writer fails.
pub fn render_outline(outline: &Outline, opts: &RenderOptions) -> Result<Vec<u8>, RenderError> {
    let mut writer = new_writer(Vec::new(), opts);
    write_outline(&mut writer, outline)?;
    Ok(writer.into_inner())
}

fn new_writer(out: Vec<u8>, opts: &RenderOptions) -> Writer<Vec<u8>> {
    if opts.pretty {
        Writer::new_with_indent(out, b' ', 4)
    } else {
        Writer::new(out)
    }
}

/// Formats with `render`, indenting for `{:#}`.
fn display<T>(
    value: &T,
    f: &mut fmt::Formatter<'_>,
    render: fn(&T, &RenderOptions) -> Result<Vec<u8>, RenderError>,
) -> fmt::Result {
    let opts = RenderOptions {
        pretty: f.alternate(),
        ..RenderOptions::default()
    };
    let xml = render(value, &opts).map_err(|_| fmt::Error)?;
    f.write_str(&String::from_utf8_lossy(&xml))
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(self, f, render_xml)
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(self, f, render_head)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(self, f, render_body)
    }
}

impl fmt::Display for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(self, f, render_outline)
    }
}

/// Renders a document as OPML/XML into a file.
///
/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written.
pub fn write_file(
    doc: &Document,
    path: impl AsRef<Path>,
    opts: &RenderOptions,
) -> Result<(), RenderError> {
    let path = path.as_ref();
    let xml = render_xml(doc, opts)?;
    std::fs::write(path, xml).context(WriteFileSnafu { path })
}

/// Renders the JSON projection of a document.
///
/// Field names match the XML attribute and element names. Empty fields are
/// left out, except `body.outline`, which is always present. The empty-body
/// placeholder is never applied to JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(doc: &Document, pretty: bool) -> Result<Vec<u8>, RenderError> {
    if !pretty {
        return serde_json::to_vec(doc).context(JsonSnafu);
    }

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    doc.serialize(&mut ser).context(JsonSnafu)?;
    Ok(out)
}

fn write_head(writer: &mut Writer<Vec<u8>>, head: &Head) -> Result<(), RenderError> {
    writer
        .write_event(Event::Start(BytesStart::new("head")))
        .context(XmlSnafu)?;

    let text_fields = [
        ("title", &head.title),
        ("dateCreated", &head.date_created),
        ("dateModified", &head.date_modified),
        ("ownerName", &head.owner_name),
        ("ownerEmail", &head.owner_email),
        ("ownerId", &head.owner_id),
        ("docs", &head.docs),
        ("expansionState", &head.expansion_state),
    ];
    for (name, value) in text_fields {
        write_text_element(writer, name, value)?;
    }

    let number_fields = [
        ("vertScrollState", head.vert_scroll_state),
        ("windowTop", head.window_top),
        ("windowLeft", head.window_left),
        ("windowBottom", head.window_bottom),
        ("windowRight", head.window_right),
    ];
    for (name, value) in number_fields {
        if value != 0 {
            write_text_element(writer, name, &value.to_string())?;
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new("head")))
        .context(XmlSnafu)
}

fn write_body(
    writer: &mut Writer<Vec<u8>>,
    body: &Body,
    placeholder: bool,
) -> Result<(), RenderError> {
    writer
        .write_event(Event::Start(BytesStart::new("body")))
        .context(XmlSnafu)?;
    if body.outlines.is_empty() && placeholder {
        write_outline(writer, &Outline::default())?;
    }
    for outline in &body.outlines {
        write_outline(writer, outline)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("body")))
        .context(XmlSnafu)
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: &str,
) -> Result<(), RenderError> {
    if value.is_empty() {
        return Ok(());
    }
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .context(XmlSnafu)?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .context(XmlSnafu)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .context(XmlSnafu)
}

fn write_outline(writer: &mut Writer<Vec<u8>>, outline: &Outline) -> Result<(), RenderError> {
    let mut start = BytesStart::new("outline");
    start.push_attribute(("text", outline.label.as_str()));

    let flag = |set: bool| if set { "true" } else { "" };
    let attributes = [
        ("type", outline.kind.as_str()),
        ("isComment", flag(outline.is_comment)),
        ("isBreakpoint", flag(outline.is_breakpoint)),
        ("created", outline.created.as_str()),
        ("category", outline.category.as_str()),
        ("xmlUrl", outline.feed_url.as_str()),
        ("htmlUrl", outline.html_url.as_str()),
        ("language", outline.language.as_str()),
        ("description", outline.description.as_str()),
        ("version", outline.version.as_str()),
        ("url", outline.url.as_str()),
    ];
    for (name, value) in attributes {
        if !value.is_empty() {
            start.push_attribute((name, value));
        }
    }

    writer.write_event(Event::Start(start)).context(XmlSnafu)?;
    for child in &outline.children {
        write_outline(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("outline")))
        .context(XmlSnafu)
}

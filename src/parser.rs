// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Reading OPML documents.
//!
//! [`parse`] turns an OPML/XML byte buffer into a [`Document`], and
//! [`parse_json`] reads the JSON projection produced by
//! [`render_json`](crate::renderer::render_json).
//!
//! The XML reader is forgiving about content it does not know: unknown
//! attributes are dropped and unknown elements are skipped together with
//! everything nested inside them. It is strict about structure. Malformed
//! XML, a missing root, or a root that is not `<opml>` is an error, and a
//! failed parse never yields a partial document.
//!
//! # Example
//!
//! ```
//! use opml::parser::parse;
//!
//! let xml = br#"<opml version="2.0">
//!   <head><title>Feeds</title></head>
//!   <body>
//!     <outline text="Tech">
//!       <outline text="LWN" type="rss" xmlUrl="https://lwn.net/headlines/rss"/>
//!     </outline>
//!   </body>
//! </opml>"#;
//!
//! let doc = parse(xml).unwrap();
//! assert_eq!(doc.head.title, "Feeds");
//! assert_eq!(doc.body.outlines[0].children[0].kind, "rss");
//! ```

use crate::outline::{Document, Head, Outline};
use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use snafu::prelude::*;
use std::path::{Path, PathBuf};

/// Error type for reading OPML documents.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// The input is not well-formed XML.
    #[snafu(display("malformed XML: {source}"))]
    Xml {
        /// The underlying XML error.
        source: quick_xml::Error,
    },

    /// An element carries a malformed attribute.
    #[snafu(display("malformed attribute: {source}"))]
    Attribute {
        /// The underlying attribute error.
        source: AttrError,
    },

    /// The input contains no root element.
    #[snafu(display("no root element found"))]
    MissingRoot,

    /// The root element is something other than `<opml>`.
    #[snafu(display("root element is <{found}>, expected <opml>"))]
    NotOpml {
        /// Name of the root element that was found.
        found: String,
    },

    /// The input ended inside an element.
    #[snafu(display("unexpected end of input inside <{element}>"))]
    Unclosed {
        /// Innermost element left open.
        element: String,
    },

    /// A boolean attribute has an unrecognized value.
    #[snafu(display("invalid boolean {value:?} for {name}"))]
    InvalidBool {
        /// Attribute name.
        name: &'static str,
        /// The offending value.
        value: String,
    },

    /// A numeric head element does not hold an integer.
    #[snafu(display("invalid integer {value:?} in <{name}>: {source}"))]
    InvalidInteger {
        /// Element name.
        name: &'static str,
        /// The offending value.
        value: String,
        /// The underlying conversion error.
        source: std::num::ParseIntError,
    },

    /// The JSON projection could not be decoded.
    #[snafu(display("failed to parse JSON: {source}"))]
    Json {
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The file could not be read.
    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        /// Path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Parses an OPML/XML byte buffer into a [`Document`].
///
/// A missing `version` attribute on the root gives the default version.
/// Head text is kept exactly as written; whitespace between elements is
/// ignored.
///
/// # Errors
///
/// Returns an error if the buffer is not well-formed XML, the root element
/// is missing or is not `<opml>`, or a typed field holds a value of the
/// wrong type.
pub fn parse(src: &[u8]) -> Result<Document, ParseError> {
    let mut reader = Reader::from_reader(src);

    let mut root = None;
    let mut stack: Vec<Frame> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).context(XmlSnafu)? {
            Event::Start(e) => {
                let frame = open(&e, reader.decoder(), stack.last(), root.is_some())?;
                stack.push(frame);
            }
            Event::Empty(e) => {
                let frame = open(&e, reader.decoder(), stack.last(), root.is_some())?;
                close(frame, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    close(frame, &mut stack, &mut root)?;
                }
            }
            Event::Text(e) => {
                if let Some(Frame::HeadField(_, text)) = stack.last_mut() {
                    text.push_str(&e.unescape().context(XmlSnafu)?);
                }
            }
            Event::CData(e) => {
                if let Some(Frame::HeadField(_, text)) = stack.last_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(frame) = stack.last() {
        return UnclosedSnafu {
            element: frame.element(),
        }
        .fail();
    }

    let doc = root.context(MissingRootSnafu)?;
    tracing::debug!(
        version = %doc.version,
        outlines = doc.count(),
        "parsed OPML document"
    );
    Ok(doc)
}

/// Reads and parses an OPML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document, ParseError> {
    let path = path.as_ref();
    let src = std::fs::read(path).context(ReadFileSnafu { path })?;
    parse(&src)
}

/// Decodes the JSON projection of a document.
///
/// # Errors
///
/// Returns an error if the input is not valid JSON for a [`Document`].
pub fn parse_json(src: &[u8]) -> Result<Document, ParseError> {
    serde_json::from_slice(src).context(JsonSnafu)
}

/// Parses a boolean the way OPML producers write them.
///
/// Surrounding whitespace is ignored and an empty value reads as `false`.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        _ => None,
    }
}

/// An element that is open while reading.
enum Frame {
    Opml(Document),
    Head(Head),
    HeadField(HeadField, String),
    Body(Vec<Outline>),
    Outline(Outline),
    /// Unknown element; its whole subtree is ignored.
    Skip(String),
}

impl Frame {
    fn element(&self) -> String {
        match self {
            Self::Opml(_) => "opml".to_owned(),
            Self::Head(_) => "head".to_owned(),
            Self::HeadField(field, _) => field.name().to_owned(),
            Self::Body(_) => "body".to_owned(),
            Self::Outline(_) => "outline".to_owned(),
            Self::Skip(name) => name.clone(),
        }
    }
}

/// Builds the frame for a newly opened element.
fn open(
    e: &BytesStart<'_>,
    decoder: Decoder,
    parent: Option<&Frame>,
    seen_root: bool,
) -> Result<Frame, ParseError> {
    let name = e.name();
    let name = name.as_ref();
    let skip = || Frame::Skip(String::from_utf8_lossy(name).into_owned());

    Ok(match parent {
        None if seen_root => skip(),
        None => {
            ensure!(
                name == b"opml",
                NotOpmlSnafu {
                    found: String::from_utf8_lossy(name)
                }
            );
            Frame::Opml(read_opml(e, decoder)?)
        }
        Some(Frame::Opml(_)) => match name {
            b"head" => Frame::Head(Head::default()),
            b"body" => Frame::Body(Vec::new()),
            _ => skip(),
        },
        Some(Frame::Head(_)) => HeadField::from_name(name)
            .map_or_else(skip, |field| Frame::HeadField(field, String::new())),
        Some(Frame::Body(_) | Frame::Outline(_)) if name == b"outline" => {
            Frame::Outline(read_outline(e, decoder)?)
        }
        Some(_) => skip(),
    })
}

/// Attaches a finished element to its parent.
fn close(
    frame: Frame,
    stack: &mut [Frame],
    root: &mut Option<Document>,
) -> Result<(), ParseError> {
    match (frame, stack.last_mut()) {
        (Frame::Outline(outline), Some(Frame::Body(outlines))) => outlines.push(outline),
        (Frame::Outline(outline), Some(Frame::Outline(parent))) => parent.children.push(outline),
        (Frame::Body(outlines), Some(Frame::Opml(doc))) => doc.body.outlines.extend(outlines),
        (Frame::Head(head), Some(Frame::Opml(doc))) => doc.head = head,
        (Frame::HeadField(field, text), Some(Frame::Head(head))) => field.assign(head, text)?,
        (Frame::Opml(doc), None) => *root = Some(doc),
        _ => {}
    }
    Ok(())
}

fn read_opml(e: &BytesStart<'_>, decoder: Decoder) -> Result<Document, ParseError> {
    let mut doc = Document::new();
    for attr in e.attributes() {
        let attr = attr.context(AttributeSnafu)?;
        if attr.key.as_ref() == b"version" {
            doc.version = attr
                .decode_and_unescape_value(decoder)
                .context(XmlSnafu)?
                .into_owned();
        }
    }
    Ok(doc)
}

fn read_outline(e: &BytesStart<'_>, decoder: Decoder) -> Result<Outline, ParseError> {
    let mut outline = Outline::default();
    for attr in e.attributes() {
        let attr = attr.context(AttributeSnafu)?;
        let value = attr
            .decode_and_unescape_value(decoder)
            .context(XmlSnafu)?
            .into_owned();
        match attr.key.as_ref() {
            b"text" => outline.label = value,
            b"type" => outline.kind = value,
            b"isComment" => outline.is_comment = read_bool("isComment", value)?,
            b"isBreakpoint" => outline.is_breakpoint = read_bool("isBreakpoint", value)?,
            b"created" => outline.created = value,
            b"category" => outline.category = value,
            b"xmlUrl" => outline.feed_url = value,
            b"htmlUrl" => outline.html_url = value,
            b"language" => outline.language = value,
            b"description" => outline.description = value,
            b"version" => outline.version = value,
            b"url" => outline.url = value,
            _ => {}
        }
    }
    Ok(outline)
}

fn read_bool(name: &'static str, value: String) -> Result<bool, ParseError> {
    parse_bool(&value).context(InvalidBoolSnafu { name, value })
}

fn read_int(name: &'static str, value: &str) -> Result<i64, ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value.parse().context(InvalidIntegerSnafu { name, value })
}

/// The `<head>` children we understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadField {
    Title,
    DateCreated,
    DateModified,
    OwnerName,
    OwnerEmail,
    OwnerId,
    Docs,
    ExpansionState,
    VertScrollState,
    WindowTop,
    WindowLeft,
    WindowBottom,
    WindowRight,
}

impl HeadField {
    const ALL: [Self; 13] = [
        Self::Title,
        Self::DateCreated,
        Self::DateModified,
        Self::OwnerName,
        Self::OwnerEmail,
        Self::OwnerId,
        Self::Docs,
        Self::ExpansionState,
        Self::VertScrollState,
        Self::WindowTop,
        Self::WindowLeft,
        Self::WindowBottom,
        Self::WindowRight,
    ];

    fn from_name(name: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name().as_bytes() == name)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::DateCreated => "dateCreated",
            Self::DateModified => "dateModified",
            Self::OwnerName => "ownerName",
            Self::OwnerEmail => "ownerEmail",
            Self::OwnerId => "ownerId",
            Self::Docs => "docs",
            Self::ExpansionState => "expansionState",
            Self::VertScrollState => "vertScrollState",
            Self::WindowTop => "windowTop",
            Self::WindowLeft => "windowLeft",
            Self::WindowBottom => "windowBottom",
            Self::WindowRight => "windowRight",
        }
    }

    fn assign(self, head: &mut Head, text: String) -> Result<(), ParseError> {
        let name = self.name();
        match self {
            Self::Title => head.title = text,
            Self::DateCreated => head.date_created = text,
            Self::DateModified => head.date_modified = text,
            Self::OwnerName => head.owner_name = text,
            Self::OwnerEmail => head.owner_email = text,
            Self::OwnerId => head.owner_id = text,
            Self::Docs => head.docs = text,
            Self::ExpansionState => head.expansion_state = text,
            Self::VertScrollState => head.vert_scroll_state = read_int(name, &text)?,
            Self::WindowTop => head.window_top = read_int(name, &text)?,
            Self::WindowLeft => head.window_left = read_int(name, &text)?,
            Self::WindowBottom => head.window_bottom = read_int(name, &text)?,
            Self::WindowRight => head.window_right = read_int(name, &text)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let doc = parse(br#"<opml version="1.0"><head></head><body></body></opml>"#).unwrap();

        assert_eq!(doc.version, "1.0");
        assert!(doc.head.is_empty());
        assert!(doc.is_empty());
    }

    #[test]
    fn missing_version_uses_default() {
        let doc = parse(b"<opml><body/></opml>").unwrap();
        assert_eq!(doc.version, "2.0");
    }

    #[test]
    fn parses_head_fields() {
        let doc = parse(
            br"<opml version='2.0'><head>
                <title>Subscriptions</title>
                <dateCreated>Mon, 23 May 2016 08:33:00 GMT</dateCreated>
                <ownerName>Jane Doe</ownerName>
                <ownerEmail>jane@example.org</ownerEmail>
                <ownerId>https://example.org/jane</ownerId>
                <docs>http://opml.org/spec2.opml</docs>
                <expansionState>1,6,13</expansionState>
                <vertScrollState>1</vertScrollState>
                <windowTop>61</windowTop>
                <windowLeft>304</windowLeft>
                <windowBottom>562</windowBottom>
                <windowRight>842</windowRight>
            </head><body/></opml>",
        )
        .unwrap();

        assert_eq!(doc.head.title, "Subscriptions");
        assert_eq!(doc.head.date_created, "Mon, 23 May 2016 08:33:00 GMT");
        assert_eq!(doc.head.owner_name, "Jane Doe");
        assert_eq!(doc.head.owner_email, "jane@example.org");
        assert_eq!(doc.head.owner_id, "https://example.org/jane");
        assert_eq!(doc.head.docs, "http://opml.org/spec2.opml");
        assert_eq!(doc.head.expansion_state, "1,6,13");
        assert_eq!(doc.head.vert_scroll_state, 1);
        assert_eq!(doc.head.window_top, 61);
        assert_eq!(doc.head.window_left, 304);
        assert_eq!(doc.head.window_bottom, 562);
        assert_eq!(doc.head.window_right, 842);
    }

    #[test]
    fn parses_outline_attributes() {
        let doc = parse(
            br#"<opml version="2.0"><body>
                <outline text="LWN" type="rss" isComment="true" isBreakpoint="1"
                    created="Sat, 28 May 2016 15:48:19 GMT" category="/tech"
                    xmlUrl="https://lwn.net/headlines/rss" htmlUrl="https://lwn.net"
                    language="en" description="Linux news" version="RSS2"
                    url="https://lwn.net/about"/>
            </body></opml>"#,
        )
        .unwrap();

        let lwn = &doc.body.outlines[0];
        assert_eq!(lwn.label, "LWN");
        assert_eq!(lwn.kind, "rss");
        assert!(lwn.is_comment);
        assert!(lwn.is_breakpoint);
        assert_eq!(lwn.created, "Sat, 28 May 2016 15:48:19 GMT");
        assert_eq!(lwn.category, "/tech");
        assert_eq!(lwn.feed_url, "https://lwn.net/headlines/rss");
        assert_eq!(lwn.html_url, "https://lwn.net");
        assert_eq!(lwn.language, "en");
        assert_eq!(lwn.description, "Linux news");
        assert_eq!(lwn.version, "RSS2");
        assert_eq!(lwn.url, "https://lwn.net/about");
    }

    #[test]
    fn parses_nested_outlines_in_order() {
        let doc = parse(
            br#"<opml version="2.0"><body>
                <outline text="root zero">
                    <outline text="child zero">
                        <outline text="grandchild zero"/>
                    </outline>
                    <outline text="child one"/>
                </outline>
                <outline text="root one"/>
            </body></opml>"#,
        )
        .unwrap();

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.count(), 5);
        assert_eq!(doc.body.outlines[0].children[1].label, "child one");
        assert_eq!(
            doc.body.outlines[0].children[0].children[0].label,
            "grandchild zero"
        );
        assert!(!doc.body.outlines[1].has_children());
    }

    #[test]
    fn unescapes_entities() {
        let doc = parse(
            br#"<opml version="2.0"><head><title>Tom &amp; Jerry</title></head><body>
                <outline text="&lt;a href=&quot;http://example.org&quot;&gt;Jane&lt;/a&gt;"/>
            </body></opml>"#,
        )
        .unwrap();

        assert_eq!(doc.head.title, "Tom & Jerry");
        assert_eq!(
            doc.body.outlines[0].label,
            r#"<a href="http://example.org">Jane</a>"#
        );
    }

    #[test]
    fn ignores_unknown_attributes_and_elements() {
        let doc = parse(
            br#"<opml version="2.0" xmlns:x="urn:x">
                <head><title>t</title><lastCursor>2</lastCursor></head>
                <body>
                    <outline text="a" title="ignored" x:custom="1"/>
                    <extra><outline text="hidden"/></extra>
                    <outline text="b"/>
                </body>
            </opml>"#,
        )
        .unwrap();

        assert_eq!(doc.head.title, "t");
        let labels: Vec<_> = doc.body.outlines.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["a", "b"]);
    }

    #[test]
    fn rejects_non_opml_root() {
        let err = parse(b"<rss version=\"2.0\"><channel/></rss>").unwrap_err();
        assert!(matches!(err, ParseError::NotOpml { ref found } if found == "rss"));
    }

    #[test]
    fn rejects_missing_root() {
        assert!(matches!(parse(b"").unwrap_err(), ParseError::MissingRoot));
        assert!(matches!(
            parse(b"not xml at all").unwrap_err(),
            ParseError::MissingRoot
        ));
    }

    #[test]
    fn rejects_mismatched_tags() {
        let err = parse(b"<opml><body><outline text=\"a\"></body></opml>").unwrap_err();
        assert!(matches!(err, ParseError::Xml { .. }));
    }

    #[test]
    fn rejects_unclosed_document() {
        let cases: [(&[u8], &str); 3] = [
            (b"<opml version=\"2.0\"><body><outline text=\"a\">", "outline"),
            (b"<opml version=\"2.0\">", "opml"),
            (b"<opml><head><title>Feeds", "title"),
        ];
        for (src, open) in cases {
            let err = parse(src).unwrap_err();
            assert!(
                matches!(err, ParseError::Unclosed { ref element } if element == open),
                "{err:?}"
            );
        }
    }

    #[test]
    fn keeps_head_whitespace() {
        let doc = parse(
            b"<opml>\n  <head>\n    <title>  Feeds </title>\n    <ownerName> </ownerName>\n  </head>\n  <body/>\n</opml>\n",
        )
        .unwrap();

        assert_eq!(doc.head.title, "  Feeds ");
        assert_eq!(doc.head.owner_name, " ");
    }

    #[test]
    fn joins_text_and_cdata() {
        let doc =
            parse(b"<opml><head><title>a <![CDATA[b & c]]> d</title></head><body/></opml>").unwrap();
        assert_eq!(doc.head.title, "a b & c d");
    }

    #[test]
    fn integer_fields_ignore_surrounding_whitespace() {
        let doc = parse(b"<opml><head><windowTop>\n 61 \n</windowTop></head><body/></opml>").unwrap();
        assert_eq!(doc.head.window_top, 61);
    }

    #[test]
    fn rejects_bad_boolean() {
        let err = parse(b"<opml><body><outline text=\"a\" isComment=\"maybe\"/></body></opml>")
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidBool { name: "isComment", .. }));
    }

    #[test]
    fn rejects_bad_integer() {
        let err =
            parse(b"<opml><head><windowTop>high</windowTop></head><body/></opml>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidInteger { name: "windowTop", .. }));
    }

    #[test]
    fn empty_integer_reads_as_zero() {
        let doc = parse(b"<opml><head><windowTop></windowTop></head><body/></opml>").unwrap();
        assert_eq!(doc.head.window_top, 0);
    }

    #[test]
    fn parses_boolean_spellings() {
        for value in ["1", "t", "T", "true", "TRUE", "True", " true "] {
            assert_eq!(parse_bool(value), Some(true), "{value}");
        }
        for value in ["", "0", "f", "F", "false", "FALSE", "False"] {
            assert_eq!(parse_bool(value), Some(false), "{value}");
        }
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn parses_json_projection() {
        let doc = parse_json(
            br#"{"version":"1.0","head":{"title":"t"},"body":{"outline":[
                {"text":"a","type":"rss","xmlUrl":"https://a.example/feed","outline":[{"text":"b"}]}
            ]}}"#,
        )
        .unwrap();

        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.head.title, "t");
        assert_eq!(doc.body.outlines[0].feed_url, "https://a.example/feed");
        assert_eq!(doc.body.outlines[0].children[0].label, "b");
    }

    #[test]
    fn json_defaults_missing_fields() {
        let doc = parse_json(b"{}").unwrap();
        assert_eq!(doc, Document::new());
    }

    #[test]
    fn reports_missing_file() {
        let err = parse_file("/nonexistent/feeds.opml").unwrap_err();
        assert!(matches!(err, ParseError::ReadFile { .. }));
    }
}

// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Read, sort, concatenate and convert OPML outlines.
//!
//! This crate models an OPML document as a tree of outline nodes and
//! provides the pieces behind a small family of command-line converters:
//! `opml2json`, `opmlcat`, `opmlsort`, `opml2urls` and `urls2opml`.
//!
//! # Overview
//!
//! 1. [`parser`] reads OPML XML into a [`Document`](outline::Document)
//! 2. [`tree`] sorts, walks and merges outline trees
//! 3. [`renderer`] writes the document back as XML or projects it to JSON
//!
//! # Example
//!
//! ```
//! use opml::tree::{CaseMode, SortKey};
//! use opml::{parser, renderer};
//!
//! let src = br#"<opml version="2.0"><head><title>Feeds</title></head><body>
//!     <outline text="Zed"/><outline text="alpha"/>
//! </body></opml>"#;
//!
//! let mut doc = parser::parse(src).unwrap();
//! doc.sort(SortKey::Label, CaseMode::Insensitive);
//!
//! let xml = renderer::render_xml(&doc, &renderer::RenderOptions::default()).unwrap();
//! assert_eq!(
//!     String::from_utf8(xml).unwrap(),
//!     r#"<opml version="2.0"><head><title>Feeds</title></head><body><outline text="alpha"></outline><outline text="Zed"></outline></body></opml>"#
//! );
//! ```
//!
//! # Modules
//!
//! - [`outline`]: the document model
//! - [`parser`]: XML and JSON input
//! - [`renderer`]: XML and JSON output with configurable options
//! - [`tree`]: recursive sort, pre-order walk, merge
//! - [`urls`]: plain URL lists and the newsboat `urls` format
//! - [`cli`]: argument handling and I/O shared by the binaries

#![deny(missing_docs)]

pub mod cli;
pub mod outline;
pub mod parser;
pub mod renderer;
pub mod tree;
pub mod urls;

// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! The OPML document model.
//!
//! An OPML document is a [`Head`] of descriptive metadata and a [`Body`]
//! holding an ordered list of top-level [`Outline`] nodes. Each outline owns
//! its children, so a [`Document`] is a plain tree with no shared nodes.
//!
//! Optional string fields use the empty string for "absent". This mirrors
//! the wire format, where empty attributes are simply left out, and keeps a
//! parsed document equal to itself after a round trip.
//!
//! # Example
//!
//! ```
//! use opml::outline::{Document, Outline};
//!
//! let mut doc = Document::new();
//! let mut news = Outline::new("News");
//! news.append_child(Outline::new("LWN")).unwrap();
//! doc.body.outlines.push(news);
//!
//! assert_eq!(doc.len(), 1);
//! assert_eq!(doc.count(), 2);
//! assert_eq!(doc.select(&[0, 0]).map(|o| o.label.as_str()), Some("LWN"));
//! ```

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

/// The format version given to new documents.
pub const DEFAULT_VERSION: &str = "2.0";

/// Error type for [`Outline::append_child`].
#[derive(Debug, Snafu)]
pub enum AppendError {
    /// The child list did not grow by exactly one element.
    #[snafu(display("failed to append outline: expected {expected} children, found {found}"))]
    LengthMismatch {
        /// Child count expected after the append.
        expected: usize,
        /// Child count actually present.
        found: usize,
    },

    /// The last child is not the outline that was appended.
    #[snafu(display("failed to append outline {label:?}"))]
    LabelMismatch {
        /// Label of the outline that was appended.
        label: String,
    },
}

/// A single node of the outline tree.
///
/// Field names follow Rust conventions; the XML attribute and JSON key for
/// each field is noted on the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outline {
    /// Human readable title (`text`).
    #[serde(rename = "text", default)]
    pub label: String,

    /// Type discriminator such as `rss` or `link` (`type`).
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    /// `isComment`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_comment: bool,

    /// `isBreakpoint`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_breakpoint: bool,

    /// Creation time as an RFC 822 string, stored verbatim (`created`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created: String,

    /// `category`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,

    /// Feed address (`xmlUrl`).
    #[serde(rename = "xmlUrl", default, skip_serializing_if = "String::is_empty")]
    pub feed_url: String,

    /// Web site address (`htmlUrl`).
    #[serde(rename = "htmlUrl", default, skip_serializing_if = "String::is_empty")]
    pub html_url: String,

    /// `language`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,

    /// `description`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// `version`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// `url`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,

    /// Nested outlines, in document order (`outline`).
    #[serde(rename = "outline", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Outline>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(b: &bool) -> bool {
    !*b
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(n: &i64) -> bool {
    *n == 0
}

impl Outline {
    /// Creates a leaf outline with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if this outline has at least one child.
    #[must_use]
    pub const fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Appends `child` as the last child of this outline.
    ///
    /// # Errors
    ///
    /// Returns an error if the child list does not end with the new outline
    /// afterwards.
    pub fn append_child(&mut self, child: Self) -> Result<(), AppendError> {
        let expected = self.children.len() + 1;
        let label = child.label.clone();
        self.children.push(child);

        let found = self.children.len();
        ensure!(found == expected, LengthMismatchSnafu { expected, found });
        ensure!(
            self.children.last().is_some_and(|last| last.label == label),
            LabelMismatchSnafu { label }
        );
        Ok(())
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// Document metadata. Purely descriptive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Head {
    /// `title`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    /// `dateCreated`, RFC 822.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date_created: String,

    /// `dateModified`, RFC 822.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date_modified: String,

    /// `ownerName`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner_name: String,

    /// `ownerEmail`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner_email: String,

    /// `ownerId`, a URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner_id: String,

    /// `docs`, a URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub docs: String,

    /// `expansionState`, a comma separated list of line numbers.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expansion_state: String,

    /// `vertScrollState`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub vert_scroll_state: i64,

    /// `windowTop`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub window_top: i64,

    /// `windowLeft`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub window_left: i64,

    /// `windowBottom`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub window_bottom: i64,

    /// `windowRight`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub window_right: i64,
}

impl Head {
    /// Returns `true` if no field carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The top-level outline sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    /// Top-level outlines, in document order.
    #[serde(rename = "outline", default)]
    pub outlines: Vec<Outline>,
}

/// A complete OPML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Format version, e.g. `1.0` or `2.0`.
    #[serde(default = "default_version")]
    pub version: String,

    /// Document metadata.
    #[serde(default, skip_serializing_if = "Head::is_empty")]
    pub head: Head,

    /// The outline tree.
    #[serde(default)]
    pub body: Body,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_owned()
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty version 2.0 document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: default_version(),
            head: Head::default(),
            body: Body::default(),
        }
    }

    /// Number of top-level outlines.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.body.outlines.len()
    }

    /// Returns `true` if the body has no top-level outlines.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.body.outlines.is_empty()
    }

    /// Total number of outlines at every level.
    #[must_use]
    pub fn count(&self) -> usize {
        self.body.outlines.iter().map(Outline::count).sum()
    }

    /// Looks up an outline by index path.
    ///
    /// `[2, 0]` is the first child of the third top-level outline. An empty
    /// path, or any index past the end of its level, yields `None`.
    #[must_use]
    pub fn select(&self, path: &[usize]) -> Option<&Outline> {
        let (first, rest) = path.split_first()?;
        let mut current = self.body.outlines.get(*first)?;
        for i in rest {
            current = current.children.get(*i)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new();
        let mut tech = Outline::new("Tech");
        tech.children.push(Outline::new("LWN"));
        tech.children.push(Outline::new("Hacker News"));
        doc.body.outlines.push(tech);
        doc.body.outlines.push(Outline::new("Weather"));
        doc
    }

    #[test]
    fn new_document_is_empty_version_two() {
        let doc = Document::new();

        assert_eq!(doc.version, "2.0");
        assert!(doc.head.is_empty());
        assert!(doc.is_empty());
        assert_eq!(doc, Document::default());
    }

    #[test]
    fn counts_top_level_and_total() {
        let doc = sample();

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.count(), 4);
    }

    #[test]
    fn selects_by_index_path() {
        let doc = sample();

        assert_eq!(doc.select(&[0]).map(|o| o.label.as_str()), Some("Tech"));
        assert_eq!(
            doc.select(&[0, 1]).map(|o| o.label.as_str()),
            Some("Hacker News")
        );
        assert_eq!(doc.select(&[1]).map(|o| o.label.as_str()), Some("Weather"));
    }

    #[test]
    fn select_off_the_tree_is_none() {
        let doc = sample();

        assert!(doc.select(&[]).is_none());
        assert!(doc.select(&[2]).is_none());
        assert!(doc.select(&[1, 0]).is_none());
        assert!(doc.select(&[0, 5]).is_none());
    }

    #[test]
    fn append_child_adds_last() {
        let mut parent = Outline::new("parent");
        assert!(!parent.has_children());

        parent.append_child(Outline::new("a")).unwrap();
        parent.append_child(Outline::new("b")).unwrap();

        assert!(parent.has_children());
        assert_eq!(parent.children.len(), 2);
        assert_eq!(parent.children[1].label, "b");
    }

    #[test]
    fn head_with_any_value_is_not_empty() {
        let head = Head {
            window_top: 10,
            ..Head::default()
        };
        assert!(!head.is_empty());
    }
}

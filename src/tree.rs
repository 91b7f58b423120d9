// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Operations over the outline tree: sorting, walking and merging.
//!
//! # Example
//!
//! ```
//! use opml::outline::{Document, Outline};
//! use opml::tree::{CaseMode, SortKey};
//!
//! let mut doc = Document::new();
//! for label in ["Gamma", "alpha", "Beta"] {
//!     doc.body.outlines.push(Outline::new(label));
//! }
//!
//! doc.sort(SortKey::Label, CaseMode::Insensitive);
//!
//! let mut seen = Vec::new();
//! doc.walk(|outline| {
//!     seen.push(outline.label.clone());
//!     true
//! });
//! assert_eq!(seen, ["alpha", "Beta", "Gamma"]);
//! ```

use crate::outline::{Document, Outline};
use snafu::prelude::*;
use std::convert::Infallible;

/// Error type for [`Document::merge`] and [`Document::merge_from`].
#[derive(Debug, Snafu)]
pub enum MergeError {
    /// The merged body does not hold every contributed outline.
    #[snafu(display("merge produced {found} top-level outlines, expected {expected}"))]
    CountMismatch {
        /// Outline count the merge should have produced.
        expected: usize,
        /// Outline count actually present.
        found: usize,
    },
}

/// The outline field to order by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Order by the `text` label.
    #[default]
    Label,
    /// Order by the `type` discriminator.
    Kind,
}

impl SortKey {
    /// Returns the function that extracts this key from an outline.
    #[must_use]
    pub fn extractor(self) -> fn(&Outline) -> &str {
        match self {
            Self::Label => label,
            Self::Kind => kind,
        }
    }
}

fn label(outline: &Outline) -> &str {
    &outline.label
}

fn kind(outline: &Outline) -> &str {
    &outline.kind
}

/// How sort keys are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseMode {
    /// Plain code point order, so `Z` sorts before `a`.
    #[default]
    Sensitive,
    /// Both keys are lowercased before comparing.
    Insensitive,
}

/// Sorts `outlines` and every level below them.
///
/// Each outline's children are sorted before the outline's own level, and
/// every level is ordered by `key` alone. The sort is stable, so outlines
/// with equal keys keep their relative order.
pub fn sort_outlines<K>(outlines: &mut [Outline], key: &K, case: CaseMode)
where
    K: Fn(&Outline) -> &str,
{
    for outline in outlines.iter_mut() {
        sort_outlines(&mut outline.children, key, case);
    }

    match case {
        CaseMode::Sensitive => outlines.sort_by(|a, b| key(a).cmp(key(b))),
        CaseMode::Insensitive => outlines.sort_by_cached_key(|o| key(o).to_lowercase()),
    }
}

/// Visits `outlines` depth first, each node before its children.
///
/// Stops as soon as `visit` returns `Ok(false)` or an error, and reports
/// whether every node was visited.
///
/// # Errors
///
/// Returns the first error produced by `visit`.
pub fn try_walk_outlines<F, E>(outlines: &[Outline], visit: &mut F) -> Result<bool, E>
where
    F: FnMut(&Outline) -> Result<bool, E>,
{
    for outline in outlines {
        if !visit(outline)? || !try_walk_outlines(&outline.children, visit)? {
            return Ok(false);
        }
    }
    Ok(true)
}

impl Document {
    /// Sorts every level of the outline tree in place.
    pub fn sort(&mut self, key: SortKey, case: CaseMode) {
        tracing::debug!(?key, ?case, "sorting outlines");
        sort_outlines(&mut self.body.outlines, &key.extractor(), case);
    }

    /// Visits every outline in pre-order until `visit` returns `false`.
    ///
    /// Returns `true` if the walk reached the last outline, `false` if it
    /// was stopped early.
    pub fn walk<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(&Outline) -> bool,
    {
        let mut visit = |outline: &Outline| Ok::<_, Infallible>(visit(outline));
        match try_walk_outlines(&self.body.outlines, &mut visit) {
            Ok(done) => done,
            Err(never) => match never {},
        }
    }

    /// Like [`walk`](Self::walk), but `visit` may fail.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `visit`; no further outlines are
    /// visited after it.
    pub fn try_walk<F, E>(&self, mut visit: F) -> Result<bool, E>
    where
        F: FnMut(&Outline) -> Result<bool, E>,
    {
        try_walk_outlines(&self.body.outlines, &mut visit)
    }

    /// Appends the top-level outlines of each source, in order.
    ///
    /// The sources are consumed, so their outlines move without copying.
    /// Only bodies are combined; this document's head is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged body does not end up holding exactly
    /// the previous outlines plus every source outline.
    pub fn merge<I>(&mut self, sources: I) -> Result<(), MergeError>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut expected = self.len();
        for source in sources {
            expected += source.len();
            self.body.outlines.extend(source.body.outlines);
        }
        self.check_merged(expected)
    }

    /// Appends deep copies of the top-level outlines of each source.
    ///
    /// # Errors
    ///
    /// See [`merge`](Self::merge).
    pub fn merge_from<'a, I>(&mut self, sources: I) -> Result<(), MergeError>
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let mut expected = self.len();
        for source in sources {
            expected += source.len();
            self.body.outlines.extend_from_slice(&source.body.outlines);
        }
        self.check_merged(expected)
    }

    fn check_merged(&self, expected: usize) -> Result<(), MergeError> {
        let found = self.len();
        ensure!(found == expected, CountMismatchSnafu { expected, found });
        tracing::debug!(outlines = found, "merged documents");
        Ok(())
    }
}

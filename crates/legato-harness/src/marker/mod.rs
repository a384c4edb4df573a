// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Log markers and ordered marker lists.
//!
//! A marker is the text (or regex) a test expects to see in the device log.
//! Markers have no identity beyond their text, and matching is case-sensitive.

use core::fmt;

use regex::Regex;

/// Something to look for in a log line.
#[derive(Clone)]
pub enum LogMarker {
    /// Plain substring match.
    Literal(String),
    /// Regular expression match.
    Pattern(Regex),
}

impl LogMarker {
    /// Creates a literal marker.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Creates a regex marker.
    ///
    /// # Errors
    ///
    /// Returns the regex compile error if `pattern` is not a valid expression.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// The marker's source text (the literal or the regex source).
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Pattern(re) => re.as_str(),
        }
    }

    /// Byte offset where this marker first matches in `line`.
    #[must_use]
    pub fn find(&self, line: &str) -> Option<usize> {
        match self {
            Self::Literal(text) => line.find(text.as_str()),
            Self::Pattern(re) => re.find(line).map(|m| m.start()),
        }
    }

    /// Returns true if this marker matches anywhere in `line`.
    #[must_use]
    pub fn is_match(&self, line: &str) -> bool {
        match self {
            Self::Literal(text) => line.contains(text.as_str()),
            Self::Pattern(re) => re.is_match(line),
        }
    }
}

impl PartialEq for LogMarker {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for LogMarker {}

impl fmt::Debug for LogMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "Literal({text:?})"),
            Self::Pattern(re) => write!(f, "Pattern({:?})", re.as_str()),
        }
    }
}

impl fmt::Display for LogMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "{text:?}"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for LogMarker {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for LogMarker {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

/// Log line the framework emits when a kernel module is inserted.
#[must_use]
pub fn kernel_module_loaded(module: &str) -> LogMarker {
    LogMarker::Literal(format!("New kernel module '{module}.ko'"))
}

/// Log line the framework emits when a kernel module is removed.
#[must_use]
pub fn kernel_module_removed(module: &str) -> LogMarker {
    LogMarker::Literal(format!("Removed kernel module '{module}.ko'"))
}

/// Expected temporal order of an [`OrderedMarkerList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Markers appear in list order.
    Ascending,
    /// Markers appear in reverse list order (unload mirrors load).
    Descending,
}

/// Markers in the order they are expected to appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedMarkerList {
    markers: Vec<LogMarker>,
}

impl OrderedMarkerList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            markers: Vec::new(),
        }
    }

    /// Builds a list of literal markers.
    #[must_use]
    pub fn from_literals<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts.into_iter().map(LogMarker::literal).collect()
    }

    /// Appends a marker.
    pub fn push(&mut self, marker: impl Into<LogMarker>) {
        self.markers.push(marker.into());
    }

    /// Number of markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns true if the list holds no markers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// The markers in list order.
    #[must_use]
    pub fn as_slice(&self) -> &[LogMarker] {
        &self.markers
    }

    /// The markers in the order they should show up for `direction`.
    #[must_use]
    pub fn in_direction(&self, direction: Direction) -> Vec<LogMarker> {
        match direction {
            Direction::Ascending => self.markers.clone(),
            Direction::Descending => self.markers.iter().rev().cloned().collect(),
        }
    }
}

impl FromIterator<LogMarker> for OrderedMarkerList {
    fn from_iter<I: IntoIterator<Item = LogMarker>>(iter: I) -> Self {
        Self {
            markers: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a OrderedMarkerList {
    type Item = &'a LogMarker;
    type IntoIter = core::slice::Iter<'a, LogMarker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

/// Comma-separated rendering of a marker slice, for diagnostics.
#[must_use]
pub fn describe(markers: &[LogMarker]) -> String {
    let mut out = String::from("[");
    for (i, marker) in markers.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&marker.to_string());
    }
    out.push(']');
    out
}

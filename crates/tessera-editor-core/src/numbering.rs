//! Outline numbering for numbered headings.
//!
//! Numerals are derived from the document on demand and never stored. The
//! calculation walks the tree depth-first with one counter per indent depth:
//!
//! - deeper than the current depth: push counters (missing intermediate
//!   depths start at 0, the new depth at 1)
//! - same depth: increment
//! - shallower: drop deeper counters, then increment
//!
//! Headings with `numbered = false` and all other nodes leave the counters
//! alone.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::document::Document;
use crate::node::NodeType;

/// How numerals are rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberingStyle {
    pub separator: SmolStr,
}

impl Default for NumberingStyle {
    fn default() -> Self {
        Self {
            separator: SmolStr::new_static("."),
        }
    }
}

/// Heading position to printable numeral.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NumberingMap {
    entries: BTreeMap<usize, SmolStr>,
}

impl NumberingMap {
    /// Numeral of the heading starting at `pos`.
    pub fn get(&self, pos: usize) -> Option<&str> {
        self.entries.get(&pos).map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries.iter().map(|(pos, n)| (*pos, n.as_str()))
    }

    /// Numerals in document order.
    pub fn numerals(&self) -> Vec<&str> {
        self.entries.values().map(SmolStr::as_str).collect()
    }
}

/// Numbering with the default `.` separator.
pub fn calculate(doc: &Document) -> NumberingMap {
    calculate_with(doc, &NumberingStyle::default())
}

pub fn calculate_with(doc: &Document, style: &NumberingStyle) -> NumberingMap {
    let mut counters = Counters::default();
    let mut entries = BTreeMap::new();

    doc.descendants(|node, pos, _, _| {
        if node.is(NodeType::Heading) {
            if let Some(attrs) = node.heading_attrs().filter(|a| a.numbered) {
                counters.visit(usize::from(attrs.indent));
                entries.insert(pos, counters.render(&style.separator));
            }
            // Headings hold only text.
            return false;
        }
        !node.is_textblock()
    });

    tracing::trace!(target: "tessera::numbering", entries = entries.len(), "numbering calculated");
    NumberingMap { entries }
}

#[derive(Debug, Default)]
struct Counters {
    stack: Vec<u32>,
}

impl Counters {
    fn visit(&mut self, depth: usize) {
        if depth >= self.stack.len() {
            // Entering a deeper branch: implicit zero counters for skipped depths.
            self.stack.resize(depth, 0);
            self.stack.push(1);
        } else {
            self.stack.truncate(depth + 1);
            self.stack[depth] += 1;
        }
    }

    fn render(&self, separator: &str) -> SmolStr {
        let mut out = String::new();
        for (i, n) in self.stack.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            out.push_str(&n.to_string());
        }
        out.into()
    }
}

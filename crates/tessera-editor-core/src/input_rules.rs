//! Markdown-style shortcuts applied while typing.
//!
//! `## ` at the start of a paragraph turns it into a level-2 heading and
//! `##. ` into a numbered one. The marker text is removed.

use crate::config::HeadingConfig;
use crate::node::{HeadingAttrs, NodeKind, NodeType};
use crate::pipeline::EditorState;
use crate::transform::Transaction;
use crate::types::Selection;

#[derive(Clone, Debug, PartialEq, Eq)]
struct HeadingMarker {
    level: u8,
    numbered: bool,
}

/// Parse a heading marker: one or more `#`, optionally followed by `.`.
fn parse_marker(prefix: &str) -> Option<HeadingMarker> {
    let (hashes, numbered) = match prefix.strip_suffix('.') {
        Some(rest) => (rest, true),
        None => (prefix, false),
    };
    if hashes.is_empty() || !hashes.chars().all(|c| c == '#') {
        return None;
    }
    let level = u8::try_from(hashes.len()).ok()?;
    Some(HeadingMarker { level, numbered })
}

pub struct InputRules {
    config: HeadingConfig,
}

impl InputRules {
    pub fn new(config: HeadingConfig) -> Self {
        Self { config }
    }

    /// Offer typed `text` replacing `from..to`. Returns the patch when a rule
    /// fires; `None` lets the text be inserted normally.
    pub fn handle_text_input(
        &self,
        state: &EditorState,
        from: usize,
        to: usize,
        text: &str,
    ) -> Option<Transaction> {
        if text != " " || from != to {
            return None;
        }
        let rp = state.doc.resolve(from).ok()?;
        let depth = rp.depth();
        let block = rp.parent();
        if depth == 0 || !block.is(NodeType::Paragraph) {
            return None;
        }

        let prefix = block.text_between(0, rp.parent_offset());
        let marker = parse_marker(&prefix)?;
        if marker.level < self.config.min_level || marker.level > self.config.max_level {
            return None;
        }

        let pos = rp.before(depth);
        let content_start = rp.start(depth);
        let attrs = if marker.numbered {
            HeadingAttrs::numbered(marker.level, 0)
        } else {
            HeadingAttrs::new(marker.level)
        };
        tracing::debug!(
            target: "tessera::heading",
            pos,
            level = marker.level,
            numbered = marker.numbered,
            "heading input rule"
        );
        Some(
            Transaction::new()
                .delete(content_start, from)
                .set_node_markup(pos, NodeKind::Heading(attrs))
                .set_selection(Selection::collapsed(content_start)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::node::Node;

    fn state(text: &str, caret: usize) -> EditorState {
        EditorState::new(Document::new(Node::doc(vec![Node::paragraph(text)])).unwrap())
            .with_selection(Selection::collapsed(caret))
    }

    #[test]
    fn test_parse_marker() {
        assert_eq!(
            parse_marker("###"),
            Some(HeadingMarker {
                level: 3,
                numbered: false
            })
        );
        assert_eq!(
            parse_marker("#."),
            Some(HeadingMarker {
                level: 1,
                numbered: true
            })
        );
        assert_eq!(parse_marker("."), None);
        assert_eq!(parse_marker("#a"), None);
        assert_eq!(parse_marker(""), None);
    }

    #[test]
    fn test_hashes_make_heading() {
        let rules = InputRules::new(HeadingConfig::default());
        let s = state("##rest", 3);
        let tr = rules.handle_text_input(&s, 3, 3, " ").unwrap();
        let next = s.apply(&tr).unwrap();
        let block = next.doc.root().child(0).unwrap();
        assert_eq!(block.heading_attrs(), Some(&HeadingAttrs::new(2)));
        assert_eq!(block.text_content(), "rest");
        assert_eq!(next.selection, Selection::collapsed(1));
    }

    #[test]
    fn test_numbered_marker() {
        let rules = InputRules::new(HeadingConfig::default());
        let s = state("#.", 3);
        let tr = rules.handle_text_input(&s, 3, 3, " ").unwrap();
        let next = s.apply(&tr).unwrap();
        let block = next.doc.root().child(0).unwrap();
        assert_eq!(block.heading_attrs(), Some(&HeadingAttrs::numbered(1, 0)));
        assert_eq!(block.content_size(), 0);
    }

    #[test]
    fn test_rule_does_not_fire() {
        let rules = InputRules::new(HeadingConfig::default());
        // Seven hashes exceed the maximum level.
        let s = state("#######", 8);
        assert!(rules.handle_text_input(&s, 8, 8, " ").is_none());
        // Not at the start of the block.
        let s = state("a##", 4);
        assert!(rules.handle_text_input(&s, 4, 4, " ").is_none());
        // Other characters.
        let s = state("##", 3);
        assert!(rules.handle_text_input(&s, 3, 3, "x").is_none());
    }
}

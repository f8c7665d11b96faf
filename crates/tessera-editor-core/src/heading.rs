//! Key handling for numbered headings.
//!
//! The controller only reacts while the caret sits in a heading with
//! `numbered = true`; everywhere else every action falls through.

use crate::actions::{KeyAction, KeyOutcome};
use crate::commands::{self, current_heading};
use crate::config::HeadingConfig;
use crate::node::{HeadingAttrs, Node, NodeKind};
use crate::pipeline::{EditorState, KeyHandler};
use crate::transform::Transaction;
use crate::types::Selection;

pub struct HeadingController {
    config: HeadingConfig,
}

impl HeadingController {
    pub fn new(config: HeadingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeadingConfig {
        &self.config
    }

    fn increase(&self, state: &EditorState) -> KeyOutcome {
        match commands::increase_heading_indent(state, &self.config) {
            Some(tr) => KeyOutcome::Apply(tr),
            // At the limit: swallow Tab so focus does not leave the editor.
            None => KeyOutcome::Handled,
        }
    }

    fn decrease(&self, state: &EditorState) -> KeyOutcome {
        match commands::decrease_heading_indent(state, &self.config) {
            Some(tr) => KeyOutcome::Apply(tr),
            None => KeyOutcome::Handled,
        }
    }

    fn split(&self, state: &EditorState, pos: usize, heading: &Node, attrs: &HeadingAttrs) -> KeyOutcome {
        let content_start = pos + 1;
        let content_end = content_start + heading.content_size();
        let from = state.selection.start();
        let to = state.selection.end();
        if to > content_end {
            return KeyOutcome::Ignored;
        }

        if heading.content_size() == 0 {
            tracing::debug!(target: "tessera::heading", pos, "empty heading: leaving numbering");
            let tr = Transaction::new()
                .set_node_markup(pos, NodeKind::Paragraph)
                .set_selection(Selection::collapsed(content_start));
            return KeyOutcome::Apply(tr);
        }

        let tail = heading.text_between(to - content_start, heading.content_size());
        let next = Node::heading(
            HeadingAttrs {
                numbered: true,
                collapsed: false,
                ..attrs.clone()
            },
            &tail,
        );

        // After the delete the current heading closes at `from`.
        let tr = Transaction::new()
            .delete(from, content_end)
            .insert(from + 1, vec![next])
            .set_selection(Selection::collapsed(from + 2));
        tracing::debug!(target: "tessera::heading", pos, level = attrs.level, indent = attrs.indent, "split numbered heading");
        KeyOutcome::Apply(tr)
    }

    fn merge_back(&self, state: &EditorState, pos: usize, attrs: &HeadingAttrs) -> KeyOutcome {
        if !state.selection.is_collapsed() || state.selection.head != pos + 1 {
            return KeyOutcome::Ignored;
        }
        let attrs = HeadingAttrs {
            numbered: false,
            indent: 0,
            level: attrs.level.max(self.config.min_level),
            ..attrs.clone()
        };
        tracing::debug!(target: "tessera::heading", pos, "merge-back: numbering removed");
        KeyOutcome::Apply(Transaction::new().set_node_markup(pos, NodeKind::Heading(attrs)))
    }
}

impl KeyHandler for HeadingController {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn handle_key(&self, state: &EditorState, action: KeyAction) -> KeyOutcome {
        let Some((pos, heading, attrs)) = current_heading(state) else {
            return KeyOutcome::Ignored;
        };
        if !attrs.numbered {
            return KeyOutcome::Ignored;
        }

        match action {
            KeyAction::IncreaseIndent => self.increase(state),
            KeyAction::DecreaseIndent => self.decrease(state),
            KeyAction::Split => self.split(state, pos, heading, attrs),
            KeyAction::DeleteBackward => self.merge_back(state, pos, attrs),
        }
    }
}

//! Editing commands.
//!
//! Each command inspects the state and returns the patch that performs it,
//! or `None` when it does not apply at the current selection.

use crate::config::HeadingConfig;
use crate::document::Document;
use crate::error::PatchError;
use crate::node::{HeadingAttrs, Node, NodeKind, NodeType};
use crate::pipeline::EditorState;
use crate::transform::Transaction;

/// The textblock containing the selection start, with its position.
pub fn current_textblock(state: &EditorState) -> Option<(usize, &Node)> {
    let rp = state.doc.resolve(state.selection.start()).ok()?;
    let depth = rp.depth();
    if depth == 0 || !rp.parent().is_textblock() {
        return None;
    }
    Some((rp.before(depth), rp.parent()))
}

/// The heading containing the selection start, with its position.
pub fn current_heading(state: &EditorState) -> Option<(usize, &Node, &HeadingAttrs)> {
    let (pos, node) = current_textblock(state)?;
    let attrs = node.heading_attrs()?;
    Some((pos, node, attrs))
}

fn set_heading_attrs(pos: usize, attrs: HeadingAttrs) -> Transaction {
    Transaction::new().set_node_markup(pos, NodeKind::Heading(attrs))
}

/// Set the indent of the current heading, clamped to the configured maximum.
pub fn set_heading_indent(
    state: &EditorState,
    indent: u8,
    config: &HeadingConfig,
) -> Option<Transaction> {
    let (pos, _, attrs) = current_heading(state)?;
    let indent = indent.min(config.max_indent);
    if indent == attrs.indent {
        return None;
    }
    Some(set_heading_attrs(
        pos,
        HeadingAttrs {
            indent,
            ..attrs.clone()
        },
    ))
}

/// Indent the current heading one level deeper; level follows indent.
pub fn increase_heading_indent(state: &EditorState, config: &HeadingConfig) -> Option<Transaction> {
    let (pos, _, attrs) = current_heading(state)?;
    if attrs.indent >= config.max_indent || attrs.level >= config.max_level {
        return None;
    }
    Some(set_heading_attrs(
        pos,
        HeadingAttrs {
            indent: attrs.indent + 1,
            level: attrs.level + 1,
            ..attrs.clone()
        },
    ))
}

/// Outdent the current heading; level follows, clamped to the minimum.
pub fn decrease_heading_indent(state: &EditorState, config: &HeadingConfig) -> Option<Transaction> {
    let (pos, _, attrs) = current_heading(state)?;
    if attrs.indent == 0 {
        return None;
    }
    Some(set_heading_attrs(
        pos,
        HeadingAttrs {
            indent: attrs.indent - 1,
            level: attrs.level.saturating_sub(1).max(config.min_level),
            ..attrs.clone()
        },
    ))
}

/// Turn the current textblock into a heading of `level`.
///
/// Existing heading attributes other than the level are kept.
pub fn set_heading(state: &EditorState, level: u8, config: &HeadingConfig) -> Option<Transaction> {
    let (pos, node) = current_textblock(state)?;
    let level = level.clamp(config.min_level, config.max_level);
    let attrs = match node.heading_attrs() {
        Some(attrs) if attrs.level == level => return None,
        Some(attrs) => HeadingAttrs {
            level,
            ..attrs.clone()
        },
        None if node.is(NodeType::Paragraph) => HeadingAttrs::new(level),
        None => return None,
    };
    Some(set_heading_attrs(pos, attrs))
}

/// Switch outline numbering on or off for the current block.
///
/// A paragraph becomes a numbered top-level heading. Turning numbering off
/// resets the indent.
pub fn toggle_numbered_heading(state: &EditorState, config: &HeadingConfig) -> Option<Transaction> {
    let (pos, node) = current_textblock(state)?;
    let attrs = match node.heading_attrs() {
        Some(attrs) if attrs.numbered => HeadingAttrs {
            numbered: false,
            indent: 0,
            ..attrs.clone()
        },
        Some(attrs) => HeadingAttrs {
            numbered: true,
            ..attrs.clone()
        },
        None if node.is(NodeType::Paragraph) => HeadingAttrs::numbered(config.min_level, 0),
        None => return None,
    };
    Some(set_heading_attrs(pos, attrs))
}

/// Turn the current heading back into a paragraph.
pub fn clear_heading(state: &EditorState) -> Option<Transaction> {
    let (pos, _, _) = current_heading(state)?;
    Some(Transaction::new().set_node_markup(pos, NodeKind::Paragraph))
}

/// Move the block starting at `source` to the block boundary `target`.
///
/// `Ok(None)` when the block would land where it already is.
pub fn move_block(doc: &Document, source: usize, target: usize) -> Result<Option<Transaction>, PatchError> {
    let node = doc.node_at(source).ok_or(PatchError::NoNodeAt(source))?;
    if !node.node_type().is_block() {
        return Err(PatchError::NoNodeAt(source));
    }
    let end = source + node.node_size();
    if (source..=end).contains(&target) {
        return Ok(None);
    }
    let rp = doc.resolve(target)?;
    if !rp.is_block_boundary() {
        return Err(PatchError::UnevenRange { from: source, to: target });
    }

    tracing::debug!(target: "tessera::guideline", source, target, node = %node.node_type(), "moving block");
    let moved = vec![node.clone()];
    let tr = if target > end {
        Transaction::new().insert(target, moved).delete(source, end)
    } else {
        Transaction::new().delete(source, end).insert(target, moved)
    };
    Ok(Some(tr))
}

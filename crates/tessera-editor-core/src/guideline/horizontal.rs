//! Drop line between two sibling blocks.

use crate::columns::is_inside_column;
use crate::config::GuidelineConfig;
use crate::document::Document;
use crate::node::NodeType;
use crate::platform::LayoutQuery;
use crate::types::{Point, Rect};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HorizontalGuide {
    /// Block boundary the drop inserts at.
    pub pos: usize,
    pub rect: Rect,
}

/// Guide for a drop at `pos`, which must sit between sibling blocks.
///
/// With rectangles on both sides the line runs through the middle of the
/// gap; with one side it hugs that block's edge. Without any block rect the
/// caret box at `pos` is used.
pub fn horizontal_guide(
    doc: &Document,
    layout: &impl LayoutQuery,
    pos: usize,
    dragging: Option<NodeType>,
    config: &GuidelineConfig,
) -> Option<HorizontalGuide> {
    let rp = doc.resolve(pos).ok()?;
    if !rp.is_block_boundary() {
        return None;
    }
    if config.suppress_inside_columns
        && dragging == Some(NodeType::Columns)
        && is_inside_column(doc, pos)
    {
        return None;
    }

    let before = rp
        .node_before()
        .and_then(|n| layout.node_rect(pos - n.node_size()));
    let after = rp.node_after().and_then(|_| layout.node_rect(pos));

    let (left, right, y) = match (before, after) {
        (Some(b), Some(a)) => (b.left.min(a.left), b.right.max(a.right), (b.bottom + a.top) / 2.0),
        (Some(b), None) => (b.left, b.right, b.bottom),
        (None, Some(a)) => (a.left, a.right, a.top),
        (None, None) => {
            let caret = layout.coords_at_pos(pos)?;
            let (left, right) = layout
                .editor_rect()
                .map_or((caret.left, caret.right), |e| (e.left, e.right));
            tracing::trace!(target: "tessera::guideline", pos, "no block rects, using caret box");
            (left, right, caret.top)
        }
    };

    Some(HorizontalGuide {
        pos,
        rect: Rect::horizontal_line(left, right, y, config.thickness),
    })
}

/// Snap a pointer to the nearest block boundary.
///
/// Inside a textblock or leaf, picks the boundary before or after it by
/// comparing the pointer with the block's vertical midpoint.
pub fn drop_pos_at(doc: &Document, layout: &impl LayoutQuery, point: Point) -> Option<usize> {
    let pos = layout.pos_at_coords(point)?;
    let rp = doc.resolve(pos).ok()?;
    if rp.is_block_boundary() {
        return Some(pos);
    }
    let depth = rp.depth();
    let before = rp.before(depth);
    let after = rp.after(depth);
    let Some(rect) = layout.node_rect(before) else {
        return Some(after);
    };
    if point.y < (rect.top + rect.bottom) / 2.0 {
        Some(before)
    } else {
        Some(after)
    }
}

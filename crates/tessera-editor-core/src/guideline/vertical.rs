//! Vertical drop line at column gaps and at the editor's side borders.

use serde::{Deserialize, Serialize};

use crate::columns::find_containers;
use crate::config::GuidelineConfig;
use crate::document::Document;
use crate::node::NodeType;
use crate::platform::LayoutQuery;
use crate::types::{Point, Rect};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalMode {
    #[default]
    None,
    /// Pointer at a gap or outer edge of a columns container.
    ColumnsEdge,
    /// Pointer at the left or right border of the editing surface.
    EditorBorder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VerticalGuide {
    pub mode: VerticalMode,
    pub rect: Option<Rect>,
    pub side: Option<Side>,
    /// Column index a new column would take (`columns-edge`).
    pub target_column_index: Option<usize>,
    /// `columns-edge`: where the new column goes. `editor-border`: the
    /// top-level block that gets wrapped.
    pub target_pos: Option<usize>,
    /// Position of the container (`columns-edge`).
    pub container_pos: Option<usize>,
}

impl VerticalGuide {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.mode != VerticalMode::None
    }
}

/// Vertical guide for the pointer at `point`, computed from scratch.
pub fn vertical_guide(
    doc: &Document,
    layout: &impl LayoutQuery,
    point: Point,
    dragging: Option<NodeType>,
    config: &GuidelineConfig,
) -> VerticalGuide {
    // A columns container can never be dropped into or next to a column.
    if dragging == Some(NodeType::Columns) {
        return VerticalGuide::hidden();
    }
    if let Some(guide) = columns_edge(doc, layout, point, config) {
        return guide;
    }
    if let Some(guide) = editor_border(doc, layout, point, config) {
        return guide;
    }
    VerticalGuide::hidden()
}

fn columns_edge(
    doc: &Document,
    layout: &impl LayoutQuery,
    point: Point,
    config: &GuidelineConfig,
) -> Option<VerticalGuide> {
    let threshold = config.columns_edge_threshold;
    for (pos, container) in find_containers(doc) {
        let Some(outer) = layout.node_rect(pos) else {
            continue;
        };
        if point.y < outer.top
            || point.y > outer.bottom
            || point.x < outer.left - threshold
            || point.x > outer.right + threshold
        {
            continue;
        }

        let mut column_pos = pos + 1;
        let mut rects = Vec::with_capacity(container.child_count());
        for column in container.children() {
            rects.push((column_pos, layout.node_rect(column_pos)));
            column_pos += column.node_size();
        }
        let end_pos = column_pos;

        // (edge x, index of the column the new one would displace, its position)
        let mut edges = Vec::with_capacity(rects.len() + 1);
        if let Some((p, Some(first))) = rects.first() {
            edges.push((first.left, 0, *p, Side::Left));
        }
        for (i, pair) in rects.windows(2).enumerate() {
            if let [(_, Some(l)), (p, Some(r))] = pair {
                edges.push(((l.right + r.left) / 2.0, i + 1, *p, Side::Left));
            }
        }
        if let Some((_, Some(last))) = rects.last() {
            edges.push((last.right, rects.len(), end_pos, Side::Right));
        }

        let nearest = edges
            .into_iter()
            .map(|edge| ((point.x - edge.0).abs(), edge))
            .filter(|(distance, _)| *distance <= threshold)
            .min_by(|(a, _), (b, _)| a.total_cmp(b));
        if let Some((_, (x, index, target_pos, side))) = nearest {
            tracing::trace!(target: "tessera::guideline", container = pos, index, "columns-edge");
            return Some(VerticalGuide {
                mode: VerticalMode::ColumnsEdge,
                rect: Some(Rect::vertical_line(x, outer.top, outer.bottom, config.thickness)),
                side: Some(side),
                target_column_index: Some(index),
                target_pos: Some(target_pos),
                container_pos: Some(pos),
            });
        }
    }
    None
}

fn editor_border(
    doc: &Document,
    layout: &impl LayoutQuery,
    point: Point,
    config: &GuidelineConfig,
) -> Option<VerticalGuide> {
    let editor = layout.editor_rect()?;
    let tolerance = config.vertical_tolerance;
    if point.y < editor.top - tolerance || point.y > editor.bottom + tolerance {
        return None;
    }

    let threshold = config.editor_border_threshold;
    let (side, x) = if (point.x - editor.left).abs() <= threshold {
        (Side::Left, editor.left)
    } else if (point.x - editor.right).abs() <= threshold {
        (Side::Right, editor.right)
    } else {
        return None;
    };

    // Sample just inside the editor at the pointer's height.
    let inside = Point::new(
        (editor.left + editor.right) / 2.0,
        point.y.clamp(editor.top, editor.bottom),
    );
    // Beyond the content's top or bottom: first or last block.
    let pos = layout.pos_at_coords(inside).unwrap_or_else(|| {
        if point.y <= (editor.top + editor.bottom) / 2.0 {
            0
        } else {
            doc.content_size()
        }
    });
    let target_pos = top_level_block_at(doc, pos)?;
    let target = doc.node_at(target_pos)?;
    if target.is(NodeType::Columns) {
        return None;
    }
    let block = layout.node_rect(target_pos).unwrap_or(editor);

    tracing::trace!(target: "tessera::guideline", target_pos, ?side, "editor-border");
    Some(VerticalGuide {
        mode: VerticalMode::EditorBorder,
        rect: Some(Rect::vertical_line(x, block.top, block.bottom, config.thickness)),
        side: Some(side),
        target_column_index: None,
        target_pos: Some(target_pos),
        container_pos: None,
    })
}

/// Position of the top-level block containing or adjacent to `pos`.
fn top_level_block_at(doc: &Document, pos: usize) -> Option<usize> {
    let rp = doc.resolve(pos).ok()?;
    if rp.depth() >= 1 {
        return Some(rp.before(1));
    }
    let root = doc.root();
    let index = rp.index(0).min(root.child_count().checked_sub(1)?);
    Some(root.child_offset(index))
}

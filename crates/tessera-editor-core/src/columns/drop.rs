//! Turning a vertical drop target into a document patch.

use crate::config::ColumnsConfig;
use crate::document::Document;
use crate::guideline::{Side, VerticalGuide, VerticalMode};
use crate::node::{ColumnAttrs, ColumnsAttrs, Node, NodeKind, NodeType};
use crate::transform::Transaction;

use super::{ColumnsError, can_create_columns};

/// Move the block at `source` to the vertical target `guide`.
///
/// `columns-edge` adds the block as a new column; `editor-border` pairs it
/// with the top-level block under the pointer in a new two-column
/// container. The source is removed in the same transaction; a column it
/// leaves empty is repaired by cleanup.
pub fn drop_at_vertical_target(
    doc: &Document,
    guide: &VerticalGuide,
    source: usize,
    config: &ColumnsConfig,
) -> Result<Transaction, ColumnsError> {
    let dragged = doc.node_at(source).ok_or(ColumnsError::NoTarget)?;
    if dragged.is(NodeType::Columns) {
        return Err(ColumnsError::Nested);
    }
    match guide.mode {
        VerticalMode::None => Err(ColumnsError::NoTarget),
        VerticalMode::ColumnsEdge => {
            let container_pos = guide.container_pos.ok_or(ColumnsError::NoTarget)?;
            let index = guide.target_column_index.ok_or(ColumnsError::NoTarget)?;
            drop_into_container(doc, container_pos, index, source, dragged, config)
        }
        VerticalMode::EditorBorder => {
            let target = guide.target_pos.ok_or(ColumnsError::NoTarget)?;
            let side = guide.side.unwrap_or(Side::Left);
            wrap_with_target(doc, target, side, source, dragged)
        }
    }
}

fn drop_into_container(
    doc: &Document,
    container_pos: usize,
    index: usize,
    source: usize,
    dragged: &Node,
    config: &ColumnsConfig,
) -> Result<Transaction, ColumnsError> {
    let container = doc
        .node_at(container_pos)
        .filter(|n| n.is(NodeType::Columns))
        .ok_or(ColumnsError::NotAContainer(container_pos))?;
    let count = container.child_count();
    if count >= config.max_columns {
        return Err(ColumnsError::MaxColumns {
            max: config.max_columns,
        });
    }
    if index > count {
        return Err(ColumnsError::NoTarget);
    }
    can_create_columns(doc, container_pos).into_result()?;

    let container_end = container_pos + container.node_size();
    let inside = (container_pos..container_end).contains(&source);

    let mut columns: Vec<Node> = container.children().to_vec();
    if inside {
        // Only blocks sitting directly in a column can leave it.
        let rp = doc.resolve(source)?;
        let depth = rp.depth();
        if depth < 2 || rp.before(depth - 1) != container_pos || !rp.parent().is(NodeType::Column) {
            return Err(ColumnsError::NoTarget);
        }
        let column = rp.index(depth - 1);
        let child = rp.index(depth);
        let mut content = columns[column].children().to_vec();
        content.remove(child);
        columns[column] = columns[column].with_content(content);
    }

    let widths = widths_with_new_column(container, index);
    columns.insert(index, Node::column(widths[index], vec![dragged.clone()]));
    for (column, width) in columns.iter_mut().zip(&widths) {
        *column = column.with_kind(NodeKind::Column(ColumnAttrs { width: *width }));
    }
    let layout = container.columns_attrs().map(|a| a.layout).unwrap_or_default();
    let rebuilt = container
        .with_kind(NodeKind::Columns(ColumnsAttrs {
            count: columns.len(),
            column_widths: widths,
            layout,
        }))
        .with_content(columns);

    tracing::debug!(target: "tessera::columns", container_pos, index, source, "drop into column gap");
    let replace = (container_pos, container_end, vec![rebuilt]);
    if inside {
        return Ok(Transaction::new().replace(replace.0, replace.1, replace.2));
    }
    Ok(ordered(replace, (source, source + dragged.node_size())))
}

/// Existing widths scaled down to make room for an equal share at `index`.
fn widths_with_new_column(container: &Node, index: usize) -> Vec<f64> {
    let current: Vec<f64> = container
        .children()
        .iter()
        .map(|c| c.column_attrs().map_or(0.0, |a| a.width))
        .collect();
    let n = current.len() + 1;
    let share = 100.0 / n as f64;
    let total: f64 = current.iter().sum();
    let mut widths: Vec<f64> = if total > f64::EPSILON {
        current.iter().map(|w| w / total * (100.0 - share)).collect()
    } else {
        vec![(100.0 - share) / current.len().max(1) as f64; current.len()]
    };
    widths.insert(index, share);
    widths
}

fn wrap_with_target(
    doc: &Document,
    target: usize,
    side: Side,
    source: usize,
    dragged: &Node,
) -> Result<Transaction, ColumnsError> {
    let block = doc.node_at(target).ok_or(ColumnsError::NoTarget)?;
    if block.is(NodeType::Columns) {
        return Err(ColumnsError::Nested);
    }
    can_create_columns(doc, target).into_result()?;

    let target_end = target + block.node_size();
    let source_end = source + dragged.node_size();
    if source < target_end && target < source_end {
        // Dropping a block beside itself or its own ancestor.
        return Err(ColumnsError::NoTarget);
    }

    let pair = match side {
        Side::Left => vec![vec![dragged.clone()], vec![block.clone()]],
        Side::Right => vec![vec![block.clone()], vec![dragged.clone()]],
    };
    tracing::debug!(target: "tessera::columns", target, source, ?side, "wrap at editor border");
    Ok(ordered(
        (target, target_end, vec![Node::columns(pair)]),
        (source, source_end),
    ))
}

/// Replace and delete two disjoint ranges, later range first so the earlier
/// one keeps its positions.
fn ordered(replace: (usize, usize, Vec<Node>), delete: (usize, usize)) -> Transaction {
    let (from, to, nodes) = replace;
    if delete.0 >= to {
        Transaction::new()
            .delete(delete.0, delete.1)
            .replace(from, to, nodes)
    } else {
        Transaction::new()
            .replace(from, to, nodes)
            .delete(delete.0, delete.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns_guide(container_pos: usize, index: usize) -> VerticalGuide {
        VerticalGuide {
            mode: VerticalMode::ColumnsEdge,
            target_column_index: Some(index),
            container_pos: Some(container_pos),
            ..Default::default()
        }
    }

    fn border_guide(target: usize, side: Side) -> VerticalGuide {
        VerticalGuide {
            mode: VerticalMode::EditorBorder,
            side: Some(side),
            target_pos: Some(target),
            ..Default::default()
        }
    }

    fn texts(node: &Node) -> Vec<String> {
        node.children().iter().map(Node::text_content).collect()
    }

    #[test]
    fn test_columns_edge_adds_column() {
        // 0 <p>x</p>3 <columns> ... </columns>15
        let doc = Document::new(Node::doc(vec![
            Node::paragraph("x"),
            Node::columns(vec![vec![Node::paragraph("a")], vec![Node::paragraph("b")]]),
        ]))
        .unwrap();
        let tr = drop_at_vertical_target(&doc, &columns_guide(3, 1), 0, &ColumnsConfig::default()).unwrap();
        let (next, _) = doc.apply(&tr).unwrap();
        assert_eq!(next.root().child_count(), 1);
        let container = next.root().child(0).unwrap();
        assert_eq!(texts(container), vec!["a", "x", "b"]);
        let attrs = container.columns_attrs().unwrap();
        assert_eq!(attrs.count, 3);
        let sum: f64 = attrs.column_widths.iter().sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_columns_edge_from_inside_container() {
        let doc = Document::new(Node::doc(vec![Node::columns(vec![
            vec![Node::paragraph("a"), Node::paragraph("c")],
            vec![Node::paragraph("b")],
        ])]))
        .unwrap();
        // <p>c</p> starts at 5.
        let tr = drop_at_vertical_target(&doc, &columns_guide(0, 2), 5, &ColumnsConfig::default()).unwrap();
        let (next, _) = doc.apply(&tr).unwrap();
        let container = next.root().child(0).unwrap();
        assert_eq!(texts(container), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_columns_edge_rejected_at_max() {
        let doc = Document::new(Node::doc(vec![
            Node::paragraph("x"),
            Node::columns((0..7).map(|_| vec![Node::paragraph("a")]).collect()),
        ]))
        .unwrap();
        assert_eq!(
            drop_at_vertical_target(&doc, &columns_guide(3, 0), 0, &ColumnsConfig::default()),
            Err(ColumnsError::MaxColumns { max: 7 })
        );
    }

    #[test]
    fn test_editor_border_wraps_pair() {
        // 0 <p>a</p>3 <p>b</p>6
        let doc = Document::new(Node::doc(vec![Node::paragraph("a"), Node::paragraph("b")])).unwrap();
        let config = ColumnsConfig::default();

        let left = drop_at_vertical_target(&doc, &border_guide(0, Side::Left), 3, &config).unwrap();
        let (next, _) = doc.apply(&left).unwrap();
        assert_eq!(next.root().child_count(), 1);
        assert_eq!(texts(next.root().child(0).unwrap()), vec!["b", "a"]);

        let right = drop_at_vertical_target(&doc, &border_guide(3, Side::Right), 0, &config).unwrap();
        let (next, _) = doc.apply(&right).unwrap();
        assert_eq!(texts(next.root().child(0).unwrap()), vec!["b", "a"]);
    }

    #[test]
    fn test_invalid_drops() {
        let doc = Document::new(Node::doc(vec![
            Node::paragraph("a"),
            Node::columns(vec![vec![Node::paragraph("b")], vec![Node::paragraph("c")]]),
        ]))
        .unwrap();
        let config = ColumnsConfig::default();
        assert_eq!(
            drop_at_vertical_target(&doc, &VerticalGuide::hidden(), 0, &config),
            Err(ColumnsError::NoTarget)
        );
        assert_eq!(
            drop_at_vertical_target(&doc, &border_guide(0, Side::Left), 0, &config),
            Err(ColumnsError::NoTarget)
        );
        assert_eq!(
            drop_at_vertical_target(&doc, &border_guide(0, Side::Left), 3, &config),
            Err(ColumnsError::Nested)
        );
        assert_eq!(
            drop_at_vertical_target(&doc, &border_guide(3, Side::Left), 0, &config),
            Err(ColumnsError::Nested)
        );
    }
}

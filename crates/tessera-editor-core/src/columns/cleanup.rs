//! Structural repair of column containers after a change.
//!
//! At most one repair is planned per observation. Containers are examined
//! from last to first so the planned positions stay valid against the
//! snapshot they were computed on; the repair's own commit triggers the next
//! observation, which picks up whatever is left.

use crate::config::ColumnsConfig;
use crate::document::Document;
use crate::node::{ColumnAttrs, ColumnsAttrs, Node, NodeKind, NodeType};
use crate::pipeline::{ChangeObserver, EditorState};
use crate::transform::Transaction;
use crate::types::Selection;

/// What a container needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CleanupAction {
    None,
    /// Delete the column at `index`, which has no blocks.
    RemoveEmptyColumn { index: usize },
    /// Replace the container with the content of its only column.
    UnwrapSingleColumn,
}

/// Every `columns` container with its position, in document order.
///
/// Does not descend into containers.
pub fn find_containers(doc: &Document) -> Vec<(usize, &Node)> {
    let mut found = Vec::new();
    doc.descendants(|node, pos, _, _| {
        if node.is(NodeType::Columns) {
            found.push((pos, node));
            return false;
        }
        !node.is_textblock()
    });
    found
}

/// Detect the repair a single container needs.
pub fn detect(container: &Node) -> CleanupAction {
    let empty = container
        .children()
        .iter()
        .position(|column| column.child_count() == 0);
    if let Some(index) = empty {
        return CleanupAction::RemoveEmptyColumn { index };
    }
    if container.child_count() <= 1 {
        return CleanupAction::UnwrapSingleColumn;
    }
    CleanupAction::None
}

/// Plan the next repair for `doc`, if any.
///
/// `selection` is carried across an unwrap so the caret stays with the
/// content it was in.
pub fn plan(doc: &Document, selection: Selection, config: &ColumnsConfig) -> Option<Transaction> {
    let containers = find_containers(doc);
    containers.iter().rev().find_map(|(pos, container)| {
        let action = detect(container);
        if action == CleanupAction::None {
            return None;
        }
        tracing::debug!(target: "tessera::columns", pos, ?action, "column cleanup");
        Some(execute(*pos, container, action, selection, config))
    })
}

fn execute(
    pos: usize,
    container: &Node,
    action: CleanupAction,
    selection: Selection,
    config: &ColumnsConfig,
) -> Transaction {
    match action {
        CleanupAction::None => Transaction::system(),
        CleanupAction::RemoveEmptyColumn { index } => {
            if container.child_count().saturating_sub(1) < config.min_columns {
                let keep: Vec<usize> = (0..container.child_count()).filter(|i| *i != index).collect();
                unwrap(pos, container, &keep, selection)
            } else {
                remove_column(pos, container, index)
            }
        }
        CleanupAction::UnwrapSingleColumn => {
            let keep: Vec<usize> = (0..container.child_count()).collect();
            unwrap(pos, container, &keep, selection)
        }
    }
}

fn remove_column(pos: usize, container: &Node, index: usize) -> Transaction {
    let column_pos = pos + 1 + container.child_offset(index);
    let column_size = container.child(index).map(Node::node_size).unwrap_or(0);

    let remaining: Vec<&Node> = container
        .children()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, c)| c)
        .collect();
    let widths = redistribute(
        &remaining
            .iter()
            .map(|c| c.column_attrs().map_or(0.0, |a| a.width))
            .collect::<Vec<_>>(),
    );

    let layout = container
        .columns_attrs()
        .map(|a| a.layout)
        .unwrap_or_default();
    let mut tr = Transaction::system()
        .delete(column_pos, column_pos + column_size)
        .set_node_markup(
            pos,
            NodeKind::Columns(ColumnsAttrs {
                count: remaining.len(),
                column_widths: widths.clone(),
                layout,
            }),
        );

    let mut cur = pos + 1;
    for (column, width) in remaining.iter().zip(widths) {
        tr = tr.set_node_markup(cur, NodeKind::Column(ColumnAttrs { width }));
        cur += column.node_size();
    }
    tr
}

/// Scale widths so they sum to 100 again. Zero totals fall back to equal.
fn redistribute(widths: &[f64]) -> Vec<f64> {
    let total: f64 = widths.iter().sum();
    if widths.is_empty() || total <= f64::EPSILON {
        return crate::node::equal_widths(widths.len());
    }
    widths.iter().map(|w| w * 100.0 / total).collect()
}

fn unwrap(pos: usize, container: &Node, keep: &[usize], selection: Selection) -> Transaction {
    let mut content = Vec::new();
    // Old content start of each kept column and where its content lands.
    let mut moved = Vec::new();
    let mut target = pos;
    for &index in keep {
        let Some(column) = container.child(index) else {
            continue;
        };
        let start = pos + 1 + container.child_offset(index) + 1;
        moved.push((start, start + column.content_size(), target));
        target += column.content_size();
        content.extend(column.children().iter().cloned());
    }
    if content.is_empty() {
        content.push(Node::empty_paragraph());
    }

    let end = pos + container.node_size();
    let mut tr = Transaction::system().replace(pos, end, content);

    let carry = |p: usize| {
        moved
            .iter()
            .find(|(from, to, _)| (*from..=*to).contains(&p))
            .map(|(from, _, target)| target + (p - from))
    };
    if let (Some(anchor), Some(head)) = (carry(selection.anchor), carry(selection.head)) {
        tr = tr.set_selection(Selection::new(anchor, head));
    }
    tr
}

/// Change observer that keeps column containers well formed.
pub struct ColumnCleanup {
    config: ColumnsConfig,
}

impl ColumnCleanup {
    pub fn new(config: ColumnsConfig) -> Self {
        Self { config }
    }
}

impl ChangeObserver for ColumnCleanup {
    fn name(&self) -> &'static str {
        "column-cleanup"
    }

    fn observe(
        &self,
        transactions: &[Transaction],
        _old: &EditorState,
        new: &EditorState,
    ) -> Option<Transaction> {
        if !transactions.iter().any(Transaction::doc_changed) {
            return None;
        }
        if transactions.iter().any(|tr| tr.meta().skip_column_cleanup) {
            tracing::trace!(target: "tessera::columns", "cleanup skipped by marker");
            return None;
        }
        plan(&new.doc, new.selection, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(nodes: Vec<Node>) -> Document {
        Document::new(Node::doc(nodes)).unwrap()
    }

    fn columns_with_empty(contents: Vec<Vec<Node>>) -> Node {
        Node::columns(contents)
    }

    #[test]
    fn test_clean_document_detects_none() {
        let d = doc(vec![
            Node::columns(vec![vec![Node::paragraph("a")], vec![Node::paragraph("b")]]),
            Node::columns(vec![vec![Node::paragraph("c")], vec![Node::paragraph("d")]]),
        ]);
        for (_, container) in find_containers(&d) {
            assert_eq!(detect(container), CleanupAction::None);
        }
        assert!(plan(&d, Selection::default(), &ColumnsConfig::default()).is_none());
    }

    #[test]
    fn test_detect_actions() {
        let empty = columns_with_empty(vec![vec![Node::paragraph("a")], vec![], vec![Node::paragraph("b")]]);
        assert_eq!(detect(&empty), CleanupAction::RemoveEmptyColumn { index: 1 });

        let single = Node::columns(vec![vec![Node::paragraph("a")]]);
        assert_eq!(detect(&single), CleanupAction::UnwrapSingleColumn);
    }

    #[test]
    fn test_remove_empty_column_rebalances_widths() {
        let d = doc(vec![columns_with_empty(vec![
            vec![Node::paragraph("a")],
            vec![],
            vec![Node::paragraph("b")],
        ])]);
        let tr = plan(&d, Selection::default(), &ColumnsConfig::default()).unwrap();
        let (next, _) = d.apply(&tr).unwrap();
        let container = next.root().child(0).unwrap();
        let attrs = container.columns_attrs().unwrap();
        assert_eq!(attrs.count, 2);
        assert_eq!(container.child_count(), 2);
        let sum: f64 = attrs.column_widths.iter().sum();
        assert!((sum - 100.0).abs() < 1e-9);
        for column in container.children() {
            assert!((column.column_attrs().unwrap().width - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_removal_below_minimum_unwraps() {
        // 0 <columns>1 <column>2 <p>3 a 4</p>5 </column>6 <column>7 </column>8 </columns>9
        let d = doc(vec![columns_with_empty(vec![vec![Node::paragraph("a")], vec![]])]);
        let tr = plan(&d, Selection::collapsed(4), &ColumnsConfig::default()).unwrap();
        assert_eq!(tr.meta().origin, crate::transform::Origin::System);
        let state = EditorState::new(d).with_selection(Selection::collapsed(4));
        let next = state.apply(&tr).unwrap();
        assert_eq!(next.doc.root().children(), &[Node::paragraph("a")]);
        // Caret stays after the "a".
        assert_eq!(next.selection, Selection::collapsed(2));
    }

    #[test]
    fn test_unwrap_of_all_empty_leaves_paragraph() {
        let d = doc(vec![Node::paragraph("x"), columns_with_empty(vec![vec![], vec![]])]);
        // First pass removes one empty column and cascades to unwrapping.
        let tr = plan(&d, Selection::default(), &ColumnsConfig::default()).unwrap();
        let (next, _) = d.apply(&tr).unwrap();
        assert_eq!(
            next.root().children(),
            &[Node::paragraph("x"), Node::empty_paragraph()]
        );
    }

    #[test]
    fn test_last_container_repaired_first() {
        let d = doc(vec![
            columns_with_empty(vec![vec![Node::paragraph("a")], vec![]]),
            columns_with_empty(vec![vec![Node::paragraph("b")], vec![]]),
        ]);
        let tr = plan(&d, Selection::default(), &ColumnsConfig::default()).unwrap();
        let (next, _) = d.apply(&tr).unwrap();
        let types: Vec<NodeType> = next.root().children().iter().map(Node::node_type).collect();
        assert_eq!(types, vec![NodeType::Columns, NodeType::Paragraph]);
    }

    #[test]
    fn test_observer_respects_skip_marker() {
        let d = doc(vec![columns_with_empty(vec![vec![Node::paragraph("a")], vec![]])]);
        let state = EditorState::new(d);
        let cleanup = ColumnCleanup::new(ColumnsConfig::default());

        let skipped = Transaction::new().insert_text(3, "b").skip_column_cleanup();
        assert!(cleanup.observe(&[skipped], &state, &state).is_none());

        let no_change = Transaction::new().set_selection(Selection::collapsed(3));
        assert!(cleanup.observe(&[no_change], &state, &state).is_none());

        let edit = Transaction::new().insert_text(3, "b");
        assert!(cleanup.observe(&[edit], &state, &state).is_some());
    }
}

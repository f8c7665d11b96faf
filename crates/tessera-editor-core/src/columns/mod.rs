//! Multi-column layouts: validation, commands, cleanup, resizing and drops.

mod cleanup;
mod drop;
mod validate;
mod width;

pub use cleanup::{CleanupAction, ColumnCleanup, detect, find_containers, plan};
pub use drop::drop_at_vertical_target;
pub use validate::{ColumnValidation, can_create_columns, is_inside_column, validate_count};
pub use width::{ResizeDrag, WidthChange, recompute};

use thiserror::Error;

use crate::config::{ColumnsConfig, WIDTH_TOLERANCE};
use crate::document::Document;
use crate::error::PatchError;
use crate::i18n;
use crate::node::{ColumnAttrs, ColumnsAttrs, ColumnsLayout, Node, NodeKind, NodeType};
use crate::pipeline::EditorState;
use crate::transform::Transaction;
use crate::types::Selection;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ColumnsError {
    #[error("columns cannot be nested inside a column")]
    Nested,

    #[error("column count {count} outside {min}..={max}")]
    Count { count: usize, min: usize, max: usize },

    #[error("container already holds {max} columns")]
    MaxColumns { max: usize },

    #[error("no drop target")]
    NoTarget,

    #[error("no columns container at position {0}")]
    NotAContainer(usize),

    #[error("invalid column widths {0:?}")]
    InvalidWidths(Vec<f64>),

    #[error(transparent)]
    Patch(#[from] PatchError),
}

impl ColumnsError {
    /// User-facing message in the current locale.
    pub fn message(&self) -> String {
        let key = match self {
            ColumnsError::Nested => "columns.error.nested",
            ColumnsError::Count { .. } => "columns.error.count",
            ColumnsError::MaxColumns { .. } => "columns.error.max",
            ColumnsError::NoTarget => "columns.error.target",
            ColumnsError::NotAContainer(_)
            | ColumnsError::InvalidWidths(_)
            | ColumnsError::Patch(_) => "columns.error.patch",
        };
        i18n::translate(key).to_string()
    }
}

/// Wrap the block at the selection into the first of `count` new columns.
///
/// The other columns start with an empty paragraph. Between blocks, a fresh
/// container of empty columns is inserted instead.
pub fn insert_columns(
    state: &EditorState,
    count: usize,
    config: &ColumnsConfig,
) -> Result<Transaction, ColumnsError> {
    validate_count(count, config).into_result()?;
    let from = state.selection.start();
    can_create_columns(&state.doc, from).into_result()?;

    let rp = state.doc.resolve(from)?;
    let (pos, end, first) = if rp.depth() >= 1 {
        let block = rp.node(1);
        (rp.before(1), rp.after(1), vec![block.clone()])
    } else {
        (from, from, vec![Node::empty_paragraph()])
    };

    let mut contents = vec![first];
    contents.extend((1..count).map(|_| vec![Node::empty_paragraph()]));
    let container = Node::columns(contents);

    tracing::debug!(target: "tessera::columns", pos, count, "insert columns");
    // container, column and block open tokens
    Ok(Transaction::new()
        .replace(pos, end, vec![container])
        .set_selection(Selection::collapsed(pos + 3)))
}

/// Set every column width of the container at `pos`.
///
/// Widths must match the column count, respect the minimum and sum to 100.
pub fn set_column_widths(
    doc: &Document,
    pos: usize,
    widths: &[f64],
    config: &ColumnsConfig,
) -> Result<Transaction, ColumnsError> {
    let container = container_at(doc, pos)?;
    let attrs = container
        .columns_attrs()
        .ok_or(ColumnsError::NotAContainer(pos))?;

    let total: f64 = widths.iter().sum();
    let valid = widths.len() == container.child_count()
        && widths.iter().all(|w| *w >= config.min_width - WIDTH_TOLERANCE)
        && (total - 100.0).abs() <= WIDTH_TOLERANCE;
    if !valid {
        return Err(ColumnsError::InvalidWidths(widths.to_vec()));
    }

    let mut tr = Transaction::new().set_node_markup(
        pos,
        NodeKind::Columns(ColumnsAttrs {
            count: widths.len(),
            column_widths: widths.to_vec(),
            layout: attrs.layout,
        }),
    );
    let mut cur = pos + 1;
    for (column, width) in container.children().iter().zip(widths) {
        tr = tr.set_node_markup(cur, NodeKind::Column(ColumnAttrs { width: *width }));
        cur += column.node_size();
    }
    Ok(tr)
}

/// Switch the container at `pos` between side-by-side and stacked layout.
pub fn set_columns_layout(
    doc: &Document,
    pos: usize,
    layout: ColumnsLayout,
) -> Result<Transaction, ColumnsError> {
    let container = container_at(doc, pos)?;
    let attrs = container
        .columns_attrs()
        .ok_or(ColumnsError::NotAContainer(pos))?;
    Ok(Transaction::new().set_node_markup(
        pos,
        NodeKind::Columns(ColumnsAttrs {
            layout,
            ..attrs.clone()
        }),
    ))
}

fn container_at(doc: &Document, pos: usize) -> Result<&Node, ColumnsError> {
    doc.node_at(pos)
        .filter(|n| n.is(NodeType::Columns))
        .ok_or(ColumnsError::NotAContainer(pos))
}

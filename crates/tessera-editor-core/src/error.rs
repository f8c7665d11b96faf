//! Error types for document patches and schema checks.

use thiserror::Error;

use crate::node::NodeType;

/// A tree that breaks a content constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    /// Root node is not a doc.
    #[error("root node must be doc, found {0}")]
    InvalidRoot(NodeType),

    /// A child type that the parent does not accept.
    #[error("{parent} cannot contain {child}")]
    InvalidChild { parent: NodeType, child: NodeType },

    /// A node that requires at least one child has none.
    #[error("{0} requires at least one child")]
    EmptyContent(NodeType),

    /// Empty text nodes are never stored.
    #[error("empty text node")]
    EmptyText,

    /// Heading level outside 1..=6.
    #[error("invalid heading level {0}")]
    HeadingLevel(u8),
}

/// A patch the document refused to apply.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PatchError {
    /// Position outside the document.
    #[error("position {pos} out of range (document size {size})")]
    PositionOutOfRange { pos: usize, size: usize },

    /// Replace range whose ends sit in different parents.
    #[error("range {from}..{to} does not share a parent")]
    UnevenRange { from: usize, to: usize },

    /// Replace range with `from > to`.
    #[error("inverted range {from}..{to}")]
    InvertedRange { from: usize, to: usize },

    /// No node starts at the given position.
    #[error("no node at position {0}")]
    NoNodeAt(usize),

    /// Markup change that would alter node size.
    #[error("cannot change {from} into {to}")]
    IncompatibleMarkup { from: NodeType, to: NodeType },

    /// Resulting tree violates the schema.
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaError),
}

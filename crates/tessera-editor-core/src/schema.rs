//! Content constraints for the document tree.
//!
//! The check runs after every patch; a tree that fails it is never committed.
//! Columns may transiently be empty so that cleanup can observe and repair
//! them on the next change-observation pass.

use crate::error::SchemaError;
use crate::node::{MAX_HEADING_LEVEL, MIN_HEADING_LEVEL, Node, NodeKind, NodeType};

/// Validate a whole document tree.
pub fn check(root: &Node) -> Result<(), SchemaError> {
    if !root.is(NodeType::Doc) {
        return Err(SchemaError::InvalidRoot(root.node_type()));
    }
    check_node(root)
}

fn check_node(node: &Node) -> Result<(), SchemaError> {
    let ty = node.node_type();

    match node.kind() {
        NodeKind::Text { text } if text.is_empty() => return Err(SchemaError::EmptyText),
        NodeKind::Heading(attrs)
            if !(MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL).contains(&attrs.level) =>
        {
            return Err(SchemaError::HeadingLevel(attrs.level));
        }
        _ => {}
    }

    if ty.is_leaf() {
        if node.child_count() > 0 {
            let child = node.children()[0].node_type();
            return Err(SchemaError::InvalidChild { parent: ty, child });
        }
        return Ok(());
    }

    if requires_content(ty) && node.child_count() == 0 {
        return Err(SchemaError::EmptyContent(ty));
    }

    for child in node.children() {
        if !accepts(ty, child.node_type()) {
            return Err(SchemaError::InvalidChild {
                parent: ty,
                child: child.node_type(),
            });
        }
        check_node(child)?;
    }
    Ok(())
}

fn requires_content(ty: NodeType) -> bool {
    matches!(ty, NodeType::Doc | NodeType::Columns | NodeType::Blockquote)
}

/// Whether `parent` may hold a direct child of type `child`.
pub fn accepts(parent: NodeType, child: NodeType) -> bool {
    match parent {
        NodeType::Doc | NodeType::Column | NodeType::Blockquote => child.is_block(),
        NodeType::Columns => child == NodeType::Column,
        NodeType::Paragraph | NodeType::Heading | NodeType::CodeBlock => child == NodeType::Text,
        NodeType::HorizontalRule | NodeType::Text => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::HeadingAttrs;

    #[test]
    fn test_valid_document() {
        let doc = Node::doc(vec![
            Node::heading(HeadingAttrs::numbered(1, 0), "Intro"),
            Node::columns(vec![vec![Node::paragraph("a")], vec![Node::paragraph("b")]]),
            Node::horizontal_rule(),
        ]);
        assert_eq!(check(&doc), Ok(()));
    }

    #[test]
    fn test_empty_doc_rejected() {
        assert_eq!(
            check(&Node::doc(vec![])),
            Err(SchemaError::EmptyContent(NodeType::Doc))
        );
    }

    #[test]
    fn test_empty_column_allowed() {
        let doc = Node::doc(vec![Node::columns(vec![vec![Node::paragraph("a")], vec![]])]);
        assert_eq!(check(&doc), Ok(()));
    }

    #[test]
    fn test_column_outside_columns_rejected() {
        let doc = Node::doc(vec![Node::column(50.0, vec![Node::paragraph("a")])]);
        assert_eq!(
            check(&doc),
            Err(SchemaError::InvalidChild {
                parent: NodeType::Doc,
                child: NodeType::Column
            })
        );
    }

    #[test]
    fn test_heading_level_bounds() {
        let doc = Node::doc(vec![Node::heading(HeadingAttrs::new(7), "x")]);
        assert_eq!(check(&doc), Err(SchemaError::HeadingLevel(7)));
    }
}

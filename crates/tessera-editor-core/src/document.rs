//! Immutable, versioned document and position resolution.
//!
//! Positions are integers counting tokens from the start of the doc's content:
//! one per text char, one per leaf block, and one each for entering and
//! leaving any other node.

use crate::error::{PatchError, SchemaError};
use crate::node::{Node, NodeType};
use crate::schema;

/// A validated document tree with a version counter.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    root: Node,
    version: u64,
}

impl Document {
    /// Wrap a root node after validating it.
    pub fn new(root: Node) -> Result<Self, SchemaError> {
        schema::check(&root)?;
        Ok(Self { root, version: 0 })
    }

    /// Wrap a tree that is about to be re-checked.
    pub(crate) fn new_unchecked(root: Node) -> Self {
        Self { root, version: 0 }
    }

    pub(crate) fn next(&self, root: Node) -> Self {
        Self {
            root,
            version: self.version + 1,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Size of the doc's content, i.e. the largest valid position.
    pub fn content_size(&self) -> usize {
        self.root.content_size()
    }

    /// Resolve a position into its ancestor path.
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos<'_>, PatchError> {
        ResolvedPos::resolve(&self.root, pos)
    }

    /// The node starting at `pos`, if any.
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut node = &self.root;
        let mut offset = pos;
        loop {
            let (index, start) = node.find_index(offset);
            let child = node.child(index)?;
            if start == offset {
                return Some(child);
            }
            if child.is_leaf() {
                return None;
            }
            offset -= start + 1;
            node = child;
        }
    }

    /// Visit every node depth-first with its position, parent and index.
    ///
    /// Returning `false` from the visitor skips that node's children.
    pub fn descendants<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&'a Node, usize, &'a Node, usize) -> bool,
    {
        walk(&self.root, 0, &mut f);
    }

    /// Positions and nodes of every node of type `ty`, in document order.
    pub fn find_all(&self, ty: NodeType) -> Vec<(usize, &Node)> {
        let mut found = Vec::new();
        collect(&self.root, 0, ty, &mut found);
        found
    }
}

fn walk<'a, F>(parent: &'a Node, content_start: usize, f: &mut F)
where
    F: FnMut(&'a Node, usize, &'a Node, usize) -> bool,
{
    let mut pos = content_start;
    for (index, child) in parent.children().iter().enumerate() {
        if f(child, pos, parent, index) && !child.is_leaf() {
            walk(child, pos + 1, f);
        }
        pos += child.node_size();
    }
}

fn collect<'a>(parent: &'a Node, content_start: usize, ty: NodeType, out: &mut Vec<(usize, &'a Node)>) {
    let mut pos = content_start;
    for child in parent.children() {
        if child.is(ty) {
            out.push((pos, child));
        }
        if !child.is_leaf() {
            collect(child, pos + 1, ty, out);
        }
        pos += child.node_size();
    }
}

#[derive(Clone, Copy, Debug)]
struct PathEntry<'a> {
    node: &'a Node,
    /// Index of the child the position points into or before.
    index: usize,
    /// Position where this node's content starts.
    start: usize,
    /// Content offset of child `index`.
    child_offset: usize,
}

/// A position together with the chain of nodes containing it.
#[derive(Clone, Debug)]
pub struct ResolvedPos<'a> {
    pos: usize,
    path: Vec<PathEntry<'a>>,
}

impl<'a> ResolvedPos<'a> {
    fn resolve(root: &'a Node, pos: usize) -> Result<Self, PatchError> {
        let size = root.content_size();
        if pos > size {
            return Err(PatchError::PositionOutOfRange { pos, size });
        }

        let mut path = Vec::new();
        let mut node = root;
        let mut start = 0;
        let mut offset = pos;
        loop {
            let (index, child_offset) = node.find_index(offset);
            let rem = offset - child_offset;
            path.push(PathEntry {
                node,
                index,
                start,
                child_offset,
            });
            if rem == 0 {
                break;
            }
            let Some(child) = node.child(index) else {
                break;
            };
            if child.is_leaf() {
                break;
            }
            node = child;
            start += child_offset + 1;
            offset = rem - 1;
        }

        Ok(Self { pos, path })
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Depth of the innermost parent; the doc is depth 0.
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    fn entry(&self, depth: usize) -> &PathEntry<'a> {
        &self.path[depth.min(self.depth())]
    }

    /// Ancestor at `depth`.
    pub fn node(&self, depth: usize) -> &'a Node {
        self.entry(depth).node
    }

    /// The innermost node containing the position.
    pub fn parent(&self) -> &'a Node {
        self.node(self.depth())
    }

    /// Index into the ancestor at `depth`.
    pub fn index(&self, depth: usize) -> usize {
        self.entry(depth).index
    }

    /// Position where the content of the ancestor at `depth` starts.
    pub fn start(&self, depth: usize) -> usize {
        self.entry(depth).start
    }

    /// Position where the content of the ancestor at `depth` ends.
    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content_size()
    }

    /// Position directly before the ancestor at `depth` (depth >= 1).
    pub fn before(&self, depth: usize) -> usize {
        self.start(depth).saturating_sub(1)
    }

    /// Position directly after the ancestor at `depth` (depth >= 1).
    pub fn after(&self, depth: usize) -> usize {
        self.end(depth) + 1
    }

    /// Offset into the parent's content.
    pub fn parent_offset(&self) -> usize {
        self.pos - self.start(self.depth())
    }

    /// Offset into the text node the position points into, 0 on boundaries.
    pub fn text_offset(&self) -> usize {
        let last = self.entry(self.depth());
        self.pos - last.start - last.child_offset
    }

    /// Node directly after the position. Inside text, the whole text node.
    pub fn node_after(&self) -> Option<&'a Node> {
        let parent = self.parent();
        parent.child(self.index(self.depth()))
    }

    /// Node directly before the position. Inside text, the whole text node.
    pub fn node_before(&self) -> Option<&'a Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        if self.text_offset() > 0 {
            return parent.child(index);
        }
        index.checked_sub(1).and_then(|i| parent.child(i))
    }

    /// Ancestors from the innermost parent up to the doc, with their depth.
    pub fn ancestors(&self) -> impl Iterator<Item = (usize, &'a Node)> + '_ {
        (0..=self.depth()).rev().map(|d| (d, self.node(d)))
    }

    /// Whether the position sits between two block-level siblings rather
    /// than inside inline content.
    pub fn is_block_boundary(&self) -> bool {
        !self.parent().is_textblock() && self.text_offset() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::HeadingAttrs;

    fn sample() -> Document {
        // 0 <p>1 a b 3</p>4 <columns>5 <column>6 <p>7 c 8</p>9 </column>10 <column>11 <p>12 d 13</p>14 </column>15 </columns>16
        Document::new(Node::doc(vec![
            Node::paragraph("ab"),
            Node::columns(vec![vec![Node::paragraph("c")], vec![Node::paragraph("d")]]),
        ]))
        .unwrap()
    }

    #[test]
    fn test_resolve_top_level() {
        let doc = sample();
        let rp = doc.resolve(0).unwrap();
        assert_eq!(rp.depth(), 0);
        assert_eq!(rp.index(0), 0);
        assert!(rp.is_block_boundary());
        assert!(rp.node_before().is_none());
        assert!(rp.node_after().unwrap().is(NodeType::Paragraph));

        let rp = doc.resolve(4).unwrap();
        assert_eq!(rp.depth(), 0);
        assert!(rp.node_before().unwrap().is(NodeType::Paragraph));
        assert!(rp.node_after().unwrap().is(NodeType::Columns));
    }

    #[test]
    fn test_resolve_inside_text() {
        let doc = sample();
        let rp = doc.resolve(2).unwrap();
        assert_eq!(rp.depth(), 1);
        assert!(rp.parent().is(NodeType::Paragraph));
        assert_eq!(rp.parent_offset(), 1);
        assert_eq!(rp.text_offset(), 1);
        assert_eq!(rp.before(1), 0);
        assert_eq!(rp.after(1), 4);
        assert!(!rp.is_block_boundary());
    }

    #[test]
    fn test_resolve_inside_column() {
        let doc = sample();
        let rp = doc.resolve(8).unwrap();
        assert_eq!(rp.depth(), 3);
        assert!(rp.node(1).is(NodeType::Columns));
        assert!(rp.node(2).is(NodeType::Column));
        assert_eq!(rp.before(2), 5);
        assert_eq!(rp.before(3), 6);
        assert_eq!(rp.end(3), 8);

        let kinds: Vec<NodeType> = rp.ancestors().map(|(_, n)| n.node_type()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeType::Paragraph,
                NodeType::Column,
                NodeType::Columns,
                NodeType::Doc
            ]
        );
    }

    #[test]
    fn test_resolve_out_of_range() {
        let doc = sample();
        assert_eq!(doc.content_size(), 16);
        assert!(doc.resolve(16).is_ok());
        assert_eq!(
            doc.resolve(17).unwrap_err(),
            PatchError::PositionOutOfRange { pos: 17, size: 16 }
        );
    }

    #[test]
    fn test_node_at() {
        let doc = sample();
        assert!(doc.node_at(0).unwrap().is(NodeType::Paragraph));
        assert!(doc.node_at(4).unwrap().is(NodeType::Columns));
        assert!(doc.node_at(5).unwrap().is(NodeType::Column));
        assert!(doc.node_at(10).unwrap().is(NodeType::Column));
        assert!(doc.node_at(11).unwrap().is(NodeType::Paragraph));
        assert!(doc.node_at(16).is_none());
    }

    #[test]
    fn test_descendants_and_find_all() {
        let doc = Document::new(Node::doc(vec![
            Node::heading(HeadingAttrs::new(1), "A"),
            Node::blockquote(vec![Node::heading(HeadingAttrs::new(2), "B")]),
        ]))
        .unwrap();

        let headings: Vec<usize> = doc
            .find_all(NodeType::Heading)
            .into_iter()
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(headings, vec![0, 4]);

        let mut visited = Vec::new();
        doc.descendants(|node, pos, _, _| {
            visited.push((node.node_type(), pos));
            !node.is(NodeType::Blockquote)
        });
        assert_eq!(
            visited,
            vec![
                (NodeType::Heading, 0),
                (NodeType::Text, 1),
                (NodeType::Blockquote, 3),
            ]
        );
    }
}

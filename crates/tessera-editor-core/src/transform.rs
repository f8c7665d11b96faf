//! Document patches: steps, position mapping and transactions.
//!
//! A transaction is an ordered list of steps. Positions in each step refer to
//! the document as left by the steps before it. Applying a transaction is all
//! or nothing: the result is a new `Document`, or an error and no change.

use smol_str::SmolStr;

use crate::document::Document;
use crate::error::PatchError;
use crate::node::{Node, NodeId, NodeKind, NodeType, normalize_inline, slice_text};
use crate::schema;
use crate::types::Selection;

/// A single edit to the document tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Replace `from..to` (both in the same parent) with `nodes`.
    Replace {
        from: usize,
        to: usize,
        nodes: Vec<Node>,
    },
    /// Change the kind and attributes of the node at `pos`, keeping content.
    SetNodeMarkup { pos: usize, kind: NodeKind },
    /// Stamp a stable id on the node at `pos`.
    SetNodeId { pos: usize, id: NodeId },
}

impl Step {
    /// The position shift this step causes.
    pub fn map(&self) -> StepMap {
        match self {
            Step::Replace { from, to, nodes } => StepMap {
                start: *from,
                old_size: to.saturating_sub(*from),
                new_size: nodes.iter().map(Node::node_size).sum(),
            },
            Step::SetNodeMarkup { .. } | Step::SetNodeId { .. } => StepMap::identity(),
        }
    }
}

/// Which side a position sticks to when content is inserted exactly there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Assoc {
    Left,
    #[default]
    Right,
}

/// Position shift of one replaced range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepMap {
    pub start: usize,
    pub old_size: usize,
    pub new_size: usize,
}

impl StepMap {
    pub fn identity() -> Self {
        Self {
            start: 0,
            old_size: 0,
            new_size: 0,
        }
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        if self.old_size == 0 && self.new_size == 0 {
            return pos;
        }
        let end = self.start + self.old_size;
        if pos < self.start || (pos == self.start && self.old_size == 0 && assoc == Assoc::Left) {
            return pos;
        }
        if pos > end {
            return pos - self.old_size + self.new_size;
        }
        let side = if self.old_size == 0 {
            assoc
        } else if pos == self.start {
            Assoc::Left
        } else if pos == end {
            Assoc::Right
        } else {
            assoc
        };
        match side {
            Assoc::Left => self.start,
            Assoc::Right => self.start + self.new_size,
        }
    }
}

/// A sequence of step maps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn extend(&mut self, other: &Mapping) {
        self.maps.extend_from_slice(&other.maps);
    }

    pub fn map(&self, pos: usize) -> usize {
        self.map_assoc(pos, Assoc::Right)
    }

    pub fn map_assoc(&self, pos: usize, assoc: Assoc) -> usize {
        self.maps.iter().fold(pos, |p, m| m.map(p, assoc))
    }
}

/// Where a transaction came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Origin {
    /// Typed or clicked by the local user.
    #[default]
    Local,
    /// Received from a collaborator.
    Remote,
    /// Produced by an observer repairing or stamping the document.
    System,
}

/// Flags attached to a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionMeta {
    /// Column cleanup ignores this transaction.
    pub skip_column_cleanup: bool,
    pub origin: Origin,
    pub add_to_history: bool,
}

impl Default for TransactionMeta {
    fn default() -> Self {
        Self {
            skip_column_cleanup: false,
            origin: Origin::Local,
            add_to_history: true,
        }
    }
}

/// An atomic patch: steps, an optional new selection and metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transaction {
    steps: Vec<Step>,
    selection: Option<Selection>,
    meta: TransactionMeta,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transaction produced by an observer (system origin, no history).
    pub fn system() -> Self {
        Self {
            meta: TransactionMeta {
                origin: Origin::System,
                add_to_history: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn replace(self, from: usize, to: usize, nodes: Vec<Node>) -> Self {
        self.step(Step::Replace { from, to, nodes })
    }

    pub fn insert(self, pos: usize, nodes: Vec<Node>) -> Self {
        self.replace(pos, pos, nodes)
    }

    pub fn delete(self, from: usize, to: usize) -> Self {
        self.replace(from, to, Vec::new())
    }

    pub fn insert_text(self, pos: usize, text: &str) -> Self {
        self.replace(pos, pos, vec![Node::text(text)])
    }

    pub fn set_node_markup(self, pos: usize, kind: NodeKind) -> Self {
        self.step(Step::SetNodeMarkup { pos, kind })
    }

    pub fn set_node_id(self, pos: usize, id: impl Into<NodeId>) -> Self {
        self.step(Step::SetNodeId { pos, id: id.into() })
    }

    pub fn set_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn skip_column_cleanup(mut self) -> Self {
        self.meta.skip_column_cleanup = true;
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.meta.origin = origin;
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn meta(&self) -> &TransactionMeta {
        &self.meta
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Combined position mapping of all steps.
    pub fn mapping(&self) -> Mapping {
        let mut mapping = Mapping::new();
        for step in &self.steps {
            mapping.push(step.map());
        }
        mapping
    }
}

impl Document {
    /// Apply a transaction, yielding the next document version.
    pub fn apply(&self, tr: &Transaction) -> Result<(Document, Mapping), PatchError> {
        let mut current = Document::new_unchecked(self.root().clone());
        let mut mapping = Mapping::new();
        for step in tr.steps() {
            current = Document::new_unchecked(apply_step(&current, step)?);
            mapping.push(step.map());
        }
        schema::check(current.root())?;
        Ok((self.next(current.root().clone()), mapping))
    }
}

fn apply_step(doc: &Document, step: &Step) -> Result<Node, PatchError> {
    let root = doc.root();
    match step {
        Step::Replace { from, to, nodes } => {
            if from > to {
                return Err(PatchError::InvertedRange {
                    from: *from,
                    to: *to,
                });
            }
            let rf = doc.resolve(*from)?;
            let rt = doc.resolve(*to)?;
            let depth = rf.depth();
            if rt.depth() != depth || rt.start(depth) != rf.start(depth) {
                return Err(PatchError::UnevenRange {
                    from: *from,
                    to: *to,
                });
            }
            let path: Vec<usize> = (0..depth).map(|d| rf.index(d)).collect();
            let a = rf.parent_offset();
            let b = rt.parent_offset();
            let mut root = root.clone();
            let parent = descend_mut(&mut root, &path);
            let content = splice(parent.children(), a, b, nodes.clone())?;
            let content = if parent.is_textblock() {
                normalize_inline(content)
            } else {
                content
            };
            *parent.content_mut() = content;
            Ok(root)
        }
        Step::SetNodeMarkup { pos, kind } => {
            let path = node_path(doc, *pos)?;
            let mut root = root.clone();
            let node = descend_mut(&mut root, &path);
            let from = node.node_type();
            let to = kind.node_type();
            if node.is_text() || from.is_leaf() != to.is_leaf() || to == NodeType::Text {
                return Err(PatchError::IncompatibleMarkup { from, to });
            }
            node.set_kind(kind.clone());
            Ok(root)
        }
        Step::SetNodeId { pos, id } => {
            let path = node_path(doc, *pos)?;
            let mut root = root.clone();
            let node = descend_mut(&mut root, &path);
            if node.is_text() {
                return Err(PatchError::NoNodeAt(*pos));
            }
            node.set_id(Some(id.clone()));
            Ok(root)
        }
    }
}

/// Child-index path from the root to the node starting at `pos`.
fn node_path(doc: &Document, pos: usize) -> Result<Vec<usize>, PatchError> {
    let rp = doc.resolve(pos)?;
    if rp.text_offset() != 0 || rp.node_after().is_none() {
        return Err(PatchError::NoNodeAt(pos));
    }
    Ok((0..=rp.depth()).map(|d| rp.index(d)).collect())
}

fn descend_mut<'a>(root: &'a mut Node, path: &[usize]) -> &'a mut Node {
    path.iter()
        .fold(root, |node, &index| &mut node.content_mut()[index])
}

/// Replace content offsets `a..b` of a child list, splitting text at the edges.
fn splice(content: &[Node], a: usize, b: usize, insert: Vec<Node>) -> Result<Vec<Node>, PatchError> {
    let mut out = Vec::with_capacity(content.len() + insert.len());

    let mut cur = 0;
    for child in content {
        let end = cur + child.node_size();
        if end <= a {
            out.push(child.clone());
        } else if cur < a {
            out.push(text_part(child, 0, a - cur, a)?);
        }
        cur = end;
    }

    out.extend(insert);

    let mut cur = 0;
    for child in content {
        let size = child.node_size();
        let end = cur + size;
        if cur >= b {
            out.push(child.clone());
        } else if end > b {
            out.push(text_part(child, b - cur, size, b)?);
        }
        cur = end;
    }

    Ok(out)
}

fn text_part(child: &Node, from: usize, to: usize, pos: usize) -> Result<Node, PatchError> {
    let text = child.text_str().ok_or(PatchError::NoNodeAt(pos))?;
    let part: SmolStr = slice_text(text, from, to);
    Ok(child.with_kind(NodeKind::Text { text: part }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::HeadingAttrs;

    fn doc(nodes: Vec<Node>) -> Document {
        Document::new(Node::doc(nodes)).unwrap()
    }

    #[test]
    fn test_insert_text_merges() {
        let d = doc(vec![Node::paragraph("held")]);
        let tr = Transaction::new().insert_text(4, "lo wor");
        let (next, _) = d.apply(&tr).unwrap();
        assert_eq!(next.root().child(0).unwrap().children().len(), 1);
        assert_eq!(next.root().text_content(), "hello word");
        assert_eq!(next.version(), d.version() + 1);
    }

    #[test]
    fn test_delete_text_range() {
        let d = doc(vec![Node::paragraph("hello world")]);
        let (next, mapping) = d.apply(&Transaction::new().delete(6, 12)).unwrap();
        assert_eq!(next.root().text_content(), "hello");
        assert_eq!(mapping.map(13), 7);
    }

    #[test]
    fn test_replace_blocks() {
        let d = doc(vec![Node::paragraph("a"), Node::paragraph("b")]);
        let tr = Transaction::new().replace(3, 6, vec![Node::horizontal_rule()]);
        let (next, _) = d.apply(&tr).unwrap();
        let types: Vec<NodeType> = next.root().children().iter().map(Node::node_type).collect();
        assert_eq!(types, vec![NodeType::Paragraph, NodeType::HorizontalRule]);
    }

    #[test]
    fn test_uneven_range_rejected() {
        let d = doc(vec![Node::paragraph("a"), Node::paragraph("b")]);
        let err = d.apply(&Transaction::new().delete(1, 5)).unwrap_err();
        assert_eq!(err, PatchError::UnevenRange { from: 1, to: 5 });
    }

    #[test]
    fn test_schema_violation_rejects_whole_transaction() {
        let d = doc(vec![Node::paragraph("a")]);
        let tr = Transaction::new()
            .insert_text(1, "b")
            .delete(0, 4);
        assert!(matches!(d.apply(&tr), Err(PatchError::Schema(_))));
    }

    #[test]
    fn test_set_node_markup_and_id() {
        let d = doc(vec![Node::paragraph("title")]);
        let tr = Transaction::new()
            .set_node_markup(0, NodeKind::Heading(HeadingAttrs::numbered(1, 0)))
            .set_node_id(0, "h-1");
        let (next, _) = d.apply(&tr).unwrap();
        let heading = next.root().child(0).unwrap();
        assert!(heading.heading_attrs().unwrap().numbered);
        assert_eq!(heading.id().map(|s| s.as_str()), Some("h-1"));
        assert_eq!(heading.text_content(), "title");
    }

    #[test]
    fn test_markup_cannot_change_leafness() {
        let d = doc(vec![Node::paragraph("x")]);
        let err = d
            .apply(&Transaction::new().set_node_markup(0, NodeKind::HorizontalRule))
            .unwrap_err();
        assert!(matches!(err, PatchError::IncompatibleMarkup { .. }));
    }

    #[test]
    fn test_step_map_assoc() {
        let insert = StepMap {
            start: 5,
            old_size: 0,
            new_size: 3,
        };
        assert_eq!(insert.map(5, Assoc::Left), 5);
        assert_eq!(insert.map(5, Assoc::Right), 8);
        assert_eq!(insert.map(4, Assoc::Right), 4);
        assert_eq!(insert.map(6, Assoc::Left), 9);

        let delete = StepMap {
            start: 2,
            old_size: 4,
            new_size: 0,
        };
        assert_eq!(delete.map(4, Assoc::Right), 2);
        assert_eq!(delete.map(7, Assoc::Right), 3);
    }
}

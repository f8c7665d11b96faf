//! Document nodes: a closed set of node types with typed attributes.
//!
//! Every node carries its kind (type tag plus attributes), an optional stable
//! identifier and an ordered list of children. Text lives in `Text` leaf nodes
//! inside textblocks.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Stable node identifier assigned by the unique-id service.
pub type NodeId = SmolStr;

/// Lowest heading level.
pub const MIN_HEADING_LEVEL: u8 = 1;
/// Highest heading level.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Type tag of a node, without attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Columns,
    Column,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    Text,
}

impl NodeType {
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Doc => "doc",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::Columns => "columns",
            NodeType::Column => "column",
            NodeType::Blockquote => "blockquote",
            NodeType::CodeBlock => "codeBlock",
            NodeType::HorizontalRule => "horizontalRule",
            NodeType::Text => "text",
        }
    }

    /// Blocks that hold inline text directly.
    pub fn is_textblock(self) -> bool {
        matches!(
            self,
            NodeType::Paragraph | NodeType::Heading | NodeType::CodeBlock
        )
    }

    /// Nodes allowed as children of the doc, a column or a blockquote.
    ///
    /// `Column` is structural and only valid inside `Columns`.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            NodeType::Paragraph
                | NodeType::Heading
                | NodeType::Columns
                | NodeType::Blockquote
                | NodeType::CodeBlock
                | NodeType::HorizontalRule
        )
    }

    /// Nodes without an opening and closing token.
    pub fn is_leaf(self) -> bool {
        matches!(self, NodeType::HorizontalRule | NodeType::Text)
    }

    /// Whether nodes of this type can carry a stable id.
    pub fn can_carry_id(self) -> bool {
        !matches!(self, NodeType::Doc | NodeType::Text)
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Heading attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingAttrs {
    /// 1..=6
    pub level: u8,
    /// Whether the heading takes part in outline numbering.
    pub numbered: bool,
    /// Outline depth, 0..=max indent.
    pub indent: u8,
    pub collapsed: bool,
}

impl Default for HeadingAttrs {
    fn default() -> Self {
        Self {
            level: MIN_HEADING_LEVEL,
            numbered: false,
            indent: 0,
            collapsed: false,
        }
    }
}

impl HeadingAttrs {
    pub fn new(level: u8) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn numbered(level: u8, indent: u8) -> Self {
        Self {
            level,
            numbered: true,
            indent,
            collapsed: false,
        }
    }
}

/// How columns are arranged on narrow screens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnsLayout {
    #[default]
    Stacked,
    Grid,
}

/// Attributes of a `columns` container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsAttrs {
    pub count: usize,
    /// Percentages, one per column, summing to 100.
    pub column_widths: Vec<f64>,
    #[serde(default)]
    pub layout: ColumnsLayout,
}

impl ColumnsAttrs {
    /// Equal-width attributes for `count` columns.
    pub fn equal(count: usize) -> Self {
        Self {
            count,
            column_widths: equal_widths(count),
            layout: ColumnsLayout::default(),
        }
    }
}

/// Attributes of a single `column`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnAttrs {
    /// Percentage of the container width.
    pub width: f64,
}

/// Split 100% evenly across `count` columns.
pub fn equal_widths(count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    vec![100.0 / count as f64; count]
}

/// Node type tag together with its typed attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    Doc,
    Paragraph,
    Heading(HeadingAttrs),
    Columns(ColumnsAttrs),
    Column(ColumnAttrs),
    Blockquote,
    CodeBlock { language: Option<SmolStr> },
    HorizontalRule,
    Text { text: SmolStr },
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Doc => NodeType::Doc,
            NodeKind::Paragraph => NodeType::Paragraph,
            NodeKind::Heading(_) => NodeType::Heading,
            NodeKind::Columns(_) => NodeType::Columns,
            NodeKind::Column(_) => NodeType::Column,
            NodeKind::Blockquote => NodeType::Blockquote,
            NodeKind::CodeBlock { .. } => NodeType::CodeBlock,
            NodeKind::HorizontalRule => NodeType::HorizontalRule,
            NodeKind::Text { .. } => NodeType::Text,
        }
    }
}

/// A node in the document tree.
///
/// Nodes are values: editing never mutates a node in place, it builds a new
/// tree that shares nothing with the old one except through cloning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, content: Vec<Node>) -> Self {
        Self {
            kind,
            id: None,
            content,
        }
    }

    pub fn doc(content: Vec<Node>) -> Self {
        Self::new(NodeKind::Doc, content)
    }

    pub fn text(text: impl Into<SmolStr>) -> Self {
        Self::new(NodeKind::Text { text: text.into() }, Vec::new())
    }

    /// Paragraph holding `text`; an empty string yields an empty paragraph.
    pub fn paragraph(text: &str) -> Self {
        Self::new(NodeKind::Paragraph, inline(text))
    }

    pub fn empty_paragraph() -> Self {
        Self::new(NodeKind::Paragraph, Vec::new())
    }

    pub fn heading(attrs: HeadingAttrs, text: &str) -> Self {
        Self::new(NodeKind::Heading(attrs), inline(text))
    }

    pub fn code_block(text: &str) -> Self {
        Self::new(NodeKind::CodeBlock { language: None }, inline(text))
    }

    pub fn blockquote(content: Vec<Node>) -> Self {
        Self::new(NodeKind::Blockquote, content)
    }

    pub fn horizontal_rule() -> Self {
        Self::new(NodeKind::HorizontalRule, Vec::new())
    }

    pub fn column(width: f64, content: Vec<Node>) -> Self {
        Self::new(NodeKind::Column(ColumnAttrs { width }), content)
    }

    /// A `columns` container over the given column contents, equal widths.
    pub fn columns(columns: Vec<Vec<Node>>) -> Self {
        let attrs = ColumnsAttrs::equal(columns.len());
        let children = columns
            .into_iter()
            .zip(attrs.column_widths.iter())
            .map(|(content, width)| Node::column(*width, content))
            .collect();
        Self::new(NodeKind::Columns(attrs), children)
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Copy with a different kind, keeping id and content.
    pub fn with_kind(&self, kind: NodeKind) -> Self {
        Self {
            kind,
            id: self.id.clone(),
            content: self.content.clone(),
        }
    }

    /// Copy with different content, keeping kind and id.
    pub fn with_content(&self, content: Vec<Node>) -> Self {
        Self {
            kind: self.kind.clone(),
            id: self.id.clone(),
            content,
        }
    }

    pub(crate) fn set_id(&mut self, id: Option<NodeId>) {
        self.id = id;
    }

    pub(crate) fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    pub(crate) fn content_mut(&mut self) -> &mut Vec<Node> {
        &mut self.content
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn is(&self, ty: NodeType) -> bool {
        self.node_type() == ty
    }

    pub fn id(&self) -> Option<&NodeId> {
        self.id.as_ref()
    }

    pub fn children(&self) -> &[Node] {
        &self.content
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    pub fn is_textblock(&self) -> bool {
        self.node_type().is_textblock()
    }

    pub fn is_leaf(&self) -> bool {
        self.node_type().is_leaf()
    }

    /// Text payload of a text node.
    pub fn text_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { text } => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn heading_attrs(&self) -> Option<&HeadingAttrs> {
        match &self.kind {
            NodeKind::Heading(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn columns_attrs(&self) -> Option<&ColumnsAttrs> {
        match &self.kind {
            NodeKind::Columns(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn column_attrs(&self) -> Option<&ColumnAttrs> {
        match &self.kind {
            NodeKind::Column(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Size of the node in document positions.
    ///
    /// Text counts one per char, leaves count one, everything else counts its
    /// content plus an opening and closing token.
    pub fn node_size(&self) -> usize {
        match &self.kind {
            NodeKind::Text { text } => text.chars().count(),
            NodeKind::HorizontalRule => 1,
            _ => self.content_size() + 2,
        }
    }

    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::node_size).sum()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text { text } => out.push_str(text),
            _ => self.content.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Text between two content offsets of a textblock.
    pub fn text_between(&self, from: usize, to: usize) -> String {
        self.text_content()
            .chars()
            .skip(from)
            .take(to.saturating_sub(from))
            .collect()
    }

    /// Find the child covering a content offset.
    ///
    /// Returns `(index, child_start)`. An offset on a boundary resolves to the
    /// child after it.
    pub(crate) fn find_index(&self, offset: usize) -> (usize, usize) {
        let mut cur = 0;
        for (i, child) in self.content.iter().enumerate() {
            let end = cur + child.node_size();
            if end > offset {
                return (i, cur);
            }
            if end == offset {
                return (i + 1, end);
            }
            cur = end;
        }
        (self.content.len(), cur)
    }

    /// Content offset where child `index` starts.
    pub fn child_offset(&self, index: usize) -> usize {
        self.content[..index.min(self.content.len())]
            .iter()
            .map(Node::node_size)
            .sum()
    }
}

fn inline(text: &str) -> Vec<Node> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Node::text(text)]
    }
}

/// Slice a text node by char offsets.
pub(crate) fn slice_text(text: &str, from: usize, to: usize) -> SmolStr {
    text.chars().skip(from).take(to.saturating_sub(from)).collect()
}

/// Merge adjacent text nodes and drop empty ones.
pub(crate) fn normalize_inline(content: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(content.len());
    for node in content {
        if let Some(text) = node.text_str() {
            if text.is_empty() {
                continue;
            }
            if let Some(prev) = out.last_mut() {
                if let NodeKind::Text { text: prev_text } = &mut prev.kind {
                    let mut joined = prev_text.to_string();
                    joined.push_str(text);
                    *prev_text = joined.into();
                    continue;
                }
            }
        }
        out.push(node);
    }
    out
}

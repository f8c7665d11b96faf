//! Stable node ids.
//!
//! Every node of a configured type gets an id the first time a change leaves
//! it without one. Duplicates introduced by a change (a paste of existing
//! nodes, for instance) are resolved in favour of the node that held the id
//! before the change.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::config::UniqueIdConfig;
use crate::document::Document;
use crate::node::NodeId;
use crate::pipeline::{ChangeObserver, EditorState};
use crate::transform::{Mapping, Origin, Transaction};

/// Source of fresh ids.
pub trait IdGenerator {
    fn generate(&self) -> NodeId;
}

/// Textual UUID v4.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> NodeId {
        Uuid::new_v4().to_string().into()
    }
}

type TransactionFilter = Box<dyn Fn(&Transaction) -> bool>;

/// Id assignment service. Registered as a change observer.
pub struct UniqueIds {
    config: UniqueIdConfig,
    generator: Box<dyn IdGenerator>,
    filter: Option<TransactionFilter>,
}

impl UniqueIds {
    pub fn new(config: UniqueIdConfig) -> Self {
        Self {
            config,
            generator: Box::new(RandomIdGenerator),
            filter: None,
        }
    }

    pub fn with_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }

    /// Only stamp changes for which `filter` returns true.
    pub fn with_filter(mut self, filter: impl Fn(&Transaction) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Leave changes from collaborators alone; their ids arrive with them.
    pub fn ignore_remote(self) -> Self {
        self.with_filter(|tr| tr.meta().origin != Origin::Remote)
    }

    /// Stamp a freshly loaded document.
    pub fn initial_pass(&self, doc: &Document) -> Option<Transaction> {
        self.assign(doc, None)
    }

    /// Patch giving every eligible node a unique id, or `None` if nothing is
    /// missing.
    ///
    /// `previous` is the document before the change and the mapping from it;
    /// it decides which copy of a duplicated id keeps it.
    pub fn assign(&self, doc: &Document, previous: Option<(&Document, &Mapping)>) -> Option<Transaction> {
        if self.config.read_only {
            return None;
        }

        let mut missing = Vec::new();
        let mut seen: BTreeMap<NodeId, Vec<usize>> = BTreeMap::new();
        doc.descendants(|node, pos, _, _| {
            let ty = node.node_type();
            if ty.can_carry_id() && self.config.types.contains(&ty) {
                match node.id().filter(|id| !id.is_empty()) {
                    Some(id) => seen.entry(id.clone()).or_default().push(pos),
                    None => missing.push(pos),
                }
            }
            !node.is_textblock()
        });

        for (id, positions) in seen.iter().filter(|(_, p)| p.len() > 1) {
            let keeper = previous
                .and_then(|(old, mapping)| {
                    let old_pos = position_of(old, id)?;
                    let mapped = mapping.map(old_pos);
                    positions.iter().copied().find(|p| *p == mapped)
                })
                .unwrap_or(positions[0]);
            tracing::debug!(target: "tessera::unique_id", %id, copies = positions.len(), keeper, "duplicate id");
            missing.extend(positions.iter().copied().filter(|p| *p != keeper));
        }

        if missing.is_empty() {
            return None;
        }
        missing.sort_unstable();

        let mut tr = Transaction::system();
        for pos in &missing {
            tr = tr.set_node_id(*pos, self.generator.generate());
        }
        tracing::debug!(target: "tessera::unique_id", count = missing.len(), "ids assigned");
        Some(tr)
    }
}

fn position_of(doc: &Document, id: &NodeId) -> Option<usize> {
    let mut found = None;
    doc.descendants(|node, pos, _, _| {
        if found.is_some() {
            return false;
        }
        if node.id() == Some(id) {
            found = Some(pos);
            return false;
        }
        !node.is_textblock()
    });
    found
}

impl ChangeObserver for UniqueIds {
    fn name(&self) -> &'static str {
        "unique-id"
    }

    fn accepts(&self, root: &Transaction) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(root))
    }

    fn observe(
        &self,
        transactions: &[Transaction],
        old: &EditorState,
        new: &EditorState,
    ) -> Option<Transaction> {
        if !transactions.iter().any(Transaction::doc_changed) {
            return None;
        }
        if let Some(filter) = &self.filter {
            if !transactions.iter().all(|tr| filter(tr)) {
                tracing::trace!(target: "tessera::unique_id", "change filtered out");
                return None;
            }
        }
        let mut mapping = Mapping::new();
        for tr in transactions {
            mapping.extend(&tr.mapping());
        }
        self.assign(&new.doc, Some((&old.doc, &mapping)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{HeadingAttrs, Node, NodeType};
    use std::cell::Cell;

    /// Sequential ids: `id-0`, `id-1`, ...
    #[derive(Default)]
    struct Counter(Cell<usize>);

    impl IdGenerator for Counter {
        fn generate(&self) -> NodeId {
            let n = self.0.get();
            self.0.set(n + 1);
            format!("id-{n}").into()
        }
    }

    fn ids(doc: &Document) -> Vec<Option<NodeId>> {
        let mut out = Vec::new();
        doc.descendants(|node, _, _, _| {
            if !node.is_text() {
                out.push(node.id().cloned());
            }
            !node.is_textblock()
        });
        out
    }

    #[test]
    fn test_uuid_format() {
        let id = RandomIdGenerator.generate();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id.len(), 36);
        assert_ne!(RandomIdGenerator.generate(), id);
    }

    #[test]
    fn test_initial_pass_is_idempotent() {
        let service = UniqueIds::new(UniqueIdConfig::default()).with_generator(Counter::default());
        let doc = Document::new(Node::doc(vec![
            Node::heading(HeadingAttrs::new(1), "t"),
            Node::columns(vec![vec![Node::paragraph("a")], vec![Node::paragraph("b")]]),
            Node::horizontal_rule(),
        ]))
        .unwrap();

        let tr = service.initial_pass(&doc).unwrap();
        let (stamped, _) = doc.apply(&tr).unwrap();
        let all = ids(&stamped);
        // The horizontal rule is not an eligible type.
        assert_eq!(all.iter().filter(|id| id.is_some()).count(), 6);
        assert_eq!(all.last(), Some(&None));
        assert!(service.initial_pass(&stamped).is_none());
    }

    #[test]
    fn test_read_only_never_stamps() {
        let config = UniqueIdConfig {
            read_only: true,
            ..Default::default()
        };
        let doc = Document::new(Node::doc(vec![Node::paragraph("a")])).unwrap();
        assert!(UniqueIds::new(config).initial_pass(&doc).is_none());
    }

    #[test]
    fn test_unsupported_types_are_skipped() {
        let config = UniqueIdConfig {
            types: vec![NodeType::Text, NodeType::Doc],
            ..Default::default()
        };
        let doc = Document::new(Node::doc(vec![Node::paragraph("a")])).unwrap();
        assert!(UniqueIds::new(config).initial_pass(&doc).is_none());
    }

    #[test]
    fn test_pasted_duplicate_gets_fresh_id() {
        let service = UniqueIds::new(UniqueIdConfig::default()).with_generator(Counter::default());
        let old = EditorState::new(
            Document::new(Node::doc(vec![Node::paragraph("a").with_id("keep")])).unwrap(),
        );
        // Paste a copy in front of the original.
        let paste = Transaction::new().insert(0, vec![Node::paragraph("a").with_id("keep")]);
        let new = old.apply(&paste).unwrap();

        let tr = service.observe(&[paste], &old, &new).unwrap();
        let (fixed, _) = new.doc.apply(&tr).unwrap();
        let root = fixed.root();
        assert_eq!(root.child(0).unwrap().id().map(NodeId::as_str), Some("id-0"));
        assert_eq!(root.child(1).unwrap().id().map(NodeId::as_str), Some("keep"));
    }

    #[test]
    fn test_remote_changes_filtered() {
        let service = UniqueIds::new(UniqueIdConfig::default()).ignore_remote();
        let old = EditorState::new(Document::new(Node::doc(vec![Node::paragraph("a")])).unwrap());
        let remote = Transaction::new()
            .insert(3, vec![Node::paragraph("b")])
            .with_origin(Origin::Remote);
        let new = old.apply(&remote).unwrap();
        assert!(service.observe(&[remote], &old, &new).is_none());

        let local = Transaction::new().insert(3, vec![Node::paragraph("b")]);
        let new = old.apply(&local).unwrap();
        assert!(service.observe(&[local], &old, &new).is_some());
    }

    #[test]
    fn test_remote_commit_stays_unstamped_through_cleanup() {
        use crate::columns::ColumnCleanup;
        use crate::config::ColumnsConfig;
        use crate::pipeline::Editor;

        // Container at 0 with columns at 1 and 6, <p>z</p> at 12.
        let doc = Document::new(Node::doc(vec![
            Node::columns(vec![vec![Node::paragraph("a")], vec![Node::paragraph("b")]]),
            Node::paragraph("z"),
        ]))
        .unwrap();
        let mut editor = Editor::new(EditorState::new(doc));
        editor.add_observer(
            UniqueIds::new(UniqueIdConfig::default())
                .with_generator(Counter::default())
                .ignore_remote(),
        );
        editor.add_observer(ColumnCleanup::new(ColumnsConfig::default()));

        // A collaborator appends a paragraph and empties the second column.
        let remote = Transaction::new()
            .insert(15, vec![Node::paragraph("remote")])
            .delete(7, 10)
            .with_origin(Origin::Remote);
        let report = editor.dispatch(remote).unwrap();
        assert!(report.appended >= 1);

        let root = editor.root();
        assert!(root.children().iter().all(|n| n.node_type() != NodeType::Columns));
        assert_eq!(root.children().last().unwrap().text_content(), "remote");
        assert_eq!(ids(editor.doc()), vec![None; root.child_count()]);
    }
}

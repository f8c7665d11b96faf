//! Host-side transaction pipeline.
//!
//! `Editor` stands in for the document-editing host: it owns the state, runs
//! key handlers before default handling and offers every committed change to
//! the registered observers. Observers return an optional patch; the host
//! applies it in the same commit and offers the new patches again until a
//! round produces nothing.

use crate::actions::{KeyAction, KeyOutcome};
use crate::columns::ColumnCleanup;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::PatchError;
use crate::heading::HeadingController;
use crate::input_rules::InputRules;
use crate::node::{Node, NodeType};
use crate::transform::Transaction;
use crate::types::Selection;
use crate::unique_id::UniqueIds;

/// Upper bound on observer rounds per dispatch, raised to the column count
/// of the changed document so column cleanup always settles.
pub const MAX_APPEND_ROUNDS: usize = 32;

/// Document plus selection.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorState {
    pub doc: Document,
    pub selection: Selection,
}

impl EditorState {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            selection: Selection::collapsed(0),
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection.clamp(self.doc.content_size());
        self
    }

    /// Apply a transaction; the selection is taken from the transaction or
    /// mapped through its steps.
    pub fn apply(&self, tr: &Transaction) -> Result<EditorState, PatchError> {
        let (doc, mapping) = self.doc.apply(tr)?;
        let selection = tr.selection().unwrap_or_else(|| {
            Selection::new(
                mapping.map(self.selection.anchor),
                mapping.map(self.selection.head),
            )
        });
        let selection = selection.clamp(doc.content_size());
        Ok(EditorState { doc, selection })
    }
}

/// Observes committed changes and may append a patch to the same commit.
pub trait ChangeObserver {
    fn name(&self) -> &'static str;

    /// Whether to observe the commit started by `root` at all. Decided once
    /// per dispatch; patches appended later in the commit do not reopen it.
    fn accepts(&self, root: &Transaction) -> bool {
        let _ = root;
        true
    }

    /// `transactions` took `old` to `new`. Positions in a returned patch refer
    /// to `new`.
    fn observe(
        &self,
        transactions: &[Transaction],
        old: &EditorState,
        new: &EditorState,
    ) -> Option<Transaction>;
}

/// Intercepts structural key actions before default handling.
pub trait KeyHandler {
    fn name(&self) -> &'static str;

    fn handle_key(&self, state: &EditorState, action: KeyAction) -> KeyOutcome;
}

/// What a dispatch committed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Patches appended by observers.
    pub appended: usize,
    /// Observer rounds that produced at least one patch.
    pub rounds: usize,
}

/// The host: state, key handlers and change observers.
pub struct Editor {
    state: EditorState,
    key_handlers: Vec<Box<dyn KeyHandler>>,
    observers: Vec<Box<dyn ChangeObserver>>,
    input_rules: Option<InputRules>,
    max_rounds: usize,
}

impl Editor {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            key_handlers: Vec::new(),
            observers: Vec::new(),
            input_rules: None,
            max_rounds: MAX_APPEND_ROUNDS,
        }
    }

    /// Editor with heading control, unique ids and column cleanup registered.
    ///
    /// The loaded document gets its initial ids stamped right away.
    pub fn with_default_extensions(doc: Document, config: &EditorConfig) -> Self {
        let unique_ids = UniqueIds::new(config.unique_id.clone());
        let initial = unique_ids.initial_pass(&doc);

        let mut editor = Self::new(EditorState::new(doc));
        editor.add_key_handler(HeadingController::new(config.heading.clone()));
        editor.add_observer(unique_ids);
        editor.add_observer(ColumnCleanup::new(config.columns.clone()));
        editor.set_input_rules(InputRules::new(config.heading.clone()));

        if let Some(tr) = initial {
            if let Err(err) = editor.dispatch(tr) {
                tracing::warn!(target: "tessera::pipeline", %err, "initial id pass rejected");
            }
        }
        editor
    }

    pub fn add_key_handler(&mut self, handler: impl KeyHandler + 'static) {
        self.key_handlers.push(Box::new(handler));
    }

    pub fn add_observer(&mut self, observer: impl ChangeObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn set_input_rules(&mut self, rules: InputRules) {
        self.input_rules = Some(rules);
    }

    pub fn set_max_rounds(&mut self, rounds: usize) {
        self.max_rounds = rounds;
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn doc(&self) -> &Document {
        &self.state.doc
    }

    pub fn root(&self) -> &Node {
        self.state.doc.root()
    }

    pub fn selection(&self) -> Selection {
        self.state.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.state.selection = selection.clamp(self.state.doc.content_size());
    }

    /// Commit a transaction and every patch the observers append to it.
    ///
    /// A rejected user transaction leaves the state untouched. A rejected
    /// observer patch is dropped and logged; the rest of the commit stands.
    pub fn dispatch(&mut self, tr: Transaction) -> Result<DispatchReport, PatchError> {
        let mut state = self.state.apply(&tr)?;
        let mut report = DispatchReport::default();

        let active: Vec<&dyn ChangeObserver> = self
            .observers
            .iter()
            .map(|o| o.as_ref())
            .filter(|o| {
                let accepted = o.accepts(&tr);
                if !accepted {
                    tracing::trace!(target: "tessera::pipeline", observer = o.name(), "observer declined commit");
                }
                accepted
            })
            .collect();
        // Every cleanup repair removes at least one column.
        let max_rounds = self
            .max_rounds
            .max(state.doc.find_all(NodeType::Column).len() + 1);

        let mut round_old = self.state.clone();
        let mut pending = vec![tr];

        while !active.is_empty() {
            if report.rounds >= max_rounds {
                tracing::warn!(
                    target: "tessera::pipeline",
                    rounds = report.rounds,
                    "observers did not settle; stopping"
                );
                break;
            }

            let round_start = state.clone();
            let mut produced = Vec::new();
            for observer in &active {
                let Some(extra) = observer.observe(&pending, &round_old, &state) else {
                    continue;
                };
                match state.apply(&extra) {
                    Ok(next) => {
                        tracing::trace!(
                            target: "tessera::pipeline",
                            observer = observer.name(),
                            steps = extra.steps().len(),
                            "appended patch"
                        );
                        state = next;
                        produced.push(extra);
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: "tessera::pipeline",
                            observer = observer.name(),
                            %err,
                            "appended patch rejected"
                        );
                    }
                }
            }

            if produced.is_empty() {
                break;
            }
            report.rounds += 1;
            report.appended += produced.len();
            round_old = round_start;
            pending = produced;
        }

        self.state = state;
        Ok(report)
    }

    /// Offer a key action to the handlers. Returns whether it was consumed.
    pub fn handle_key(&mut self, action: KeyAction) -> Result<bool, PatchError> {
        for handler in &self.key_handlers {
            match handler.handle_key(&self.state, action) {
                KeyOutcome::Ignored => continue,
                KeyOutcome::Handled => {
                    tracing::trace!(target: "tessera::pipeline", handler = handler.name(), ?action, "handled without change");
                    return Ok(true);
                }
                KeyOutcome::Apply(tr) => {
                    tracing::trace!(target: "tessera::pipeline", handler = handler.name(), ?action, "handled");
                    self.dispatch(tr)?;
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Type text at the selection, running input rules first.
    pub fn type_text(&mut self, text: &str) -> Result<DispatchReport, PatchError> {
        let from = self.state.selection.start();
        let to = self.state.selection.end();

        if let Some(rules) = &self.input_rules {
            if let Some(tr) = rules.handle_text_input(&self.state, from, to, text) {
                return self.dispatch(tr);
            }
        }

        let end = from + text.chars().count();
        let tr = Transaction::new()
            .replace(from, to, vec![Node::text(text)])
            .set_selection(Selection::collapsed(end));
        self.dispatch(tr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::HeadingAttrs;
    use std::cell::Cell;

    struct CountingObserver {
        calls: std::rc::Rc<Cell<usize>>,
    }

    impl ChangeObserver for CountingObserver {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn observe(&self, _: &[Transaction], _: &EditorState, _: &EditorState) -> Option<Transaction> {
            self.calls.set(self.calls.get() + 1);
            None
        }
    }

    /// Appends a paragraph after every change, forever.
    struct RunawayObserver;

    impl ChangeObserver for RunawayObserver {
        fn name(&self) -> &'static str {
            "runaway"
        }

        fn observe(&self, _: &[Transaction], _: &EditorState, new: &EditorState) -> Option<Transaction> {
            let end = new.doc.content_size();
            Some(Transaction::system().insert(end, vec![Node::paragraph("x")]))
        }
    }

    fn state(nodes: Vec<Node>) -> EditorState {
        EditorState::new(Document::new(Node::doc(nodes)).unwrap())
    }

    #[test]
    fn test_selection_mapped_through_changes() {
        let mut editor = Editor::new(state(vec![Node::paragraph("world")]));
        editor.set_selection(Selection::collapsed(6));
        editor
            .dispatch(Transaction::new().insert_text(1, "hello "))
            .unwrap();
        assert_eq!(editor.root().text_content(), "hello world");
        assert_eq!(editor.selection(), Selection::collapsed(12));
    }

    #[test]
    fn test_rejected_transaction_leaves_state() {
        let mut editor = Editor::new(state(vec![Node::paragraph("a")]));
        let before = editor.state().clone();
        assert!(editor.dispatch(Transaction::new().delete(0, 3)).is_err());
        assert_eq!(editor.state(), &before);
    }

    #[test]
    fn test_observer_called_once_when_quiet() {
        let calls = std::rc::Rc::new(Cell::new(0));
        let mut editor = Editor::new(state(vec![Node::paragraph("a")]));
        editor.add_observer(CountingObserver {
            calls: calls.clone(),
        });
        let report = editor.dispatch(Transaction::new().insert_text(1, "b")).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(report, DispatchReport::default());
    }

    #[test]
    fn test_runaway_observer_is_bounded() {
        let mut editor = Editor::new(state(vec![Node::paragraph("a")]));
        editor.add_observer(RunawayObserver);
        editor.set_max_rounds(5);
        let report = editor.dispatch(Transaction::new().insert_text(1, "b")).unwrap();
        assert_eq!(report.rounds, 5);
        assert_eq!(editor.root().child_count(), 6);
    }

    #[test]
    fn test_type_text_replaces_selection() {
        let mut editor = Editor::new(state(vec![Node::heading(HeadingAttrs::new(1), "abc")]));
        editor.set_selection(Selection::new(2, 3));
        editor.type_text("XY").unwrap();
        assert_eq!(editor.root().text_content(), "aXYc");
        assert_eq!(editor.selection(), Selection::collapsed(4));
    }
}

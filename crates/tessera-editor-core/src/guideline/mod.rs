//! Drag-and-drop guidelines.
//!
//! Two independent engines share one pointer stream: the horizontal engine
//! places a line between sibling blocks, the vertical engine detects column
//! gaps and the editor's side borders. When a vertical target is active the
//! horizontal line is hidden.

mod horizontal;
mod vertical;

pub use horizontal::{HorizontalGuide, drop_pos_at, horizontal_guide};
pub use vertical::{Side, VerticalGuide, VerticalMode, vertical_guide};

use crate::config::GuidelineConfig;
use crate::document::Document;
use crate::node::NodeType;
use crate::platform::LayoutQuery;
use crate::types::Point;

/// Everything the view needs to draw for one pointer position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GuidelineState {
    pub horizontal: Option<HorizontalGuide>,
    pub vertical: VerticalGuide,
}

/// The block being dragged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragSource {
    pub pos: usize,
    pub node_type: NodeType,
}

/// Guideline tracking for one drag gesture.
///
/// Each pointer move is computed from scratch; the last result is kept only
/// so an unchanged pointer on an unchanged document skips the layout reads.
pub struct DragGuidelines {
    config: GuidelineConfig,
    source: Option<DragSource>,
    last: Option<(u64, Point, GuidelineState)>,
}

impl DragGuidelines {
    pub fn new(config: GuidelineConfig) -> Self {
        Self {
            config,
            source: None,
            last: None,
        }
    }

    pub fn config(&self) -> &GuidelineConfig {
        &self.config
    }

    /// Begin dragging the block at `pos`.
    pub fn start(&mut self, doc: &Document, pos: usize) -> Option<DragSource> {
        let node = doc.node_at(pos)?;
        let source = DragSource {
            pos,
            node_type: node.node_type(),
        };
        tracing::debug!(target: "tessera::guideline", pos, node = %source.node_type, "drag started");
        self.source = Some(source);
        self.last = None;
        Some(source)
    }

    pub fn source(&self) -> Option<DragSource> {
        self.source
    }

    pub fn is_dragging(&self) -> bool {
        self.source.is_some()
    }

    /// Recompute the guides for a pointer at `point`.
    pub fn pointer_move(
        &mut self,
        doc: &Document,
        layout: &impl LayoutQuery,
        point: Point,
    ) -> GuidelineState {
        if let Some((version, last_point, state)) = &self.last {
            if *version == doc.version() && *last_point == point {
                return *state;
            }
        }

        let dragging = self.source.map(|s| s.node_type);
        let vertical = vertical_guide(doc, layout, point, dragging, &self.config);
        let horizontal = if vertical.is_visible() {
            None
        } else {
            drop_pos_at(doc, layout, point)
                .and_then(|pos| horizontal_guide(doc, layout, pos, dragging, &self.config))
        };

        let state = GuidelineState {
            horizontal,
            vertical,
        };
        self.last = Some((doc.version(), point, state));
        state
    }

    /// End the gesture. Returns the guides at the final pointer position.
    pub fn finish(&mut self) -> Option<(DragSource, GuidelineState)> {
        let source = self.source.take()?;
        let state = self.last.take().map(|(_, _, s)| s).unwrap_or_default();
        tracing::debug!(target: "tessera::guideline", pos = source.pos, vertical = ?state.vertical.mode, "drag finished");
        Some((source, state))
    }

    pub fn cancel(&mut self) {
        self.source = None;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::platform::FixedLayout;
    use crate::types::Rect;
    use std::cell::Cell;

    /// Counts layout reads.
    struct CountingLayout {
        inner: FixedLayout,
        reads: Cell<usize>,
    }

    impl LayoutQuery for CountingLayout {
        fn node_rect(&self, pos: usize) -> Option<Rect> {
            self.reads.set(self.reads.get() + 1);
            self.inner.node_rect(pos)
        }

        fn coords_at_pos(&self, pos: usize) -> Option<Rect> {
            self.reads.set(self.reads.get() + 1);
            self.inner.coords_at_pos(pos)
        }

        fn pos_at_coords(&self, point: Point) -> Option<usize> {
            self.reads.set(self.reads.get() + 1);
            self.inner.pos_at_coords(point)
        }

        fn editor_rect(&self) -> Option<Rect> {
            self.reads.set(self.reads.get() + 1);
            self.inner.editor_rect()
        }
    }

    fn setup() -> (Document, CountingLayout) {
        let doc = Document::new(Node::doc(vec![Node::paragraph("a"), Node::paragraph("b")])).unwrap();
        let layout = CountingLayout {
            inner: FixedLayout::new(Rect::new(0.0, 0.0, 400.0, 100.0))
                .with_node(0, Rect::new(20.0, 10.0, 380.0, 40.0))
                .with_node(3, Rect::new(20.0, 50.0, 380.0, 90.0)),
            reads: Cell::new(0),
        };
        (doc, layout)
    }

    #[test]
    fn test_horizontal_line_while_dragging() {
        let (doc, layout) = setup();
        let mut guides = DragGuidelines::new(GuidelineConfig::default());
        guides.start(&doc, 3).unwrap();
        let state = guides.pointer_move(&doc, &layout, Point::new(200.0, 15.0));
        assert!(!state.vertical.is_visible());
        assert_eq!(state.horizontal.map(|h| h.pos), Some(0));
    }

    #[test]
    fn test_vertical_target_hides_horizontal() {
        let (doc, layout) = setup();
        let mut guides = DragGuidelines::new(GuidelineConfig::default());
        guides.start(&doc, 3).unwrap();
        let state = guides.pointer_move(&doc, &layout, Point::new(5.0, 20.0));
        assert_eq!(state.vertical.mode, VerticalMode::EditorBorder);
        assert!(state.horizontal.is_none());

        let (source, last) = guides.finish().unwrap();
        assert_eq!(source.pos, 3);
        assert_eq!(last, state);
        assert!(!guides.is_dragging());
    }

    #[test]
    fn test_unchanged_pointer_skips_layout_reads() {
        let (doc, layout) = setup();
        let mut guides = DragGuidelines::new(GuidelineConfig::default());
        guides.start(&doc, 0).unwrap();
        let first = guides.pointer_move(&doc, &layout, Point::new(200.0, 45.0));
        let reads = layout.reads.get();
        let second = guides.pointer_move(&doc, &layout, Point::new(200.0, 45.0));
        assert_eq!(first, second);
        assert_eq!(layout.reads.get(), reads);

        guides.pointer_move(&doc, &layout, Point::new(200.0, 46.0));
        assert!(layout.reads.get() > reads);
    }
}

//! Platform abstraction for live layout queries.
//!
//! The geometry engines never touch a view directly. They ask a
//! `LayoutQuery` for rectangles of rendered nodes and for the mapping between
//! coordinates and document positions. The browser implementation reads the
//! DOM; tests use fixed rectangles.

use crate::types::{Point, Rect};

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Read-only, synchronous view of the current layout.
///
/// All rectangles share one coordinate space (the browser uses viewport
/// coordinates). Every method may return `None` when the view has nothing
/// rendered for the request; callers fall back to coarser strategies.
pub trait LayoutQuery {
    /// Bounding box of the node starting at `pos`.
    fn node_rect(&self, pos: usize) -> Option<Rect>;

    /// Caret box at `pos`.
    fn coords_at_pos(&self, pos: usize) -> Option<Rect>;

    /// Document position nearest to a point.
    fn pos_at_coords(&self, point: Point) -> Option<usize>;

    /// Bounding box of the editing surface.
    fn editor_rect(&self) -> Option<Rect>;
}

impl<T: LayoutQuery + ?Sized> LayoutQuery for &T {
    fn node_rect(&self, pos: usize) -> Option<Rect> {
        (**self).node_rect(pos)
    }

    fn coords_at_pos(&self, pos: usize) -> Option<Rect> {
        (**self).coords_at_pos(pos)
    }

    fn pos_at_coords(&self, point: Point) -> Option<usize> {
        (**self).pos_at_coords(point)
    }

    fn editor_rect(&self) -> Option<Rect> {
        (**self).editor_rect()
    }
}

/// Layout with fixed rectangles, for tests and headless hosts.
#[derive(Clone, Debug, Default)]
pub struct FixedLayout {
    pub editor: Option<Rect>,
    pub nodes: Vec<(usize, Rect)>,
    pub carets: Vec<(usize, Rect)>,
}

impl FixedLayout {
    pub fn new(editor: Rect) -> Self {
        Self {
            editor: Some(editor),
            ..Default::default()
        }
    }

    pub fn with_node(mut self, pos: usize, rect: Rect) -> Self {
        self.nodes.push((pos, rect));
        self
    }

    pub fn with_caret(mut self, pos: usize, rect: Rect) -> Self {
        self.carets.push((pos, rect));
        self
    }
}

impl LayoutQuery for FixedLayout {
    fn node_rect(&self, pos: usize) -> Option<Rect> {
        self.nodes.iter().find(|(p, _)| *p == pos).map(|(_, r)| *r)
    }

    fn coords_at_pos(&self, pos: usize) -> Option<Rect> {
        self.carets.iter().find(|(p, _)| *p == pos).map(|(_, r)| *r)
    }

    /// The innermost (smallest) node containing the point, at its start.
    fn pos_at_coords(&self, point: Point) -> Option<usize> {
        self.nodes
            .iter()
            .filter(|(_, r)| r.contains(point))
            .min_by(|(_, a), (_, b)| {
                (a.width() * a.height()).total_cmp(&(b.width() * b.height()))
            })
            .map(|(p, _)| p + 1)
    }

    fn editor_rect(&self) -> Option<Rect> {
        self.editor
    }
}

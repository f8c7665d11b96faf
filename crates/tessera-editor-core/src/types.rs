//! Core editor types: selection and layout geometry.
//!
//! These types are framework-agnostic; the browser layer converts DOM rects
//! into `Rect` and pointer events into `Point`.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Text selection with anchor and head document positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if the selection is collapsed (empty, cursor only).
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Convert to a Range<usize> (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Check if the selection is backwards (head before anchor).
    pub fn is_backwards(&self) -> bool {
        self.head < self.anchor
    }

    /// Clamp both ends into `0..=max`.
    pub fn clamp(self, max: usize) -> Self {
        Self {
            anchor: self.anchor.min(max),
            head: self.head.min(max),
        }
    }
}

/// A point in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }

    /// A horizontal line of `thickness` centred on `y`.
    pub fn horizontal_line(left: f64, right: f64, y: f64, thickness: f64) -> Self {
        let half = thickness / 2.0;
        Self::new(left, y - half, right, y + half)
    }

    /// A vertical line of `thickness` centred on `x`.
    pub fn vertical_line(x: f64, top: f64, bottom: f64, thickness: f64) -> Self {
        let half = thickness / 2.0;
        Self::new(x - half, top, x + half, bottom)
    }
}

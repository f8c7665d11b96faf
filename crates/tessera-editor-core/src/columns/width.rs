//! Column width redistribution for resize drags.
//!
//! Widths are percentages. A drag moves width between two adjacent columns
//! only, so the total never changes.

use crate::config::ColumnsConfig;
use crate::document::Document;
use crate::transform::Transaction;

use super::{ColumnsError, set_column_widths};

#[derive(Clone, Debug, PartialEq)]
pub struct WidthChange {
    /// False when clamping absorbed the whole delta.
    pub changed: bool,
    pub widths: Vec<f64>,
}

/// Move `delta_px` worth of width from `right` to `left` (negative moves the
/// other way), clamping both to `min_width` percent.
pub fn recompute(
    delta_px: f64,
    container_px: f64,
    widths: &[f64],
    left: usize,
    right: usize,
    min_width: f64,
) -> WidthChange {
    let unchanged = || WidthChange {
        changed: false,
        widths: widths.to_vec(),
    };
    if container_px <= 0.0 || !delta_px.is_finite() || left == right {
        return unchanged();
    }
    let (Some(&l), Some(&r)) = (widths.get(left), widths.get(right)) else {
        return unchanged();
    };

    let requested = delta_px / container_px * 100.0;
    // Each side may shrink to the minimum but not below; a side already
    // under the minimum cannot give anything.
    let max_grow = (r - min_width).max(0.0);
    let max_shrink = (l - min_width).max(0.0);
    let delta = requested.clamp(-max_shrink, max_grow);
    if delta.abs() < f64::EPSILON {
        return unchanged();
    }

    let mut out = widths.to_vec();
    out[left] = l + delta;
    out[right] = r - delta;
    WidthChange {
        changed: true,
        widths: out,
    }
}

/// An in-progress resize of the gap between two adjacent columns.
///
/// Every move recomputes from the widths captured at the start, so pointer
/// jitter never accumulates rounding error.
#[derive(Clone, Debug, PartialEq)]
pub struct ResizeDrag {
    container_pos: usize,
    start_x: f64,
    container_px: f64,
    start_widths: Vec<f64>,
    left: usize,
    current: Vec<f64>,
    min_width: f64,
}

impl ResizeDrag {
    /// Start dragging the gap right of column `left`.
    pub fn start(
        doc: &Document,
        container_pos: usize,
        left: usize,
        start_x: f64,
        container_px: f64,
        config: &ColumnsConfig,
    ) -> Result<Self, ColumnsError> {
        let attrs = doc
            .node_at(container_pos)
            .and_then(|n| n.columns_attrs())
            .ok_or(ColumnsError::NotAContainer(container_pos))?;
        if left + 1 >= attrs.column_widths.len() {
            return Err(ColumnsError::NoTarget);
        }
        tracing::trace!(target: "tessera::columns", container_pos, left, "resize started");
        Ok(Self {
            container_pos,
            start_x,
            container_px,
            start_widths: attrs.column_widths.clone(),
            left,
            current: attrs.column_widths.clone(),
            min_width: config.min_width,
        })
    }

    /// Pointer moved to `x`. Returns whether the widths changed.
    pub fn update(&mut self, x: f64) -> bool {
        let change = recompute(
            x - self.start_x,
            self.container_px,
            &self.start_widths,
            self.left,
            self.left + 1,
            self.min_width,
        );
        if change.widths == self.current {
            return false;
        }
        self.current = change.widths;
        true
    }

    pub fn widths(&self) -> &[f64] {
        &self.current
    }

    pub fn container_pos(&self) -> usize {
        self.container_pos
    }

    /// Commit the current widths. `None` when nothing moved.
    pub fn finish(self, doc: &Document, config: &ColumnsConfig) -> Result<Option<Transaction>, ColumnsError> {
        if self.current == self.start_widths {
            return Ok(None);
        }
        tracing::debug!(target: "tessera::columns", pos = self.container_pos, widths = ?self.current, "resize finished");
        set_column_widths(doc, self.container_pos, &self.current, config).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn sum(w: &[f64]) -> f64 {
        w.iter().sum()
    }

    #[test]
    fn test_moves_between_neighbours_only() {
        let change = recompute(60.0, 600.0, &[30.0, 40.0, 30.0], 0, 1, 5.0);
        assert!(change.changed);
        assert_eq!(change.widths, vec![40.0, 30.0, 30.0]);
    }

    #[test]
    fn test_clamps_to_minimum() {
        let change = recompute(-1000.0, 500.0, &[50.0, 50.0], 0, 1, 5.0);
        assert!(change.changed);
        assert_eq!(change.widths, vec![5.0, 95.0]);
        assert!((sum(&change.widths) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_fully_absorbed_delta_is_unchanged() {
        let change = recompute(50.0, 500.0, &[95.0, 5.0], 0, 1, 5.0);
        assert!(!change.changed);
        assert_eq!(change.widths, vec![95.0, 5.0]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(!recompute(10.0, 0.0, &[50.0, 50.0], 0, 1, 5.0).changed);
        assert!(!recompute(10.0, 100.0, &[50.0, 50.0], 0, 5, 5.0).changed);
        assert!(!recompute(f64::NAN, 100.0, &[50.0, 50.0], 0, 1, 5.0).changed);
    }

    #[test]
    fn test_conservation_over_many_drags() {
        let widths = [20.0, 30.0, 25.0, 25.0];
        for step in -40..40 {
            let delta = f64::from(step) * 13.7;
            for left in 0..3 {
                let change = recompute(delta, 731.0, &widths, left, left + 1, 5.0);
                assert!((sum(&change.widths) - 100.0).abs() < 1e-9);
                assert!(change.widths.iter().all(|w| *w >= 5.0 - 1e-9));
            }
        }
    }

    #[test]
    fn test_resize_drag_recomputes_from_start() {
        let doc = Document::new(Node::doc(vec![Node::columns(vec![
            vec![Node::paragraph("a")],
            vec![Node::paragraph("b")],
        ])]))
        .unwrap();
        let config = ColumnsConfig::default();
        let mut drag = ResizeDrag::start(&doc, 0, 0, 100.0, 400.0, &config).unwrap();
        assert!(drag.update(140.0));
        assert!(drag.update(120.0));
        assert_eq!(drag.widths(), &[55.0, 45.0]);
        assert!(!drag.update(120.0));

        let tr = drag.finish(&doc, &config).unwrap().unwrap();
        let (next, _) = doc.apply(&tr).unwrap();
        let container = next.root().child(0).unwrap();
        assert_eq!(container.columns_attrs().unwrap().column_widths, vec![55.0, 45.0]);
        assert_eq!(container.child(1).unwrap().column_attrs().unwrap().width, 45.0);
    }

    #[test]
    fn test_resize_drag_rejects_bad_targets() {
        let doc = Document::new(Node::doc(vec![Node::paragraph("a")])).unwrap();
        let config = ColumnsConfig::default();
        assert_eq!(
            ResizeDrag::start(&doc, 0, 0, 0.0, 100.0, &config),
            Err(ColumnsError::NotAContainer(0))
        );
    }
}

//! Tunable constants for the editing extensions.
//!
//! Every section deserializes with defaults, so a partial config file only
//! needs to name the values it overrides.

use serde::{Deserialize, Serialize};

use crate::node::{MAX_HEADING_LEVEL, MIN_HEADING_LEVEL, NodeType};

/// Smallest number of columns a container may settle at.
pub const MIN_COLUMNS: usize = 2;
/// Largest number of columns a container may hold.
pub const MAX_COLUMNS: usize = 7;
/// Smallest column width in percent.
pub const MIN_COLUMN_WIDTH: f64 = 5.0;
/// Tolerance when checking that widths sum to 100.
pub const WIDTH_TOLERANCE: f64 = 0.5;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub heading: HeadingConfig,
    pub columns: ColumnsConfig,
    pub guideline: GuidelineConfig,
    pub unique_id: UniqueIdConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    pub max_indent: u8,
    pub min_level: u8,
    pub max_level: u8,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            max_indent: 6,
            min_level: MIN_HEADING_LEVEL,
            max_level: MAX_HEADING_LEVEL,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub min_columns: usize,
    pub max_columns: usize,
    /// Percent.
    pub min_width: f64,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            min_columns: MIN_COLUMNS,
            max_columns: MAX_COLUMNS,
            min_width: MIN_COLUMN_WIDTH,
        }
    }
}

/// Drag guideline hot zones and line thickness, in pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidelineConfig {
    pub thickness: f64,
    /// Horizontal distance from a column gap that activates `columns-edge`.
    pub columns_edge_threshold: f64,
    /// Horizontal distance from the editor's side that activates `editor-border`.
    pub editor_border_threshold: f64,
    /// Vertical band beyond the content's top and bottom still counted as inside.
    pub vertical_tolerance: f64,
    /// Hide inter-block lines inside a column while dragging a columns container.
    pub suppress_inside_columns: bool,
}

impl Default for GuidelineConfig {
    fn default() -> Self {
        Self {
            thickness: 4.0,
            columns_edge_threshold: 12.0,
            editor_border_threshold: 24.0,
            vertical_tolerance: 16.0,
            suppress_inside_columns: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniqueIdConfig {
    /// Node types that receive an id.
    pub types: Vec<NodeType>,
    /// Observe only; never stamp ids.
    pub read_only: bool,
}

impl Default for UniqueIdConfig {
    fn default() -> Self {
        Self {
            types: vec![
                NodeType::Heading,
                NodeType::Paragraph,
                NodeType::Columns,
                NodeType::Column,
            ],
            read_only: false,
        }
    }
}

//! tessera-editor-core: structural editing logic without framework dependencies.
//!
//! This crate provides:
//! - `Document` - immutable node tree with integer positions
//! - `Transaction` - atomic patches with position mapping
//! - `Editor` - host pipeline running key handlers and change observers
//! - Outline numbering, numbered heading interaction, multi-column layout,
//!   drag guideline geometry and stable node ids on top of those

pub mod actions;
pub mod columns;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod guideline;
pub mod heading;
pub mod i18n;
pub mod input_rules;
pub mod node;
pub mod numbering;
pub mod pipeline;
pub mod platform;
pub mod schema;
pub mod transform;
pub mod types;
pub mod unique_id;

pub use actions::{Key, KeyAction, KeyCombo, KeyOutcome, Modifiers};
pub use columns::{
    CleanupAction, ColumnCleanup, ColumnValidation, ColumnsError, ResizeDrag, WidthChange,
    can_create_columns, drop_at_vertical_target, is_inside_column, recompute,
};
pub use config::EditorConfig;
pub use document::{Document, ResolvedPos};
pub use error::{PatchError, SchemaError};
pub use guideline::{
    DragGuidelines, GuidelineState, HorizontalGuide, Side, VerticalGuide, VerticalMode,
};
pub use heading::HeadingController;
pub use node::{
    ColumnAttrs, ColumnsAttrs, ColumnsLayout, HeadingAttrs, Node, NodeId, NodeKind, NodeType,
};
pub use numbering::{NumberingMap, calculate};
pub use pipeline::{ChangeObserver, DispatchReport, Editor, EditorState, KeyHandler};
pub use platform::{LayoutQuery, PlatformError};
pub use smol_str::SmolStr;
pub use transform::{Origin, Step, Transaction};
pub use types::{Point, Rect, Selection};
pub use unique_id::{IdGenerator, RandomIdGenerator, UniqueIds};

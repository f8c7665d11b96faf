//! Browser DOM layer for the tessera editor.
//!
//! This crate provides layout queries and event glue on top of the DOM the
//! host renders. It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `layout`: `LayoutQuery` over elements tagged with `data-pos`/`data-size`
//! - `events`: keydown mapping, block drag and drop, column resize drags
//! - `overlay`: fixed-position guideline elements
//!
//! # Re-exports
//!
//! This crate re-exports `tessera-editor-core` for convenience, so consumers
//! only need to depend on `tessera-editor-browser`.

// Re-export core crate
pub use tessera_editor_core;
pub use tessera_editor_core::*;

pub mod events;
pub mod layout;
pub mod overlay;

pub use events::{DragController, ResizeController, handle_keydown, key_combo};
pub use layout::DomLayout;
pub use overlay::GuidelineOverlay;

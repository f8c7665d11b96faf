//! Browser event handling for the editor.
//!
//! Translates DOM keyboard, drag and pointer events into core calls. Each
//! controller owns the per-gesture state and leaves event listener wiring to
//! the host.

use wasm_bindgen::JsCast;
use tessera_editor_core::columns::set_column_widths;
use tessera_editor_core::commands::move_block;
use tessera_editor_core::config::ColumnsConfig;
use tessera_editor_core::guideline::DragSource;
use tessera_editor_core::{
    DragGuidelines, Editor, EditorConfig, GuidelineState, Key, KeyAction, KeyCombo, LayoutQuery,
    Modifiers, PlatformError, Point, ResizeDrag, drop_at_vertical_target,
};

use crate::layout::{DomLayout, tagged_pos};
use crate::overlay::GuidelineOverlay;

/// Attribute on the gap handle between two columns; the value is the index
/// of the column left of the gap.
pub const GAP_ATTR: &str = "data-column-gap";

fn patch_error(e: impl std::fmt::Display) -> PlatformError {
    PlatformError(format!("patch rejected: {e}"))
}

fn event_element(event: &web_sys::Event) -> Option<web_sys::Element> {
    event.target()?.dyn_into::<web_sys::Element>().ok()
}

// === Keyboard ===

/// Read the key combination from a keyboard event.
pub fn key_combo(event: &web_sys::KeyboardEvent) -> KeyCombo {
    KeyCombo::with_modifiers(
        Key::from_dom_key(&event.key()),
        Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        },
    )
}

/// Offer a keydown to the editor's key handlers.
///
/// Returns `true` and prevents the browser default when a handler took it.
/// Composition keystrokes always pass through.
pub fn handle_keydown(
    editor: &mut Editor,
    event: &web_sys::KeyboardEvent,
) -> Result<bool, PlatformError> {
    if event.is_composing() {
        return Ok(false);
    }
    let Some(action) = KeyAction::from_combo(&key_combo(event)) else {
        return Ok(false);
    };
    let handled = editor.handle_key(action).map_err(patch_error)?;
    if handled {
        event.prevent_default();
        tracing::trace!(target: "tessera::heading", ?action, "keydown handled");
    }
    Ok(handled)
}

// === Block drag and drop ===

/// Drives the guideline engine from native drag events.
pub struct DragController {
    layout: DomLayout,
    overlay: GuidelineOverlay,
    guidelines: DragGuidelines,
    columns: ColumnsConfig,
}

impl DragController {
    pub fn new(editor_id: impl Into<String>, config: &EditorConfig) -> Self {
        let layout = DomLayout::new(editor_id);
        let overlay = GuidelineOverlay::new(layout.editor_id());
        Self {
            layout,
            overlay,
            guidelines: DragGuidelines::new(config.guideline.clone()),
            columns: config.columns.clone(),
        }
    }

    pub fn layout(&self) -> &DomLayout {
        &self.layout
    }

    /// `dragstart` on a block. Returns the dragged block, if the target is one.
    pub fn drag_start(&mut self, editor: &Editor, event: &web_sys::DragEvent) -> Option<DragSource> {
        let pos = event_element(event).and_then(|el| tagged_pos(&el))?;
        let source = self.guidelines.start(editor.doc(), pos)?;
        if let Some(transfer) = event.data_transfer() {
            // Firefox refuses to start a drag without data.
            if let Err(err) = transfer.set_data("text/plain", &pos.to_string()) {
                tracing::debug!(target: "tessera::guideline", ?err, "drag data not set");
            }
            transfer.set_effect_allowed("move");
        }
        Some(source)
    }

    /// `dragover`: recompute and draw the guides.
    pub fn drag_over(
        &mut self,
        editor: &Editor,
        event: &web_sys::DragEvent,
    ) -> Result<GuidelineState, PlatformError> {
        if !self.guidelines.is_dragging() {
            return Ok(GuidelineState::default());
        }
        event.prevent_default();
        let point = Point::new(event.client_x() as f64, event.client_y() as f64);
        let state = self.guidelines.pointer_move(editor.doc(), &self.layout, point);
        self.overlay.render(&state)?;
        Ok(state)
    }

    /// `drop`: turn the final guides into a document change.
    ///
    /// A visible vertical guide wins; otherwise the block moves to the
    /// horizontal guide. Returns whether the document changed.
    pub fn drop(&mut self, editor: &mut Editor, event: &web_sys::DragEvent) -> Result<bool, PlatformError> {
        let Some((source, state)) = self.guidelines.finish() else {
            return Ok(false);
        };
        event.prevent_default();
        self.overlay.clear()?;

        let tr = if state.vertical.is_visible() {
            match drop_at_vertical_target(editor.doc(), &state.vertical, source.pos, &self.columns) {
                Ok(tr) => Some(tr),
                Err(err) => {
                    tracing::debug!(target: "tessera::columns", %err, "vertical drop rejected");
                    return Ok(false);
                }
            }
        } else if let Some(guide) = state.horizontal {
            move_block(editor.doc(), source.pos, guide.pos).map_err(patch_error)?
        } else {
            None
        };

        match tr {
            Some(tr) => {
                editor.dispatch(tr).map_err(patch_error)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// `dragend` or `dragleave` of the editor: drop the gesture.
    pub fn cancel(&mut self) -> Result<(), PlatformError> {
        self.guidelines.cancel();
        self.overlay.clear()
    }
}

// === Column resizing ===

/// Drives a column gap drag from pointer events.
pub struct ResizeController {
    layout: DomLayout,
    config: ColumnsConfig,
    drag: Option<ResizeDrag>,
}

impl ResizeController {
    pub fn new(editor_id: impl Into<String>, config: &EditorConfig) -> Self {
        Self {
            layout: DomLayout::new(editor_id),
            config: config.columns.clone(),
            drag: None,
        }
    }

    pub fn is_resizing(&self) -> bool {
        self.drag.is_some()
    }

    /// `pointerdown` on a gap handle starts a resize.
    pub fn pointer_down(&mut self, editor: &Editor, event: &web_sys::PointerEvent) -> bool {
        let Some(handle) = event_element(event)
            .and_then(|el| el.closest(&format!("[{GAP_ATTR}]")).ok().flatten())
        else {
            return false;
        };
        let Some(left) = handle.get_attribute(GAP_ATTR).and_then(|v| v.parse().ok()) else {
            return false;
        };
        let Some(container_pos) = tagged_pos(&handle) else {
            return false;
        };
        let Some(container_px) = self.layout.node_rect(container_pos).map(|r| r.width()) else {
            return false;
        };

        match ResizeDrag::start(
            editor.doc(),
            container_pos,
            left,
            event.client_x() as f64,
            container_px,
            &self.config,
        ) {
            Ok(drag) => {
                if let Err(err) = handle.set_pointer_capture(event.pointer_id()) {
                    tracing::debug!(target: "tessera::columns", ?err, "pointer capture refused");
                }
                event.prevent_default();
                self.drag = Some(drag);
                true
            }
            Err(err) => {
                tracing::debug!(target: "tessera::columns", %err, "resize not started");
                false
            }
        }
    }

    /// `pointermove`: preview the new widths on the column elements.
    pub fn pointer_move(&mut self, editor: &Editor, event: &web_sys::PointerEvent) -> Result<(), PlatformError> {
        let Some(drag) = self.drag.as_mut() else {
            return Ok(());
        };
        if drag.update(event.client_x() as f64) {
            preview_widths(&self.layout, editor, drag.container_pos(), drag.widths())?;
        }
        Ok(())
    }

    /// `pointerup`: commit the widths.
    pub fn pointer_up(&mut self, editor: &mut Editor) -> Result<bool, PlatformError> {
        let Some(drag) = self.drag.take() else {
            return Ok(false);
        };
        match drag.finish(editor.doc(), &self.config) {
            Ok(Some(tr)) => {
                editor.dispatch(tr).map_err(patch_error)?;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(err) => Err(PlatformError(err.message())),
        }
    }

    /// `pointercancel`: restore the committed widths.
    pub fn cancel(&mut self, editor: &Editor) -> Result<(), PlatformError> {
        let Some(drag) = self.drag.take() else {
            return Ok(());
        };
        let pos = drag.container_pos();
        let committed = editor
            .doc()
            .node_at(pos)
            .and_then(|n| n.columns_attrs())
            .map(|a| a.column_widths.clone());
        match committed {
            Some(widths) => preview_widths(&self.layout, editor, pos, &widths),
            None => Ok(()),
        }
    }
}

/// Set `flex-basis` on each column element of the container at `container_pos`.
fn preview_widths(
    layout: &DomLayout,
    editor: &Editor,
    container_pos: usize,
    widths: &[f64],
) -> Result<(), PlatformError> {
    let container = editor
        .doc()
        .node_at(container_pos)
        .ok_or_else(|| PlatformError(format!("no container at {container_pos}")))?;
    for (index, width) in widths.iter().enumerate().take(container.child_count()) {
        let pos = container_pos + 1 + container.child_offset(index);
        let Some(element) = layout
            .element_at(pos)
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            continue;
        };
        element
            .style()
            .set_property("flex-basis", &format!("{width}%"))
            .map_err(|e| format!("set_property flex-basis failed: {:?}", e))?;
    }
    Ok(())
}

/// Validate widths typed into a form control before committing them.
pub fn commit_widths(
    editor: &mut Editor,
    container_pos: usize,
    widths: &[f64],
    config: &ColumnsConfig,
) -> Result<(), PlatformError> {
    let tr = set_column_widths(editor.doc(), container_pos, widths, config)
        .map_err(|e| PlatformError(e.message()))?;
    editor.dispatch(tr).map_err(patch_error)?;
    Ok(())
}

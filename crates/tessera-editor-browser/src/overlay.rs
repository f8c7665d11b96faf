//! Guideline overlay.
//!
//! Two fixed-position divs appended to the document body, one per guide.
//! Guide rectangles are in viewport coordinates, so `position: fixed` needs
//! no offset math.

use wasm_bindgen::JsCast;
use tessera_editor_core::{GuidelineState, PlatformError, Rect, VerticalMode};

pub const HORIZONTAL_CLASS: &str = "tessera-guideline-horizontal";
pub const VERTICAL_CLASS: &str = "tessera-guideline-vertical";

/// Draws guideline state for one editor.
pub struct GuidelineOverlay {
    horizontal_id: String,
    vertical_id: String,
}

impl GuidelineOverlay {
    pub fn new(editor_id: &str) -> Self {
        Self {
            horizontal_id: format!("{editor_id}-guide-h"),
            vertical_id: format!("{editor_id}-guide-v"),
        }
    }

    /// Show or hide both guides to match `state`.
    pub fn render(&self, state: &GuidelineState) -> Result<(), PlatformError> {
        let horizontal = self.line(&self.horizontal_id, HORIZONTAL_CLASS)?;
        match &state.horizontal {
            Some(guide) => show(&horizontal, guide.rect, None)?,
            None => hide(&horizontal)?,
        }

        let vertical = self.line(&self.vertical_id, VERTICAL_CLASS)?;
        match state.vertical.rect {
            Some(rect) if state.vertical.is_visible() => {
                let mode = match state.vertical.mode {
                    VerticalMode::ColumnsEdge => "columns-edge",
                    _ => "editor-border",
                };
                show(&vertical, rect, Some(mode))?
            }
            _ => hide(&vertical)?,
        }
        Ok(())
    }

    /// Hide both guides.
    pub fn clear(&self) -> Result<(), PlatformError> {
        self.render(&GuidelineState::default())
    }

    /// Remove the overlay elements from the page.
    pub fn remove(&self) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        for id in [&self.horizontal_id, &self.vertical_id] {
            if let Some(element) = document.get_element_by_id(id) {
                element.remove();
            }
        }
    }

    fn line(&self, id: &str, class: &str) -> Result<web_sys::HtmlElement, PlatformError> {
        let document = web_sys::window()
            .ok_or("no window")?
            .document()
            .ok_or("no document")?;

        if let Some(existing) = document.get_element_by_id(id) {
            return existing
                .dyn_into::<web_sys::HtmlElement>()
                .map_err(|_| PlatformError::from("overlay element is not an HtmlElement"));
        }

        let element = document
            .create_element("div")
            .map_err(|e| format!("create_element failed: {:?}", e))?;
        element.set_id(id);
        element.set_class_name(class);
        let element = element
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| PlatformError::from("div is not an HtmlElement"))?;
        let style = element.style();
        for (name, value) in [
            ("position", "fixed"),
            ("pointer-events", "none"),
            ("z-index", "1000"),
            ("display", "none"),
        ] {
            style
                .set_property(name, value)
                .map_err(|e| format!("set_property {name} failed: {:?}", e))?;
        }

        let body = document.body().ok_or("no body")?;
        body.append_child(&element)
            .map_err(|e| format!("append_child failed: {:?}", e))?;
        tracing::trace!(target: "tessera::guideline", id, "overlay element created");
        Ok(element)
    }
}

fn show(element: &web_sys::HtmlElement, rect: Rect, mode: Option<&str>) -> Result<(), PlatformError> {
    let style = element.style();
    for (name, value) in [
        ("display", "block".to_string()),
        ("left", format!("{}px", rect.left)),
        ("top", format!("{}px", rect.top)),
        ("width", format!("{}px", rect.width())),
        ("height", format!("{}px", rect.height())),
    ] {
        style
            .set_property(name, &value)
            .map_err(|e| format!("set_property {name} failed: {:?}", e))?;
    }
    if let Some(mode) = mode {
        element
            .set_attribute("data-mode", mode)
            .map_err(|e| format!("set_attribute failed: {:?}", e))?;
    }
    Ok(())
}

fn hide(element: &web_sys::HtmlElement) -> Result<(), PlatformError> {
    element
        .style()
        .set_property("display", "none")
        .map_err(|e| format!("set_property display failed: {:?}", e).into())
}

//! Browser implementation of layout queries.
//!
//! The renderer tags every block element with `data-pos` (the position the
//! node starts at) and `data-size` (its node size). Queries go through those
//! attributes and `getBoundingClientRect`, so all rectangles are in viewport
//! coordinates.

use wasm_bindgen::JsCast;
use tessera_editor_core::{LayoutQuery, PlatformError, Point, Rect};

pub const POS_ATTR: &str = "data-pos";
pub const SIZE_ATTR: &str = "data-size";

/// DOM-backed layout for the editor element with the given id.
pub struct DomLayout {
    editor_id: String,
}

impl DomLayout {
    /// Create a layout reader for the given editor element.
    pub fn new(editor_id: impl Into<String>) -> Self {
        Self {
            editor_id: editor_id.into(),
        }
    }

    /// Get the editor element ID.
    pub fn editor_id(&self) -> &str {
        &self.editor_id
    }

    fn document(&self) -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn editor(&self) -> Option<web_sys::Element> {
        self.document()?.get_element_by_id(&self.editor_id)
    }

    /// Element rendered for the node starting at `pos`.
    pub fn element_at(&self, pos: usize) -> Option<web_sys::Element> {
        let selector = format!("[{POS_ATTR}='{pos}']");
        self.editor()?.query_selector(&selector).ok().flatten()
    }

    /// Innermost tagged element whose node covers `pos`, with its start and size.
    fn element_covering(&self, pos: usize) -> Option<(web_sys::Element, usize, usize)> {
        let editor = self.editor()?;
        let nodes = editor.query_selector_all(&format!("[{POS_ATTR}]")).ok()?;
        let mut best: Option<(web_sys::Element, usize, usize)> = None;
        for i in 0..nodes.length() {
            let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok())
            else {
                continue;
            };
            let Some((start, size)) = tagged_range(&element) else {
                continue;
            };
            if pos < start || pos > start + size {
                continue;
            }
            if best.as_ref().is_none_or(|(_, _, s)| size < *s) {
                best = Some((element, start, size));
            }
        }
        best
    }
}

/// `(data-pos, data-size)` of a tagged element.
pub fn tagged_range(element: &web_sys::Element) -> Option<(usize, usize)> {
    let start = element.get_attribute(POS_ATTR)?.parse().ok()?;
    let size = element
        .get_attribute(SIZE_ATTR)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    Some((start, size))
}

/// Position of the nearest tagged ancestor of `target` (inclusive).
pub fn tagged_pos(target: &web_sys::Element) -> Option<usize> {
    let element = target.closest(&format!("[{POS_ATTR}]")).ok().flatten()?;
    tagged_range(&element).map(|(start, _)| start)
}

fn to_rect(dom: &web_sys::DomRect) -> Rect {
    Rect::new(dom.left(), dom.top(), dom.right(), dom.bottom())
}

impl LayoutQuery for DomLayout {
    fn node_rect(&self, pos: usize) -> Option<Rect> {
        let element = self.element_at(pos)?;
        Some(to_rect(&element.get_bounding_client_rect()))
    }

    fn coords_at_pos(&self, pos: usize) -> Option<Rect> {
        let (element, start, size) = self.element_covering(pos)?;
        let outer = to_rect(&element.get_bounding_client_rect());
        if pos == start {
            return Some(Rect::new(outer.left, outer.top, outer.left, outer.top));
        }
        if pos == start + size {
            return Some(Rect::new(outer.left, outer.bottom, outer.left, outer.bottom));
        }

        // Inside the content: measure a collapsed range at the text offset.
        let html = element.dyn_into::<web_sys::HtmlElement>().ok()?;
        let offset = pos - start - 1;
        let (node, node_offset) = find_text_node_at_offset(&html, offset).ok()?;
        let range = self.document()?.create_range().ok()?;
        range.set_start(&node, node_offset as u32).ok()?;
        range.collapse_with_to_start(true);
        Some(to_rect(&range.get_bounding_client_rect()))
    }

    fn pos_at_coords(&self, point: Point) -> Option<usize> {
        let target = self
            .document()?
            .element_from_point(point.x as f32, point.y as f32)?;
        let editor = self.editor()?;
        let node: &web_sys::Node = &target;
        if !editor.contains(Some(node)) {
            return None;
        }
        // Start of the innermost block's content.
        tagged_pos(&target).map(|pos| pos + 1)
    }

    fn editor_rect(&self) -> Option<Rect> {
        Some(to_rect(&self.editor()?.get_bounding_client_rect()))
    }
}

/// Find the text node holding the `char_offset`-th character of `container`.
///
/// Offsets count chars like document positions do; the returned offset is in
/// UTF-16 units as the DOM expects.
pub fn find_text_node_at_offset(
    container: &web_sys::HtmlElement,
    char_offset: usize,
) -> Result<(web_sys::Node, usize), PlatformError> {
    let document = web_sys::window()
        .ok_or("no window")?
        .document()
        .ok_or("no document")?;

    let walker = document
        .create_tree_walker_with_what_to_show(container, 0x4)
        .map_err(|e| format!("create_tree_walker failed: {:?}", e))?;

    let mut accumulated = 0;
    let mut last_node: Option<web_sys::Node> = None;
    while let Ok(Some(node)) = walker.next_node() {
        last_node = Some(node.clone());
        let Some(text) = node.text_content() else {
            continue;
        };
        let len = text.chars().count();
        if accumulated + len >= char_offset {
            let utf16: usize = text
                .chars()
                .take(char_offset - accumulated)
                .map(char::len_utf16)
                .sum();
            return Ok((node, utf16));
        }
        accumulated += len;
    }

    if let Some(node) = last_node {
        if let Some(text) = node.text_content() {
            return Ok((node, text.encode_utf16().count()));
        }
    }

    Err("no text node found in container".into())
}

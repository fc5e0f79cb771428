//! Pointer handling for read-only text surfaces
//!
//! Some surfaces (read-only textareas) render plain text that cannot hold a
//! link element. For those the linker keeps the text untouched and answers
//! pointer events instead: a click inside a reference navigates to it, hovering
//! one switches the cursor.
//!
//! Coordinate-to-offset mapping is a monospace estimate. It is reliable for
//! points well inside or well outside a reference, not at pixel edges.

use serde::{Deserialize, Serialize};

use crate::linker::pattern::{find_matches, LinkDescriptor, RefMatch};

pub const HOVER_CURSOR: &str = "pointer";
pub const DEFAULT_CURSOR: &str = "text";
pub const HOVER_TITLE: &str = "Click to open in GitHub";

/// Character width as a fraction of the font size for monospace faces
const CHAR_WIDTH_RATIO: f64 = 0.6;
/// Line height as a multiple of the font size when the surface reports none
const LINE_HEIGHT_RATIO: f64 = 1.2;

// =============================================================================
// Offset lookup
// =============================================================================

/// The reference containing byte `offset`, end inclusive
pub fn match_at(text: &str, offset: usize) -> Option<RefMatch> {
    find_matches(text).into_iter().find(|m| m.contains_offset(offset))
}

/// Convert a UTF-16 code unit offset (what the DOM reports) into a byte offset
pub fn utf16_to_byte_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        if units >= utf16_offset {
            return byte;
        }
        units += ch.len_utf16();
    }
    text.len()
}

pub fn byte_to_utf16_offset(text: &str, byte_offset: usize) -> usize {
    text.char_indices()
        .take_while(|(byte, _)| *byte < byte_offset)
        .map(|(_, ch)| ch.len_utf16())
        .sum()
}

// =============================================================================
// Coordinate estimation
// =============================================================================

/// Geometry of a text surface, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMetrics {
    /// Left edge of the surface's bounding box
    pub left: f64,
    /// Top edge of the surface's bounding box
    pub top: f64,
    pub padding_left: f64,
    pub padding_top: f64,
    pub scroll_top: f64,
    pub font_size: f64,
    /// Computed line height; `None` when the surface reports `normal`
    pub line_height: Option<f64>,
}

impl Default for SurfaceMetrics {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            padding_left: 0.0,
            padding_top: 0.0,
            scroll_top: 0.0,
            font_size: 16.0,
            line_height: None,
        }
    }
}

impl SurfaceMetrics {
    pub fn char_width(&self) -> f64 {
        self.font_size * CHAR_WIDTH_RATIO
    }

    pub fn effective_line_height(&self) -> f64 {
        self.line_height
            .filter(|h| *h > 0.0)
            .unwrap_or(self.font_size * LINE_HEIGHT_RATIO)
    }
}

/// Estimate the byte offset under the pointer at client coordinates `(x, y)`.
///
/// Points left of or above the text clamp to its first line/column; points
/// past the end of a line clamp to that line's end.
pub fn estimate_offset(text: &str, metrics: &SurfaceMetrics, x: f64, y: f64) -> usize {
    let char_width = metrics.char_width();
    let line_height = metrics.effective_line_height();
    if char_width <= 0.0 || line_height <= 0.0 {
        return 0;
    }

    let relative_x = x - metrics.left - metrics.padding_left;
    let relative_y = y - metrics.top - metrics.padding_top + metrics.scroll_top;
    let line = (relative_y / line_height).floor().max(0.0) as usize;
    let column = (relative_x / char_width).floor().max(0.0) as usize;

    let mut offset = 0;
    for (index, content) in text.split('\n').enumerate() {
        if index == line {
            let within = content
                .char_indices()
                .nth(column)
                .map(|(byte, _)| byte)
                .unwrap_or(content.len());
            return offset + within;
        }
        offset += content.len() + 1;
    }
    text.len()
}

// =============================================================================
// Surface state
// =============================================================================

/// Cursor and tooltip a host should display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    pub cursor: String,
    pub title: String,
}

/// Pointer state for one read-only surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerSurface {
    original_cursor: String,
}

impl Default for PointerSurface {
    fn default() -> Self {
        Self::new("")
    }
}

impl PointerSurface {
    /// `original_cursor` is the surface's inline cursor style; empty means `text`
    pub fn new(original_cursor: &str) -> Self {
        let original_cursor = if original_cursor.is_empty() {
            DEFAULT_CURSOR.to_string()
        } else {
            original_cursor.to_string()
        };
        Self { original_cursor }
    }

    pub fn original_cursor(&self) -> &str {
        &self.original_cursor
    }

    /// Link to open for a click at byte `offset`; `Some` also means the
    /// default activation must be suppressed
    pub fn on_click(&self, text: &str, offset: usize) -> Option<LinkDescriptor> {
        match_at(text, offset).map(|m| LinkDescriptor::for_match(&m))
    }

    pub fn on_hover(&self, text: &str, offset: usize) -> CursorState {
        if match_at(text, offset).is_some() {
            CursorState {
                cursor: HOVER_CURSOR.to_string(),
                title: HOVER_TITLE.to_string(),
            }
        } else {
            self.on_leave()
        }
    }

    pub fn on_leave(&self) -> CursorState {
        CursorState {
            cursor: self.original_cursor.clone(),
            title: String::new(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

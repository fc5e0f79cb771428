//! Read-only textarea handling
//!
//! A textarea cannot hold link elements, so its text is left alone. Clicks
//! use the caret position the browser already computed; hovering has only
//! pointer coordinates, which go through the monospace estimate.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlTextAreaElement, MouseEvent};

use crate::config::LINK_TARGET;
use crate::linker::pointer::{estimate_offset, utf16_to_byte_offset, CursorState, PointerSurface, SurfaceMetrics};
use crate::web::log;

/// Parse a computed CSS length such as `"13.5px"`; `normal` and friends give `None`
pub fn parse_px(value: &str) -> Option<f64> {
    value
        .trim()
        .trim_end_matches("px")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn metrics(textarea: &HtmlTextAreaElement) -> Option<SurfaceMetrics> {
    let style = web_sys::window()?.get_computed_style(textarea).ok().flatten()?;
    let px = |name: &str| style.get_property_value(name).ok().and_then(|v| parse_px(&v));
    let rect = textarea.get_bounding_client_rect();

    Some(SurfaceMetrics {
        left: rect.left(),
        top: rect.top(),
        padding_left: px("padding-left").unwrap_or(0.0),
        padding_top: px("padding-top").unwrap_or(0.0),
        scroll_top: f64::from(textarea.scroll_top()),
        font_size: px("font-size").unwrap_or(SurfaceMetrics::default().font_size),
        line_height: px("line-height"),
    })
}

fn show(textarea: &HtmlTextAreaElement, state: &CursorState) {
    let _ = textarea.style().set_property("cursor", &state.cursor);
    textarea.set_title(&state.title);
}

fn open(url: &str) {
    log(&format!("Opening: {}", url));
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.open_with_url_and_target(url, LINK_TARGET) {
            log(&format!("open failed: {:?}", err));
        }
    }
}

/// Install click, hover and leave handlers on `textarea`.
pub fn attach(textarea: &HtmlTextAreaElement) -> Result<(), JsValue> {
    let original = textarea.style().get_property_value("cursor").unwrap_or_default();
    let surface = Rc::new(PointerSurface::new(&original));

    let on_click = {
        let surface = Rc::clone(&surface);
        let target = textarea.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let text = target.value();
            let caret = target.selection_start().ok().flatten().unwrap_or(0) as usize;
            if let Some(link) = surface.on_click(&text, utf16_to_byte_offset(&text, caret)) {
                event.prevent_default();
                open(&link.destination);
            }
        })
    };

    let on_move = {
        let surface = Rc::clone(&surface);
        let target = textarea.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let text = target.value();
            let offset = metrics(&target)
                .map(|m| estimate_offset(&text, &m, f64::from(event.client_x()), f64::from(event.client_y())));
            let state = match offset {
                Some(offset) => surface.on_hover(&text, offset),
                None => surface.on_leave(),
            };
            show(&target, &state);
        })
    };

    let on_leave = {
        let target = textarea.clone();
        Closure::<dyn FnMut()>::new(move || show(&target, &surface.on_leave()))
    };

    textarea.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    textarea.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
    textarea.add_event_listener_with_callback("mouseleave", on_leave.as_ref().unchecked_ref())?;

    // Handlers live as long as the page.
    on_click.forget();
    on_move.forget();
    on_leave.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("13px"), Some(13.0));
        assert_eq!(parse_px(" 19.5px "), Some(19.5));
        assert_eq!(parse_px("0"), Some(0.0));
        assert_eq!(parse_px("normal"), None);
        assert_eq!(parse_px(""), None);
    }
}

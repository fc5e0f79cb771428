//! Browser host
//!
//! - `dom.rs` - `DomTree`: [`TextTree`](crate::tree::TextTree) over `web_sys::Node`
//! - `observer.rs` - first pass over `document.body` plus the mutation observer
//! - `surface.rs` - pointer handling for read-only textareas
//! - `bindings.rs` - `RefScanner` and `linkDocument` JS exports
//!
//! Everything here compiles on every target; only the wasm32 build is ever
//! handed a live document.

pub mod bindings;
pub mod dom;
pub mod observer;
pub mod surface;

pub use dom::DomTree;

use wasm_bindgen::JsValue;

/// Console line with the component prefix; silent off wasm32
pub(crate) fn log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&JsValue::from_str(&format!("[RefLinker] {}", message)));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

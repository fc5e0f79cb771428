//! RefLinker: fragment-aware `org/repo[/path]@ref` linker
//!
//! Finds repository references in rendered page text and turns them into
//! links, including references that syntax highlighting has split across
//! several sibling and nested elements.
//!
//! # Architecture
//!
//! ## Engine (`linker/`)
//! - `pattern.rs` - Pattern matcher and destination derivation
//! - `fragment.rs` - Fragment indexer: logical text over many text units
//! - `resolver.rs` - Span resolver: match span to per-fragment actions
//! - `surgeon.rs` - Tree surgeon: the only code that mutates the tree
//! - `classify.rs` - Classification policy (skip, container, recurse, surface)
//! - `engine.rs` - `Linker`: the classification-driven walk
//! - `pointer.rs` - Click/hover contract for read-only text surfaces
//!
//! ## Hosts (`tree/`, `web/`)
//! - `tree/arena.rs` - In-memory tree for native use and tests
//! - `web/dom.rs` - Live browser DOM
//!
//! # Usage (native)
//! ```
//! use reflinker::linker::Linker;
//! use reflinker::tree::ArenaTree;
//!
//! let mut tree = ArenaTree::new();
//! let root = tree.root();
//! let line = tree.append_element(root, "td", &["blob-code-inner"]);
//! tree.append_text(line, "uses: acme/");
//! let span = tree.append_element(line, "span", &["pl-s"]);
//! tree.append_text(span, "checkout@v4");
//!
//! let report = Linker::new().process(&mut tree, &root);
//! assert_eq!(report.links_inserted, 1);
//! assert_eq!(tree.links(root)[0].href, "https://github.com/acme/checkout/tree/v4");
//! ```

pub mod config;
pub mod error;
pub mod linker;
pub mod tree;
pub mod web;

pub use config::LinkerConfig;
pub use error::LinkError;
pub use linker::{Linker, LinkerStats};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Install the panic hook and link the page once the document is ready
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    if let Err(err) = web::observer::boot(LinkerConfig::default()) {
        web_sys::console::error_1(&err);
    }
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("reflinker v{}", env!("CARGO_PKG_VERSION"))
}

//! JS exports
//!
//! ```javascript,ignore
//! import init, { RefScanner, linkDocument } from 'reflinker';
//!
//! await init();                       // links the page and starts observing
//!
//! const scanner = new RefScanner();
//! scanner.scan("uses: acme/widgets@v2");
//! // [{ fullText: "acme/widgets@v2", organization: "acme", ..., start: 6, end: 21 }]
//! scanner.matchAt(text, textarea.selectionStart);
//! ```
//!
//! Offsets crossing this boundary are UTF-16 code units, as JS strings count them.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::config::LinkerConfig;
use crate::linker::pattern::{destination_url, find_matches, RefMatch};
use crate::linker::pointer::{byte_to_utf16_offset, match_at, utf16_to_byte_offset};
use crate::linker::Linker;
use crate::web::{dom::DomTree, js_error, observer};

/// A match as JS sees it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JsRefMatch {
    pub full_text: String,
    pub organization: String,
    pub repository: String,
    pub path: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub destination: String,
    /// UTF-16 offsets
    pub start: usize,
    pub end: usize,
}

impl JsRefMatch {
    fn from_match(text: &str, m: &RefMatch) -> Self {
        Self {
            full_text: m.full_text.clone(),
            organization: m.organization().to_string(),
            repository: m.repository().to_string(),
            path: m.path().map(str::to_string),
            git_ref: m.git_ref().to_string(),
            destination: destination_url(m.organization(), m.repository(), m.path(), m.git_ref()),
            start: byte_to_utf16_offset(text, m.start),
            end: byte_to_utf16_offset(text, m.end),
        }
    }
}

fn config_from(value: JsValue) -> Result<LinkerConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(LinkerConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(js_error)
}

// =============================================================================
// RefScanner
// =============================================================================

#[wasm_bindgen]
pub struct RefScanner {
    linker: Linker,
}

#[wasm_bindgen]
impl RefScanner {
    /// `config` is optional; missing fields keep their defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<RefScanner, JsValue> {
        Ok(Self {
            linker: Linker::with_config(config_from(config)?),
        })
    }

    /// Every reference in `text`
    #[wasm_bindgen]
    pub fn scan(&self, text: &str) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.scan_text(text)).map_err(js_error)
    }

    /// Reference under a caret at UTF-16 `offset` (end inclusive), or `null`
    #[wasm_bindgen(js_name = matchAt)]
    pub fn match_at(&self, text: &str, offset: usize) -> Result<JsValue, JsValue> {
        match self.match_at_utf16(text, offset) {
            Some(m) => serde_wasm_bindgen::to_value(&m).map_err(js_error),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen]
    pub fn destination(&self, organization: &str, repository: &str, path: Option<String>, git_ref: &str) -> String {
        destination_url(organization, repository, path.as_deref(), git_ref)
    }

    /// Link every reference under `element`; returns the number of links inserted
    #[wasm_bindgen(js_name = linkElement)]
    pub fn link_element(&mut self, element: Element) -> Result<usize, JsValue> {
        let document = element
            .owner_document()
            .ok_or_else(|| JsValue::from_str("element has no document"))?;
        let mut tree = DomTree::new(document);
        let report = self.linker.process(&mut tree, &element.into());
        Ok(report.links_inserted)
    }

    #[wasm_bindgen]
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.linker.stats()).map_err(js_error)
    }
}

// Native API
impl RefScanner {
    pub fn with_config(config: LinkerConfig) -> Self {
        Self {
            linker: Linker::with_config(config),
        }
    }

    pub fn scan_text(&self, text: &str) -> Vec<JsRefMatch> {
        find_matches(text)
            .iter()
            .map(|m| JsRefMatch::from_match(text, m))
            .collect()
    }

    pub fn match_at_utf16(&self, text: &str, offset: usize) -> Option<JsRefMatch> {
        match_at(text, utf16_to_byte_offset(text, offset)).map(|m| JsRefMatch::from_match(text, &m))
    }
}

/// Link the current document and keep it linked; later calls do nothing.
#[wasm_bindgen(js_name = linkDocument)]
pub fn link_document(config: JsValue) -> Result<(), JsValue> {
    observer::start(config_from(config)?)
}

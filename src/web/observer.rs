//! Startup and live-update wiring
//!
//! One [`Session`] per page: the first pass links `document.body`, then a
//! `MutationObserver` feeds every batch of added nodes back through the same
//! linker. Read-only surfaces found by either pass get pointer handlers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlTextAreaElement, MutationObserver, MutationObserverInit, MutationRecord, Node};

use crate::config::LinkerConfig;
use crate::linker::Linker;
use crate::web::{dom::DomTree, log, surface};

/// Delay before looking for `document.body` again
const BODY_RETRY_MS: i32 = 100;

thread_local! {
    static STARTED: Cell<bool> = const { Cell::new(false) };
}

struct Session {
    tree: DomTree,
    linker: Linker,
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Start when the document is ready, or as soon as it becomes ready.
pub fn boot(config: LinkerConfig) -> Result<(), JsValue> {
    let document = document()?;
    if document.ready_state() != "loading" {
        return start(config);
    }

    let on_ready = Closure::once_into_js(move || {
        if let Err(err) = start(config) {
            log(&format!("startup failed: {:?}", err));
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
}

/// Link the body once and install the observer. Later calls are no-ops.
pub fn start(config: LinkerConfig) -> Result<(), JsValue> {
    if STARTED.with(|s| s.get()) {
        return Ok(());
    }
    let document = document()?;
    let Some(body) = document.body() else {
        let retry = Closure::once_into_js(move || {
            if let Err(err) = start(config) {
                log(&format!("startup failed: {:?}", err));
            }
        });
        web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))?
            .set_timeout_with_callback_and_timeout_and_arguments_0(retry.unchecked_ref(), BODY_RETRY_MS)?;
        return Ok(());
    };
    STARTED.with(|s| s.set(true));

    let body: Node = body.into();
    let session = Rc::new(RefCell::new(Session {
        tree: DomTree::new(document),
        linker: Linker::with_config(config),
    }));

    {
        let mut guard = session.borrow_mut();
        let Session { tree, linker } = &mut *guard;
        let report = linker.process(tree, &body);
        attach_surfaces(&report.surfaces);
        log(&format!(
            "{} links, {} read-only surfaces ({}us)",
            report.links_inserted,
            report.surfaces.len(),
            linker.stats().elapsed_us
        ));
    }

    observe(session, body)
}

fn observe(session: Rc<RefCell<Session>>, body: Node) -> Result<(), JsValue> {
    let root = body.clone();
    let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        move |records: js_sys::Array, _observer: MutationObserver| {
            let added: Vec<Node> = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .flat_map(|record| {
                    let nodes = record.added_nodes();
                    (0..nodes.length()).filter_map(move |i| nodes.item(i))
                })
                .collect();
            if added.is_empty() {
                return;
            }

            let Ok(mut guard) = session.try_borrow_mut() else {
                return;
            };
            let Session { tree, linker } = &mut *guard;
            let report = linker.process_added(tree, &root, added);
            attach_surfaces(&report.surfaces);
        },
    );

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(&body, &options)?;

    // The observer and its callback live as long as the page.
    callback.forget();
    Ok(())
}

fn attach_surfaces(surfaces: &[Node]) {
    for node in surfaces {
        if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
            if let Err(err) = surface::attach(textarea) {
                log(&format!("textarea handler failed: {:?}", err));
            }
        }
    }
}

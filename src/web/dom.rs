//! DomTree - the live browser document as a [`TextTree`]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlAnchorElement, HtmlElement, HtmlTextAreaElement, Node};

use crate::config::{LinkAttributes, PROCESSED_MARKER};
use crate::error::LinkError;
use crate::linker::pattern::LinkDescriptor;
use crate::tree::{ElementInfo, NodeKind, TextTree};

pub struct DomTree {
    document: Document,
}

impl DomTree {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn host(err: JsValue) -> LinkError {
    LinkError::Host(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

fn class_names(element: &Element) -> Vec<String> {
    let list = element.class_list();
    (0..list.length()).filter_map(|i| list.item(i)).collect()
}

fn is_read_only(element: &Element) -> bool {
    let native = element
        .dyn_ref::<HtmlTextAreaElement>()
        .map(|t| t.read_only())
        .unwrap_or(false);
    native || element.get_attribute("aria-readonly").as_deref() == Some("true")
}

impl TextTree for DomTree {
    type Node = Node;

    fn kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::TEXT_NODE => NodeKind::Text,
            Node::ELEMENT_NODE => NodeKind::Element,
            _ => NodeKind::Other,
        }
    }

    fn text(&self, node: &Node) -> Option<String> {
        match node.node_type() {
            Node::TEXT_NODE => Some(node.text_content().unwrap_or_default()),
            _ => None,
        }
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn element_info(&self, node: &Node) -> Option<ElementInfo> {
        let element = node.dyn_ref::<Element>()?;
        Some(ElementInfo {
            tag: element.tag_name().to_ascii_lowercase(),
            classes: class_names(element),
            editable: element
                .dyn_ref::<HtmlElement>()
                .map(|e| e.is_content_editable())
                .unwrap_or(false),
            read_only: is_read_only(element),
        })
    }

    fn create_text(&mut self, text: &str) -> Result<Node, LinkError> {
        Ok(self.document.create_text_node(text).into())
    }

    fn create_link(&mut self, link: &LinkDescriptor, attrs: &LinkAttributes) -> Result<Node, LinkError> {
        let anchor = self
            .document
            .create_element("a")
            .map_err(host)?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| LinkError::Host("created element is not an anchor".to_string()))?;
        anchor.set_href(&link.destination);
        anchor.set_target(&attrs.target);
        anchor.set_rel(&attrs.rel);
        anchor.set_attribute("style", &attrs.style).map_err(host)?;
        anchor.set_text_content(Some(&link.display_text));
        Ok(anchor.into())
    }

    fn insert_before(&mut self, parent: &Node, node: &Node, reference: &Node) -> Result<(), LinkError> {
        parent.insert_before(node, Some(reference)).map(|_| ()).map_err(host)
    }

    fn remove_child(&mut self, parent: &Node, child: &Node) -> Result<(), LinkError> {
        parent.remove_child(child).map(|_| ()).map_err(host)
    }

    fn is_processed(&self, node: &Node) -> bool {
        node.dyn_ref::<Element>()
            .map(|e| e.has_attribute(PROCESSED_MARKER))
            .unwrap_or(false)
    }

    fn mark_processed(&mut self, node: &Node) {
        if let Some(element) = node.dyn_ref::<Element>() {
            let _ = element.set_attribute(PROCESSED_MARKER, "true");
        }
    }

    fn is_within(&self, node: &Node, root: &Node) -> bool {
        root.contains(Some(node))
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::linker::Linker;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn fixture(html: &str) -> (DomTree, Node) {
        let document = web_sys::window().unwrap().document().unwrap();
        let host = document.create_element("div").unwrap();
        host.set_inner_html(html);
        document.body().unwrap().append_child(&host).unwrap();
        (DomTree::new(document), host.into())
    }

    #[wasm_bindgen_test]
    fn test_links_fragmented_diff_line() {
        let (mut tree, root) = fixture(
            r#"<span class="diff-text-inner">uses: <span class="pl-s">acme-org/</span><span>widgets@main</span></span>"#,
        );
        let report = Linker::new().process(&mut tree, &root);
        assert_eq!(report.links_inserted, 1);

        let element = root.dyn_ref::<Element>().unwrap();
        let anchor = element.query_selector("a").unwrap().unwrap();
        assert_eq!(anchor.text_content().unwrap(), "acme-org/widgets@main");
        assert_eq!(
            anchor.get_attribute("href").unwrap(),
            "https://github.com/acme-org/widgets/tree/main"
        );
        assert_eq!(root.text_content().unwrap(), "uses: acme-org/widgets@main");
    }

    #[wasm_bindgen_test]
    fn test_read_only_textarea_is_reported() {
        let (mut tree, root) = fixture(r#"<textarea readonly>acme/a@1</textarea><input value="acme/b@2">"#);
        let report = Linker::new().process(&mut tree, &root);
        assert_eq!(report.links_inserted, 0);
        assert_eq!(report.surfaces.len(), 1);
    }
}

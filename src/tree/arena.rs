//! ArenaTree: in-memory document for native hosts and tests
//!
//! Nodes live in a flat arena addressed by [`NodeId`]. Removing a node only
//! unlinks it from its parent, so stale handles stay valid (and detectably
//! detached) for the rest of a scan.

use std::fmt::Write as _;

use crate::config::LinkAttributes;
use crate::error::LinkError;
use crate::linker::pattern::LinkDescriptor;
use crate::tree::{ElementInfo, NodeKind, TextTree};

// =============================================================================
// Core Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum Content {
    Text(String),
    Element {
        info: ElementInfo,
        attributes: Vec<(String, String)>,
    },
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    content: Content,
    processed: bool,
}

/// A link as seen after processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaLink {
    pub text: String,
    pub href: String,
    pub target: String,
    pub rel: String,
}

/// Arena-backed document tree
#[derive(Debug, Clone)]
pub struct ArenaTree {
    nodes: Vec<NodeData>,
}

impl Default for ArenaTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaTree {
    /// Create a tree holding a single empty `body` element
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                content: Content::Element {
                    info: ElementInfo::new("body"),
                    attributes: Vec::new(),
                },
                processed: false,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    // -------------------------------------------------------------------------
    // Building
    // -------------------------------------------------------------------------

    fn alloc(&mut self, content: Content) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            parent: None,
            children: Vec::new(),
            content,
            processed: false,
        });
        id
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        let id = self.alloc(Content::Element {
            info: ElementInfo::new(tag).with_classes(classes),
            attributes: Vec::new(),
        });
        self.append(parent, id);
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(Content::Text(text.to_string()));
        self.append(parent, id);
        id
    }

    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(Content::Comment(text.to_string()));
        self.append(parent, id);
        id
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Content::Element { attributes, .. } = &mut self.nodes[node.0].content {
            match attributes.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn set_editable(&mut self, node: NodeId, editable: bool) {
        if let Content::Element { info, .. } = &mut self.nodes[node.0].content {
            info.editable = editable;
        }
    }

    pub fn set_read_only(&mut self, node: NodeId, read_only: bool) {
        if let Content::Element { info, .. } = &mut self.nodes[node.0].content {
            info.read_only = read_only;
        }
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].content {
            Content::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].content {
            Content::Element { info, .. } => Some(info.tag.as_str()),
            _ => None,
        }
    }

    /// Attached means reachable from the arena root
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.is_within(&node, &self.root())
    }

    /// Concatenated text of every text unit under `node`, in document order
    pub fn visible_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].content {
            Content::Text(text) => out.push_str(text),
            Content::Comment(_) => {}
            Content::Element { .. } => {
                for child in &self.nodes[node.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Every `a` element under `node`, in document order
    pub fn links(&self, node: NodeId) -> Vec<ArenaLink> {
        let mut out = Vec::new();
        self.collect_links(node, &mut out);
        out
    }

    fn collect_links(&self, node: NodeId, out: &mut Vec<ArenaLink>) {
        if self.tag(node) == Some("a") {
            let attr = |name: &str| self.attribute(node, name).unwrap_or_default().to_string();
            out.push(ArenaLink {
                text: self.visible_text(node),
                href: attr("href"),
                target: attr("target"),
                rel: attr("rel"),
            });
        }
        for child in &self.nodes[node.0].children {
            self.collect_links(*child, out);
        }
    }

    /// Deterministic markup rendering (class first, then attributes in insertion order)
    pub fn to_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.render(node, &mut out);
        out
    }

    fn render(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].content {
            Content::Text(text) => out.push_str(&escape(text)),
            Content::Comment(text) => {
                let _ = write!(out, "<!--{}-->", text);
            }
            Content::Element { info, attributes } => {
                let _ = write!(out, "<{}", info.tag);
                if !info.classes.is_empty() {
                    let _ = write!(out, " class=\"{}\"", info.classes.join(" "));
                }
                for (name, value) in attributes {
                    let _ = write!(out, " {}=\"{}\"", name, escape(value));
                }
                out.push('>');
                for child in &self.nodes[node.0].children {
                    self.render(*child, out);
                }
                let _ = write!(out, "</{}>", info.tag);
            }
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// =============================================================================
// TextTree implementation
// =============================================================================

impl TextTree for ArenaTree {
    type Node = NodeId;

    fn kind(&self, node: &NodeId) -> NodeKind {
        match self.nodes[node.0].content {
            Content::Text(_) => NodeKind::Text,
            Content::Element { .. } => NodeKind::Element,
            Content::Comment(_) => NodeKind::Other,
        }
    }

    fn text(&self, node: &NodeId) -> Option<String> {
        match &self.nodes[node.0].content {
            Content::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes[node.0].children.clone()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn element_info(&self, node: &NodeId) -> Option<ElementInfo> {
        match &self.nodes[node.0].content {
            Content::Element { info, .. } => Some(info.clone()),
            _ => None,
        }
    }

    fn create_text(&mut self, text: &str) -> Result<NodeId, LinkError> {
        Ok(self.alloc(Content::Text(text.to_string())))
    }

    fn create_link(
        &mut self,
        link: &LinkDescriptor,
        attrs: &LinkAttributes,
    ) -> Result<NodeId, LinkError> {
        let anchor = self.alloc(Content::Element {
            info: ElementInfo::new("a"),
            attributes: vec![
                ("href".to_string(), link.destination.clone()),
                ("target".to_string(), attrs.target.clone()),
                ("rel".to_string(), attrs.rel.clone()),
                ("style".to_string(), attrs.style.clone()),
            ],
        });
        let label = self.alloc(Content::Text(link.display_text.clone()));
        self.append(anchor, label);
        Ok(anchor)
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        node: &NodeId,
        reference: &NodeId,
    ) -> Result<(), LinkError> {
        if self.nodes[reference.0].parent != Some(*parent) {
            return Err(LinkError::Host(format!(
                "{:?} is not a child of {:?}",
                reference, parent
            )));
        }
        if let Some(old_parent) = self.nodes[node.0].parent {
            self.remove_child(&old_parent, node)?;
        }
        let siblings = &mut self.nodes[parent.0].children;
        let index = siblings
            .iter()
            .position(|c| c == reference)
            .ok_or_else(|| LinkError::Host(format!("{:?} missing from parent", reference)))?;
        siblings.insert(index, *node);
        self.nodes[node.0].parent = Some(*parent);
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), LinkError> {
        let siblings = &mut self.nodes[parent.0].children;
        let index = siblings
            .iter()
            .position(|c| c == child)
            .ok_or_else(|| LinkError::Host(format!("{:?} is not a child of {:?}", child, parent)))?;
        siblings.remove(index);
        self.nodes[child.0].parent = None;
        Ok(())
    }

    fn is_processed(&self, node: &NodeId) -> bool {
        self.nodes[node.0].processed
    }

    fn mark_processed(&mut self, node: &NodeId) {
        self.nodes[node.0].processed = true;
    }
}

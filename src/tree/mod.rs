//! Tree capabilities the linker runs against
//!
//! The engine never touches a concrete document type. Anything that can be
//! walked in document order and mutated with insert-before / remove can host
//! it: the in-memory [`ArenaTree`] for native use and tests, or the browser
//! DOM through `crate::web::DomTree`.

pub mod arena;

pub use arena::{ArenaLink, ArenaTree, NodeId};

use std::fmt;

use crate::config::LinkAttributes;
use crate::error::LinkError;
use crate::linker::pattern::LinkDescriptor;

/// Coarse node classification needed by traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Text-bearing unit; contributes to the logical text
    Text,
    /// Container element
    Element,
    /// Comments, processing instructions and other non-rendered units
    Other,
}

/// What the classification policy gets to see about an element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
    /// Lowercase tag name
    pub tag: String,
    pub classes: Vec<String>,
    /// Editable region (`contenteditable` resolved by the host)
    pub editable: bool,
    /// Read-only form control (`readonly` or `aria-readonly="true"`)
    pub read_only: bool,
}

impl ElementInfo {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_classes(mut self, classes: &[&str]) -> Self {
        self.classes = classes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// An ordered tree of text-bearing and container units.
///
/// Traversal methods are read-only. Mutations return `LinkError::Host` when
/// the host rejects them so one failing match never aborts a scan.
pub trait TextTree {
    type Node: Clone + PartialEq + fmt::Debug;

    fn kind(&self, node: &Self::Node) -> NodeKind;

    /// Content of a text unit, `None` for every other kind
    fn text(&self, node: &Self::Node) -> Option<String>;

    /// Children in document order
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Element facts for classification, `None` for non-elements
    fn element_info(&self, node: &Self::Node) -> Option<ElementInfo>;

    fn create_text(&mut self, text: &str) -> Result<Self::Node, LinkError>;

    /// Create a detached link unit whose sole content is `link.display_text`
    fn create_link(
        &mut self,
        link: &LinkDescriptor,
        attrs: &LinkAttributes,
    ) -> Result<Self::Node, LinkError>;

    /// Insert `node` into `parent` immediately before `reference`
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        node: &Self::Node,
        reference: &Self::Node,
    ) -> Result<(), LinkError>;

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), LinkError>;

    /// Visited marker check
    fn is_processed(&self, node: &Self::Node) -> bool;

    /// Set the visited marker; hosts that cannot mark a unit ignore the call
    fn mark_processed(&mut self, node: &Self::Node);

    /// True when `node` is `root` or still hangs beneath it
    fn is_within(&self, node: &Self::Node, root: &Self::Node) -> bool {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if &n == root {
                return true;
            }
            current = self.parent(&n);
        }
        false
    }
}

//! Classification Policy - decides how each element is scanned
//!
//! The policy is injected into the engine; traversal never inspects tag names
//! or class lists on its own.

use serde::{Deserialize, Serialize};

use crate::config::LinkerConfig;
use crate::tree::ElementInfo;

/// Verdict for one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Not text-bearing or already interactive; subtree is left alone
    Skip,
    /// Fragment-prone container; scanned as one logical text
    FragmentContainer,
    /// Walk the children individually
    Recurse,
    /// Read-only text surface that cannot be mutated; gets pointer handling instead
    ReadOnlySurface,
}

impl Classification {
    /// Whether the fragment indexer must leave this subtree out
    pub fn excludes_text(&self) -> bool {
        matches!(self, Classification::Skip | Classification::ReadOnlySurface)
    }
}

pub trait Classifier {
    fn classify(&self, element: &ElementInfo) -> Classification;
}

impl<F> Classifier for F
where
    F: Fn(&ElementInfo) -> Classification,
{
    fn classify(&self, element: &ElementInfo) -> Classification {
        self(element)
    }
}

/// Allow-list policy driven by [`LinkerConfig`]
#[derive(Debug, Clone, Default)]
pub struct DefaultClassifier {
    config: LinkerConfig,
}

impl DefaultClassifier {
    pub fn new(config: LinkerConfig) -> Self {
        Self { config }
    }
}

impl Classifier for DefaultClassifier {
    fn classify(&self, element: &ElementInfo) -> Classification {
        let tag = element.tag.to_ascii_lowercase();

        if tag == "textarea" {
            return if element.read_only {
                Classification::ReadOnlySurface
            } else {
                Classification::Skip
            };
        }
        if self.config.skip_tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            return Classification::Skip;
        }
        if element.editable {
            return Classification::Skip;
        }
        if self.config.skip_classes.iter().any(|c| element.has_class(c)) {
            return Classification::Skip;
        }
        if self.config.container_classes.iter().any(|c| element.has_class(c)) {
            return Classification::FragmentContainer;
        }
        Classification::Recurse
    }
}

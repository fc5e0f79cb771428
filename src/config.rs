//! Configuration types and defaults for the linker
//!
//! The classification tables and link attributes are compile-time constants.
//! `LinkerConfig` carries them so a host can override individual fields from
//! JSON, but nothing in the engine requires an override.

use serde::{Deserialize, Serialize};

// =============================================================================
// Constants
// =============================================================================

/// Containers whose text is expected to be split across many wrapper elements
pub const CONTAINER_CLASSES: &[&str] = &["diff-text-inner", "blob-code-inner", "pl-s"];

/// Elements never scanned (non-rendered or already interactive)
pub const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "a", "input"];

/// Editor widgets that must not be mutated
pub const SKIP_CLASSES: &[&str] = &["cm-editor"];

pub const DESTINATION_BASE: &str = "https://github.com";

pub const LINK_TARGET: &str = "_blank";
pub const LINK_REL: &str = "noopener noreferrer";
pub const LINK_STYLE: &str = "text-decoration: none; color: inherit; cursor: pointer;";

/// Attribute used as the visited marker on processed elements
pub const PROCESSED_MARKER: &str = "data-reflinker";

// =============================================================================
// Link attributes
// =============================================================================

/// Activation and styling attributes applied to every inserted link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkAttributes {
    pub target: String,
    pub rel: String,
    pub style: String,
}

impl Default for LinkAttributes {
    fn default() -> Self {
        Self {
            target: LINK_TARGET.to_string(),
            rel: LINK_REL.to_string(),
            style: LINK_STYLE.to_string(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Linker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Class names marking fragment-prone containers
    pub container_classes: Vec<String>,
    /// Tag names (lowercase) whose subtrees are skipped
    pub skip_tags: Vec<String>,
    /// Class names whose subtrees are skipped
    pub skip_classes: Vec<String>,
    /// Attributes applied to inserted links
    pub link: LinkAttributes,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            container_classes: owned(CONTAINER_CLASSES),
            skip_tags: owned(SKIP_TAGS),
            skip_classes: owned(SKIP_CLASSES),
            link: LinkAttributes::default(),
        }
    }
}

impl LinkerConfig {
    /// Parse a (possibly partial) JSON configuration; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = LinkerConfig::default();
        assert_eq!(config.container_classes.len(), CONTAINER_CLASSES.len());
        assert!(config.skip_tags.iter().any(|t| t == "a"));
        assert_eq!(config.link.rel, "noopener noreferrer");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LinkerConfig::from_json(r#"{ "skip_classes": ["monaco-editor"] }"#).unwrap();
        assert_eq!(config.skip_classes, vec!["monaco-editor".to_string()]);
        assert_eq!(config.skip_tags, LinkerConfig::default().skip_tags);
        assert_eq!(config.link, LinkAttributes::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(LinkerConfig::from_json("{ not json").is_err());
    }
}

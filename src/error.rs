//! Failure taxonomy for one match application.
//!
//! None of these escape a scan: the engine logs them, counts the match as
//! skipped and moves on to the next match or container.

use std::fmt;

/// Why a single match could not be applied to the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// A recorded match overlaps no fragment of the index it came from
    NoOverlappingFragments { start: usize, end: usize },
    /// A fragment's source unit is no longer attached under the scan root
    DetachedSource { start: usize, end: usize },
    /// The match span runs across a skipped subtree's position
    CrossesSkippedContent { start: usize, end: usize },
    /// The plan's consumed text disagrees with the match text
    PlanMismatch { expected: String, got: String },
    /// The host tree rejected a mutation (e.g. a JS exception)
    Host(String),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::NoOverlappingFragments { start, end } => {
                write!(f, "No fragment overlaps match span {}..{}", start, end)
            }
            LinkError::DetachedSource { start, end } => {
                write!(f, "Fragment {}..{} is detached from the scan root", start, end)
            }
            LinkError::CrossesSkippedContent { start, end } => {
                write!(f, "Match span {}..{} crosses skipped content", start, end)
            }
            LinkError::PlanMismatch { expected, got } => {
                write!(f, "Plan consumes {:?}, match text is {:?}", got, expected)
            }
            LinkError::Host(msg) => write!(f, "Host mutation failed: {}", msg),
        }
    }
}

impl std::error::Error for LinkError {}

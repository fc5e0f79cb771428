//! Pattern Matcher - `org/repo[/path]@ref` detection via Regex
//!
//! Grammar (ASCII word boundaries on both ends):
//! - organization: `[A-Za-z0-9_.-]+`
//! - `/` repository: `[A-Za-z0-9_.-]+`
//! - optional path: `/` followed by `[A-Za-z0-9_./-]*`
//! - `@` ref: `[A-Za-z0-9_./-]+`
//!
//! The compiled pattern is shared and immutable. Every call to
//! [`find_matches`] starts a fresh iteration, so there is no scan cursor to
//! reset between calls and concurrent scans cannot disturb each other.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::config::DESTINATION_BASE;

const REF_PATTERN: &str = r"(?-u:\b)([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)(/[A-Za-z0-9_./-]*)?@([A-Za-z0-9_./-]+)(?-u:\b)";

static PATTERN: OnceLock<Regex> = OnceLock::new();

fn pattern() -> &'static Regex {
    // The pattern is a literal; failing to compile it is a programming error.
    PATTERN.get_or_init(|| Regex::new(REF_PATTERN).unwrap())
}

// ==================== TYPE DEFINITIONS ====================

/// Capture group positions inside [`RefMatch::groups`]
pub const GROUP_ORGANIZATION: usize = 0;
pub const GROUP_REPOSITORY: usize = 1;
pub const GROUP_PATH: usize = 2;
pub const GROUP_REF: usize = 3;

/// One located reference. `start`/`end` are byte offsets into the scanned text.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RefMatch {
    pub full_text: String,
    /// organization, repository, path (with its leading `/`), ref
    pub groups: Vec<Option<String>>,
    pub start: usize,
    pub end: usize,
}

impl RefMatch {
    fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }

    pub fn organization(&self) -> &str {
        self.group(GROUP_ORGANIZATION).unwrap_or_default()
    }

    pub fn repository(&self) -> &str {
        self.group(GROUP_REPOSITORY).unwrap_or_default()
    }

    /// Raw path capture, leading separator included
    pub fn path(&self) -> Option<&str> {
        self.group(GROUP_PATH)
    }

    pub fn git_ref(&self) -> &str {
        self.group(GROUP_REF).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive on both ends, the way a caret sitting right after the last
    /// character still belongs to the reference
    pub fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }
}

/// What a link shows and where it goes
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LinkDescriptor {
    pub display_text: String,
    pub destination: String,
}

impl LinkDescriptor {
    pub fn for_match(m: &RefMatch) -> Self {
        Self {
            display_text: m.full_text.clone(),
            destination: destination_url(m.organization(), m.repository(), m.path(), m.git_ref()),
        }
    }
}

// ==================== MAIN IMPLEMENTATION ====================

/// Find every reference in `text`, left to right, non-overlapping.
pub fn find_matches(text: &str) -> Vec<RefMatch> {
    pattern()
        .captures_iter(text)
        .filter_map(|cap| {
            let full = cap.get(0)?;
            let groups = (1..=4)
                .map(|i| cap.get(i).map(|g| g.as_str().to_string()))
                .collect();
            Some(RefMatch {
                full_text: full.as_str().to_string(),
                groups,
                start: full.start(),
                end: full.end(),
            })
        })
        .collect()
}

/// Cheap presence check used before doing any tree work
pub fn contains_reference(text: &str) -> bool {
    pattern().is_match(text)
}

/// `https://github.com/{org}/{repo}/tree/{ref}[/{path}]`
///
/// One leading separator is stripped from `path`; an empty remainder adds nothing.
pub fn destination_url(organization: &str, repository: &str, path: Option<&str>, git_ref: &str) -> String {
    let mut url = format!("{}/{}/{}/tree/{}", DESTINATION_BASE, organization, repository, git_ref);
    let clean = path
        .map(|p| p.strip_prefix('/').unwrap_or(p))
        .unwrap_or_default();
    if !clean.is_empty() {
        url.push('/');
        url.push_str(clean);
    }
    url
}

// ==================== TESTS ====================

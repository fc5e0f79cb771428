//! Tree Surgeon - minimal structure-preserving link insertion
//!
//! Given a resolved [`MatchPlan`], splices one link unit into the live tree:
//!
//! ```text
//! parent(first):  [kept prefix] <a>match text</a> [kept suffix] (first source removed)
//! ```
//!
//! Every source unit the plan touches is removed afterwards, and a wrapper
//! emptied by that removal is removed too (one level, never the scan root).

use tracing::debug;

use crate::config::LinkAttributes;
use crate::error::LinkError;
use crate::linker::pattern::LinkDescriptor;
use crate::linker::resolver::MatchPlan;
use crate::tree::TextTree;

/// Nodes created by one application
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<N> {
    pub link: N,
    pub prefix: Option<N>,
    pub suffix: Option<N>,
    /// Wrappers removed because the mutation left them empty
    pub wrappers_removed: usize,
}

/// The only component allowed to mutate the tree
#[derive(Debug, Clone, Default)]
pub struct TreeSurgeon {
    attrs: LinkAttributes,
}

impl TreeSurgeon {
    pub fn new(attrs: LinkAttributes) -> Self {
        Self { attrs }
    }

    /// Apply `plan` beneath `root`.
    ///
    /// Fails without touching the tree when any planned source has been
    /// detached from `root` or no longer carries the text it was indexed with.
    pub fn apply<T: TextTree>(
        &self,
        tree: &mut T,
        root: &T::Node,
        plan: &MatchPlan<T::Node>,
        link: &LinkDescriptor,
    ) -> Result<Applied<T::Node>, LinkError> {
        let (first, last) = match (plan.first(), plan.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(LinkError::NoOverlappingFragments {
                    start: 0,
                    end: link.display_text.len(),
                })
            }
        };

        for entry in &plan.entries {
            let fragment = &entry.fragment;
            let live = tree.is_within(&fragment.source, root)
                && tree.text(&fragment.source).as_deref() == Some(fragment.text.as_str());
            if !live {
                return Err(LinkError::DetachedSource {
                    start: fragment.start,
                    end: fragment.end,
                });
            }
        }

        let anchor = first.fragment.source.clone();
        let parent = tree.parent(&anchor).ok_or(LinkError::DetachedSource {
            start: first.fragment.start,
            end: first.fragment.end,
        })?;

        let prefix = match first.kept_prefix() {
            "" => None,
            text => {
                let node = tree.create_text(text)?;
                tree.insert_before(&parent, &node, &anchor)?;
                Some(node)
            }
        };

        let link_node = tree.create_link(link, &self.attrs)?;
        tree.insert_before(&parent, &link_node, &anchor)?;
        tree.mark_processed(&link_node);

        let suffix = match last.kept_suffix() {
            "" => None,
            text => {
                let node = tree.create_text(text)?;
                tree.insert_before(&parent, &node, &anchor)?;
                Some(node)
            }
        };

        let mut wrappers_removed = 0;
        for entry in plan.entries.iter().filter(|e| e.action.touches()) {
            let source = &entry.fragment.source;
            let Some(holder) = tree.parent(source) else {
                continue;
            };
            tree.remove_child(&holder, source)?;

            if &holder != root && tree.children(&holder).is_empty() {
                if let Some(outer) = tree.parent(&holder) {
                    tree.remove_child(&outer, &holder)?;
                    wrappers_removed += 1;
                }
            }
        }

        debug!(
            text = %link.display_text,
            fragments = plan.len(),
            wrappers_removed,
            "link inserted"
        );

        Ok(Applied {
            link: link_node,
            prefix,
            suffix,
            wrappers_removed,
        })
    }
}

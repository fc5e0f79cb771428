//! Linker - classification-driven scan over a text tree
//!
//! # Control flow
//! 1. The classifier picks a scanning root (container or single text unit)
//! 2. The fragment indexer snapshots the root's logical text
//! 3. The pattern matcher finds every reference in that snapshot, one
//!    break-free segment at a time so no match spans skipped content
//! 4. Each match is resolved against the index and applied, left to right
//!
//! Match spans are never recomputed after a mutation. A link carries exactly
//! the text it consumed, so logical offsets stay valid; the only bookkeeping
//! is re-pointing a fragment at the kept suffix left behind by the previous
//! match (see [`FragmentIndex::narrow_to_tail`]).

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LinkerConfig;
use crate::error::LinkError;
use crate::linker::classify::{Classification, Classifier, DefaultClassifier};
use crate::linker::fragment::{self, FragmentIndex};
use crate::linker::pattern::{self, LinkDescriptor, RefMatch};
use crate::linker::resolver;
use crate::linker::surgeon::TreeSurgeon;
use crate::tree::{NodeKind, TextTree};

// =============================================================================
// Types
// =============================================================================

/// Running totals across every scan made by one [`Linker`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerStats {
    pub containers_scanned: usize,
    pub text_nodes_scanned: usize,
    pub matches_found: usize,
    pub links_inserted: usize,
    /// Matches dropped because of a structural invariant violation
    pub matches_skipped: usize,
    pub surfaces_found: usize,
    pub elapsed_us: u64,
}

/// Outcome of processing one subtree
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessReport<N> {
    pub links_inserted: usize,
    /// Newly discovered read-only surfaces; the host attaches pointer handling
    pub surfaces: Vec<N>,
}

impl<N> Default for ProcessReport<N> {
    fn default() -> Self {
        Self {
            links_inserted: 0,
            surfaces: Vec::new(),
        }
    }
}

impl<N> ProcessReport<N> {
    fn merge(&mut self, other: ProcessReport<N>) {
        self.links_inserted += other.links_inserted;
        self.surfaces.extend(other.surfaces);
    }
}

// =============================================================================
// Linker
// =============================================================================

pub struct Linker<C: Classifier = DefaultClassifier> {
    classifier: C,
    surgeon: TreeSurgeon,
    stats: LinkerStats,
}

impl Default for Linker<DefaultClassifier> {
    fn default() -> Self {
        Self::new()
    }
}

impl Linker<DefaultClassifier> {
    pub fn new() -> Self {
        Self::with_config(LinkerConfig::default())
    }

    pub fn with_config(config: LinkerConfig) -> Self {
        let surgeon = TreeSurgeon::new(config.link.clone());
        Self {
            classifier: DefaultClassifier::new(config),
            surgeon,
            stats: LinkerStats::default(),
        }
    }
}

impl<C: Classifier> Linker<C> {
    /// Use a custom classification policy with default link attributes
    pub fn with_classifier(classifier: C) -> Self {
        Self {
            classifier,
            surgeon: TreeSurgeon::default(),
            stats: LinkerStats::default(),
        }
    }

    pub fn stats(&self) -> &LinkerStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = LinkerStats::default();
    }

    /// Policy verdict for `node`, `None` for non-elements
    pub fn classify<T: TextTree>(&self, tree: &T, node: &T::Node) -> Option<Classification> {
        tree.element_info(node)
            .map(|info| self.classifier.classify(&info))
    }

    /// Process `node` and everything beneath it.
    pub fn process<T: TextTree>(&mut self, tree: &mut T, node: &T::Node) -> ProcessReport<T::Node> {
        let started = instant::Instant::now();
        let mut report = ProcessReport::default();
        self.walk(tree, node, &mut report);
        self.stats.elapsed_us += started.elapsed().as_micros() as u64;
        report
    }

    /// Handle a batch of newly attached nodes under `document`.
    ///
    /// Nodes already detached again, or sitting inside a subtree the policy
    /// excludes (an existing link, an editor), are ignored.
    pub fn process_added<T, I>(&mut self, tree: &mut T, document: &T::Node, added: I) -> ProcessReport<T::Node>
    where
        T: TextTree,
        I: IntoIterator<Item = T::Node>,
    {
        let mut report = ProcessReport::default();
        for node in added {
            if !tree.is_within(&node, document) || self.inside_excluded(tree, &node, document) {
                continue;
            }
            report.merge(self.process(tree, &node));
        }
        report
    }

    fn inside_excluded<T: TextTree>(&self, tree: &T, node: &T::Node, document: &T::Node) -> bool {
        let mut current = tree.parent(node);
        while let Some(ancestor) = current {
            if self
                .classify(tree, &ancestor)
                .map(|c| c.excludes_text())
                .unwrap_or(false)
            {
                return true;
            }
            if &ancestor == document {
                break;
            }
            current = tree.parent(&ancestor);
        }
        false
    }

    fn walk<T: TextTree>(&mut self, tree: &mut T, node: &T::Node, report: &mut ProcessReport<T::Node>) {
        match tree.kind(node) {
            NodeKind::Text => report.links_inserted += self.link_text_node(tree, node),
            NodeKind::Other => {}
            NodeKind::Element => match self.classify(tree, node) {
                Some(Classification::Skip) | None => {}
                Some(Classification::ReadOnlySurface) => {
                    if !tree.is_processed(node) {
                        tree.mark_processed(node);
                        self.stats.surfaces_found += 1;
                        report.surfaces.push(node.clone());
                    }
                }
                Some(Classification::FragmentContainer) => {
                    report.links_inserted += self.scan_container(tree, node);
                }
                Some(Classification::Recurse) => {
                    for child in tree.children(node) {
                        self.walk(tree, &child, report);
                    }
                }
            },
        }
    }

    /// Link every reference in a fragment-prone container; returns links inserted.
    pub fn scan_container<T: TextTree>(&mut self, tree: &mut T, container: &T::Node) -> usize {
        if tree.is_processed(container) {
            return 0;
        }
        self.stats.containers_scanned += 1;
        let inserted = self.scan(tree, container);
        tree.mark_processed(container);
        inserted
    }

    /// Standalone path for a single text unit; the one-fragment case of
    /// [`Linker::scan_container`].
    pub fn link_text_node<T: TextTree>(&mut self, tree: &mut T, node: &T::Node) -> usize {
        if tree.is_processed(node) {
            return 0;
        }
        let has_reference = tree
            .text(node)
            .map(|text| pattern::contains_reference(&text))
            .unwrap_or(false);
        if !has_reference {
            return 0;
        }
        self.stats.text_nodes_scanned += 1;
        self.scan(tree, node)
    }

    fn scan<T: TextTree>(&mut self, tree: &mut T, root: &T::Node) -> usize {
        // A text root is replaced during its own scan, so attachment is
        // judged against its parent.
        let scope = match tree.kind(root) {
            NodeKind::Text => match tree.parent(root) {
                Some(parent) => parent,
                None => return 0,
            },
            _ => root.clone(),
        };

        let mut index = {
            let view: &T = tree;
            fragment::index(view, root, |node| {
                self.classify(view, node)
                    .map(|c| c.excludes_text())
                    .unwrap_or(false)
            })
        };

        let matches = segment_matches(&index);
        if matches.is_empty() {
            return 0;
        }
        self.stats.matches_found += matches.len();
        debug!(matches = matches.len(), fragments = index.len(), "scanning");

        let mut inserted = 0;
        for m in &matches {
            match self.apply_match(tree, &scope, &mut index, m) {
                Ok(()) => inserted += 1,
                Err(err) => {
                    self.stats.matches_skipped += 1;
                    warn!(error = %err, reference = %m.full_text, "reference skipped");
                    #[cfg(target_arch = "wasm32")]
                    web_sys::console::warn_1(&skip_message(m, &err).into());
                }
            }
        }
        self.stats.links_inserted += inserted;
        inserted
    }

    fn apply_match<T: TextTree>(
        &self,
        tree: &mut T,
        scope: &T::Node,
        index: &mut FragmentIndex<T::Node>,
        m: &RefMatch,
    ) -> Result<(), LinkError> {
        let plan = resolver::resolve(m, index)?;
        let link = LinkDescriptor::for_match(m);
        let applied = self.surgeon.apply(tree, scope, &plan, &link)?;

        if let (Some(suffix), Some(last)) = (applied.suffix, plan.last()) {
            index.narrow_to_tail(last.position, suffix, m.end);
        }
        Ok(())
    }
}

/// Matches of every break-free segment, in logical coordinates
fn segment_matches<N: Clone>(index: &FragmentIndex<N>) -> Vec<RefMatch> {
    let text = index.logical_text();
    index
        .segments()
        .into_iter()
        .flat_map(|segment| {
            let offset = segment.start;
            pattern::find_matches(&text[segment]).into_iter().map(move |mut m| {
                m.start += offset;
                m.end += offset;
                m
            })
        })
        .collect()
}

/// Console line for a skipped reference
fn skip_message(m: &RefMatch, err: &LinkError) -> String {
    format!("[RefLinker] skipped {} at {}..{}: {}", m.full_text, m.start, m.end, err)
}

// =============================================================================
// Tests
// =============================================================================

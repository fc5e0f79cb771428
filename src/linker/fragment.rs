//! Fragment Indexer - logical text reconstruction over fragmented markup
//!
//! Walks a container in document order and records every text unit as a
//! [`Fragment`] with its byte range in the concatenated logical text. The
//! index is read-only for the tree; it is rebuilt for every container scan.

use crate::tree::{NodeKind, TextTree};

// =============================================================================
// Core Types
// =============================================================================

/// One text unit's contribution to the logical text
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment<N> {
    pub source: N,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl<N> Fragment<N> {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Any shared byte with `start..end`
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && self.end > start
    }
}

/// One step of a document-order walk
#[derive(Debug, Clone, PartialEq)]
pub enum Piece<N> {
    Text(N, String),
    /// A skipped subtree; its visible text is absent from the logical text
    Break,
}

/// Ordered, contiguous fragments plus the logical text they concatenate to.
///
/// `breaks` holds the logical offsets where skipped subtrees sat. No match may
/// cross one: the skipped text is still on screen between the two sides.
#[derive(Debug, Clone)]
pub struct FragmentIndex<N> {
    fragments: Vec<Fragment<N>>,
    text: String,
    breaks: Vec<usize>,
}

impl<N: Clone> FragmentIndex<N> {
    /// Build an index from `(source, text)` pairs already in document order
    pub fn from_units(units: impl IntoIterator<Item = (N, String)>) -> Self {
        Self::from_pieces(units.into_iter().map(|(source, text)| Piece::Text(source, text)))
    }

    pub fn from_pieces(pieces: impl IntoIterator<Item = Piece<N>>) -> Self {
        let mut fragments = Vec::new();
        let mut text = String::new();
        let mut breaks: Vec<usize> = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Text(source, unit_text) => {
                    let start = text.len();
                    text.push_str(&unit_text);
                    fragments.push(Fragment {
                        source,
                        end: start + unit_text.len(),
                        text: unit_text,
                        start,
                    });
                }
                Piece::Break => {
                    if breaks.last() != Some(&text.len()) {
                        breaks.push(text.len());
                    }
                }
            }
        }
        Self { fragments, text, breaks }
    }

    pub fn logical_text(&self) -> &str {
        &self.text
    }

    pub fn fragments(&self) -> &[Fragment<N>] {
        &self.fragments
    }

    pub fn breaks(&self) -> &[usize] {
        &self.breaks
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Logical ranges between breaks; matching runs on each independently
    pub fn segments(&self) -> Vec<std::ops::Range<usize>> {
        let mut bounds = Vec::with_capacity(self.breaks.len() + 2);
        bounds.push(0);
        bounds.extend(self.breaks.iter().copied());
        bounds.push(self.text.len());
        bounds
            .windows(2)
            .filter(|w| w[0] < w[1])
            .map(|w| w[0]..w[1])
            .collect()
    }

    /// Whether a skipped subtree sits strictly inside `start..end`
    pub fn crosses_break(&self, start: usize, end: usize) -> bool {
        self.breaks.iter().any(|&b| start < b && b < end)
    }

    /// Index range of the fragments overlapping `start..end`.
    ///
    /// Starts and ends are both non-decreasing, so two binary searches bound
    /// the overlap set exactly.
    pub fn overlapping(&self, start: usize, end: usize) -> std::ops::Range<usize> {
        let first = self.fragments.partition_point(|f| f.end <= start);
        let last = self.fragments.partition_point(|f| f.start < end);
        first..last.max(first)
    }

    /// Replace the fragment at `position` by its unconsumed tail.
    ///
    /// Link text equals the consumed text, so logical offsets survive every
    /// mutation; only the handle that now carries the tail changes.
    pub fn narrow_to_tail(&mut self, position: usize, source: N, tail_start: usize) {
        if let Some(fragment) = self.fragments.get_mut(position) {
            if tail_start < fragment.start || tail_start > fragment.end {
                return;
            }
            let local = tail_start - fragment.start;
            fragment.text = fragment.text[local..].to_string();
            fragment.start = tail_start;
            fragment.source = source;
        }
    }
}

// =============================================================================
// Indexing
// =============================================================================

/// Index every text unit beneath `root` in pre-order.
///
/// `skip` is the classification policy's verdict for descendant elements;
/// a `true` answer excludes the whole subtree and leaves a break in its
/// place. The root itself is never tested, and a text root yields a single
/// fragment.
pub fn index<T, F>(tree: &T, root: &T::Node, skip: F) -> FragmentIndex<T::Node>
where
    T: TextTree,
    F: Fn(&T::Node) -> bool,
{
    let mut pieces = Vec::new();
    match tree.kind(root) {
        NodeKind::Text => {
            if let Some(text) = tree.text(root) {
                pieces.push(Piece::Text(root.clone(), text));
            }
        }
        NodeKind::Element => collect_pieces(tree, root, &skip, &mut pieces),
        NodeKind::Other => {}
    }
    FragmentIndex::from_pieces(pieces)
}

fn collect_pieces<T, F>(tree: &T, node: &T::Node, skip: &F, pieces: &mut Vec<Piece<T::Node>>)
where
    T: TextTree,
    F: Fn(&T::Node) -> bool,
{
    for child in tree.children(node) {
        match tree.kind(&child) {
            NodeKind::Text => {
                if let Some(text) = tree.text(&child) {
                    pieces.push(Piece::Text(child, text));
                }
            }
            NodeKind::Element => {
                if skip(&child) {
                    pieces.push(Piece::Break);
                } else {
                    collect_pieces(tree, &child, skip, pieces);
                }
            }
            NodeKind::Other => {}
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ArenaTree;

    fn diff_line() -> (ArenaTree, crate::tree::NodeId) {
        let mut tree = ArenaTree::new();
        let root = tree.root();
        let line = tree.append_element(root, "span", &["diff-text-inner"]);
        tree.append_text(line, "uses: ");
        let s1 = tree.append_element(line, "span", &["pl-s"]);
        tree.append_text(s1, "acme-org/");
        let s2 = tree.append_element(line, "span", &["pl-c1"]);
        let nested = tree.append_element(s2, "em", &[]);
        tree.append_text(nested, "widgets@main");
        (tree, line)
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Pre-order concatenation with contiguous offsets
    // -------------------------------------------------------------------------
    #[test]
    fn test_index_concatenates_in_document_order() {
        let (tree, line) = diff_line();
        let index = index(&tree, &line, |_| false);

        assert_eq!(index.logical_text(), "uses: acme-org/widgets@main");
        let ranges: Vec<(usize, usize)> = index.fragments().iter().map(|f| (f.start, f.end)).collect();
        assert_eq!(ranges, vec![(0, 6), (6, 15), (15, 27)]);
        for f in index.fragments() {
            assert_eq!(f.end - f.start, f.text.len());
        }
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Skip predicate prunes whole subtrees
    // -------------------------------------------------------------------------
    #[test]
    fn test_skip_predicate_prunes_subtree() {
        let mut tree = ArenaTree::new();
        let root = tree.root();
        tree.append_text(root, "before ");
        let script = tree.append_element(root, "script", &[]);
        tree.append_text(script, "var x = 'a/b@c';");
        tree.append_text(root, "after");

        let index = index(&tree, &root, |n| tree.tag(*n) == Some("script"));
        assert_eq!(index.logical_text(), "before after");
        assert_eq!(index.len(), 2);
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Comments contribute nothing
    // -------------------------------------------------------------------------
    #[test]
    fn test_comments_ignored() {
        let mut tree = ArenaTree::new();
        let root = tree.root();
        tree.append_text(root, "a");
        tree.append_comment(root, "hidden");
        tree.append_text(root, "b");

        assert_eq!(index(&tree, &root, |_| false).logical_text(), "ab");
    }

    // -------------------------------------------------------------------------
    // Requirement 4: A text root is a single fragment
    // -------------------------------------------------------------------------
    #[test]
    fn test_text_root_single_fragment() {
        let mut tree = ArenaTree::new();
        let root = tree.root();
        let text = tree.append_text(root, "acme/a@1");

        let index = index(&tree, &text, |_| true);
        assert_eq!(index.len(), 1);
        assert_eq!(index.fragments()[0].source, text);
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Skipped subtrees leave a break in the logical text
    // -------------------------------------------------------------------------
    #[test]
    fn test_skipped_subtree_breaks_segments() {
        let mut tree = ArenaTree::new();
        let root = tree.root();
        tree.append_text(root, "acme/");
        let a = tree.append_element(root, "a", &[]);
        tree.append_text(a, "zz");
        tree.append_text(root, "a@1");

        let index = index(&tree, &root, |n| tree.tag(*n) == Some("a"));
        assert_eq!(index.logical_text(), "acme/a@1");
        assert_eq!(index.breaks(), &[5]);
        assert_eq!(index.segments(), vec![0..5, 5..8]);
        assert!(index.crosses_break(0, 8));
        assert!(!index.crosses_break(5, 8));
    }

    #[test]
    fn test_leading_and_adjacent_breaks() {
        let index = FragmentIndex::from_pieces(vec![
            Piece::Break,
            Piece::Text(0u8, "ab".to_string()),
            Piece::Break,
            Piece::Break,
            Piece::Text(1u8, "cd".to_string()),
        ]);
        assert_eq!(index.breaks(), &[0, 2]);
        assert_eq!(index.segments(), vec![0..2, 2..4]);
        assert!(FragmentIndex::<u8>::from_units(Vec::new()).segments().is_empty());
    }

    #[test]
    fn test_overlapping_range() {
        let (tree, line) = diff_line();
        let index = index(&tree, &line, |_| false);

        assert_eq!(index.overlapping(6, 27), 1..3);
        assert_eq!(index.overlapping(0, 6), 0..1);
        assert_eq!(index.overlapping(27, 30), 3..3);
    }

    #[test]
    fn test_overlapping_includes_interior_empty_fragment() {
        let index = FragmentIndex::from_units(vec![
            (0u8, "ab".to_string()),
            (1u8, String::new()),
            (2u8, "cd".to_string()),
        ]);
        assert_eq!(index.overlapping(1, 3), 0..3);
        assert_eq!(index.overlapping(2, 4), 2..3);
    }

    #[test]
    fn test_narrow_to_tail() {
        let mut index = FragmentIndex::from_units(vec![("orig", "x a/b@1 y".to_string())]);
        index.narrow_to_tail(0, "tail", 7);

        let f = &index.fragments()[0];
        assert_eq!(f.source, "tail");
        assert_eq!(f.text, " y");
        assert_eq!((f.start, f.end), (7, 9));
    }
}

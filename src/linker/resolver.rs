//! Span Resolver - maps a logical match span back onto fragment boundaries
//!
//! # Local actions
//!
//! | Overlap                          | Action                 |
//! |----------------------------------|------------------------|
//! | match inside one fragment        | `TrimBoth`             |
//! | fragment starts before the match | `TrimPrefix`           |
//! | fragment ends after the match    | `TrimSuffix`           |
//! | fragment inside the match        | `FullyConsumed`        |
//!
//! Resolution never mutates anything, so every match of a scan can be
//! resolved against the same fragment snapshot.

use crate::error::LinkError;
use crate::linker::fragment::{Fragment, FragmentIndex};
use crate::linker::pattern::RefMatch;

// =============================================================================
// Core Types
// =============================================================================

/// What happens to one fragment's text. Offsets are local byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalAction {
    /// Fragment does not take part in the match
    None,
    /// Keep the first `kept` bytes, consume the rest
    TrimPrefix { kept: usize },
    /// Consume the first `consumed` bytes, keep the rest
    TrimSuffix { consumed: usize },
    /// Consume `start..end`, keep both sides
    TrimBoth { start: usize, end: usize },
    FullyConsumed,
}

impl LocalAction {
    /// Local byte range taken by the match
    pub fn consumed_range(&self, len: usize) -> std::ops::Range<usize> {
        match *self {
            LocalAction::None => 0..0,
            LocalAction::TrimPrefix { kept } => kept..len,
            LocalAction::TrimSuffix { consumed } => 0..consumed,
            LocalAction::TrimBoth { start, end } => start..end,
            LocalAction::FullyConsumed => 0..len,
        }
    }

    pub fn consumed<'a>(&self, text: &'a str) -> &'a str {
        &text[self.consumed_range(text.len())]
    }

    /// Text retained before the consumed part
    pub fn kept_prefix<'a>(&self, text: &'a str) -> &'a str {
        match self {
            LocalAction::None => text,
            _ => &text[..self.consumed_range(text.len()).start],
        }
    }

    /// Text retained after the consumed part
    pub fn kept_suffix<'a>(&self, text: &'a str) -> &'a str {
        match self {
            LocalAction::None => "",
            _ => &text[self.consumed_range(text.len()).end..],
        }
    }

    pub fn touches(&self) -> bool {
        !matches!(self, LocalAction::None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry<N> {
    /// Position of the fragment in the index the plan was resolved against
    pub position: usize,
    pub fragment: Fragment<N>,
    pub action: LocalAction,
}

impl<N> PlanEntry<N> {
    pub fn consumed(&self) -> &str {
        self.action.consumed(&self.fragment.text)
    }

    pub fn kept_prefix(&self) -> &str {
        self.action.kept_prefix(&self.fragment.text)
    }

    pub fn kept_suffix(&self) -> &str {
        self.action.kept_suffix(&self.fragment.text)
    }
}

/// Per-fragment instructions for one match, in document order
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPlan<N> {
    pub entries: Vec<PlanEntry<N>>,
}

impl<N> MatchPlan<N> {
    /// Concatenated consumed text; equals the match text for a valid plan
    pub fn consumed_text(&self) -> String {
        self.entries.iter().map(|e| e.consumed()).collect()
    }

    pub fn first(&self) -> Option<&PlanEntry<N>> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&PlanEntry<N>> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Local action for one fragment against the span `start..end`
pub fn local_action<N>(fragment: &Fragment<N>, start: usize, end: usize) -> LocalAction {
    if !fragment.overlaps(start, end) {
        return LocalAction::None;
    }
    let head = start.saturating_sub(fragment.start);
    let tail = end.min(fragment.end) - fragment.start;
    let starts_before = fragment.start < start;
    let ends_after = fragment.end > end;

    match (starts_before, ends_after) {
        (true, true) => LocalAction::TrimBoth { start: head, end: tail },
        (true, false) => LocalAction::TrimPrefix { kept: head },
        (false, true) => LocalAction::TrimSuffix { consumed: tail },
        (false, false) => LocalAction::FullyConsumed,
    }
}

/// Build the plan for `m` against `index`.
pub fn resolve<N: Clone>(m: &RefMatch, index: &FragmentIndex<N>) -> Result<MatchPlan<N>, LinkError> {
    if index.crosses_break(m.start, m.end) {
        return Err(LinkError::CrossesSkippedContent {
            start: m.start,
            end: m.end,
        });
    }
    let range = index.overlapping(m.start, m.end);
    if range.is_empty() {
        return Err(LinkError::NoOverlappingFragments {
            start: m.start,
            end: m.end,
        });
    }

    let entries: Vec<PlanEntry<N>> = range
        .map(|position| {
            let fragment = &index.fragments()[position];
            PlanEntry {
                position,
                action: local_action(fragment, m.start, m.end),
                fragment: fragment.clone(),
            }
        })
        .collect();

    let plan = MatchPlan { entries };
    let consumed = plan.consumed_text();
    if consumed != m.full_text {
        return Err(LinkError::PlanMismatch {
            expected: m.full_text.clone(),
            got: consumed,
        });
    }
    Ok(plan)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linker::fragment::Piece;
    use crate::linker::pattern::find_matches;

    fn index_of(parts: &[&str]) -> FragmentIndex<usize> {
        FragmentIndex::from_units(parts.iter().enumerate().map(|(i, p)| (i, p.to_string())))
    }

    fn resolve_first(parts: &[&str]) -> MatchPlan<usize> {
        let index = index_of(parts);
        let m = find_matches(index.logical_text()).remove(0);
        resolve(&m, &index).unwrap()
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Match inside one fragment trims both sides
    // -------------------------------------------------------------------------
    #[test]
    fn test_match_inside_single_fragment() {
        let plan = resolve_first(&["Check acme-org/widgets@main for details"]);
        assert_eq!(plan.len(), 1);

        let entry = &plan.entries[0];
        assert_eq!(entry.action, LocalAction::TrimBoth { start: 6, end: 27 });
        assert_eq!(entry.kept_prefix(), "Check ");
        assert_eq!(entry.consumed(), "acme-org/widgets@main");
        assert_eq!(entry.kept_suffix(), " for details");
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Match across fragments trims the edges
    // -------------------------------------------------------------------------
    #[test]
    fn test_match_across_fragments() {
        let plan = resolve_first(&["uses: acme-", "org/", "widgets@main # pin"]);
        assert_eq!(plan.len(), 3);

        assert_eq!(plan.entries[0].action, LocalAction::TrimPrefix { kept: 6 });
        assert_eq!(plan.entries[1].action, LocalAction::FullyConsumed);
        assert_eq!(plan.entries[2].action, LocalAction::TrimSuffix { consumed: 12 });
        assert_eq!(plan.entries[2].kept_suffix(), " # pin");
        assert_eq!(plan.consumed_text(), "acme-org/widgets@main");
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Exact fragment boundaries consume whole fragments
    // -------------------------------------------------------------------------
    #[test]
    fn test_match_on_exact_boundaries() {
        let plan = resolve_first(&["x ", "acme-org/", "widgets@main", " y"]);
        let positions: Vec<usize> = plan.entries.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert!(plan.entries.iter().all(|e| e.action == LocalAction::FullyConsumed));
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Zero overlap is an invariant violation, not a panic
    // -------------------------------------------------------------------------
    #[test]
    fn test_zero_overlap_is_error() {
        let index = index_of(&["short"]);
        let m = RefMatch {
            full_text: "acme/a@1".to_string(),
            groups: vec![None; 4],
            start: 40,
            end: 48,
        };
        assert_eq!(
            resolve(&m, &index),
            Err(LinkError::NoOverlappingFragments { start: 40, end: 48 })
        );
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Consumed text must reproduce the match text
    // -------------------------------------------------------------------------
    #[test]
    fn test_mismatched_snapshot_is_error() {
        let index = index_of(&["x acme/a@1"]);
        let m = RefMatch {
            full_text: "acme/b@2".to_string(),
            groups: vec![None; 4],
            start: 2,
            end: 10,
        };
        assert!(matches!(resolve(&m, &index), Err(LinkError::PlanMismatch { .. })));
    }

    // -------------------------------------------------------------------------
    // Requirement 6: A span across skipped content is rejected
    // -------------------------------------------------------------------------
    #[test]
    fn test_span_across_break_is_error() {
        let index = FragmentIndex::from_pieces(vec![
            Piece::Text(0usize, "acme/".to_string()),
            Piece::Break,
            Piece::Text(1usize, "a@1".to_string()),
        ]);
        let m = find_matches(index.logical_text()).remove(0);
        assert_eq!(
            resolve(&m, &index),
            Err(LinkError::CrossesSkippedContent { start: 0, end: 8 })
        );
    }

    #[test]
    fn test_same_snapshot_resolves_every_match() {
        let index = index_of(&["x acme/", "a@1 and y acme/b", "@2"]);
        let plans: Vec<MatchPlan<usize>> = find_matches(index.logical_text())
            .iter()
            .map(|m| resolve(m, &index).unwrap())
            .collect();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].consumed_text(), "acme/a@1");
        assert_eq!(plans[1].consumed_text(), "acme/b@2");
        assert_eq!(plans[0].last().unwrap().kept_suffix(), " and y acme/b");
        assert_eq!(plans[1].first().unwrap().kept_prefix(), "a@1 and y ");
    }

    #[test]
    fn test_local_action_none_outside_span() {
        let index = index_of(&["abc", "def"]);
        assert_eq!(local_action(&index.fragments()[0], 3, 6), LocalAction::None);
        assert_eq!(LocalAction::None.kept_prefix("abc"), "abc");
        assert_eq!(LocalAction::None.consumed("abc"), "");
    }
}

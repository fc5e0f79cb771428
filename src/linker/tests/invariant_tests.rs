//! Properties that must hold for every document
//!
//! - visible text is identical before and after linking
//! - a second run changes nothing
//! - links never nest and each carries exactly one reference

use crate::linker::engine::Linker;
use crate::linker::pattern::find_matches;
use crate::tree::{ArenaTree, NodeId};

type Builder = fn() -> (ArenaTree, NodeId);

fn plain_paragraph() -> (ArenaTree, NodeId) {
    let mut tree = ArenaTree::new();
    let root = tree.root();
    let p = tree.append_element(root, "p", &[]);
    tree.append_text(p, "bump acme/a@1 to acme/a@2, see acme/docs/guide@main.");
    (tree, root)
}

fn highlighted_workflow() -> (ArenaTree, NodeId) {
    let mut tree = ArenaTree::new();
    let root = tree.root();
    let table = tree.append_element(root, "table", &[]);
    for (i, parts) in [
        &["- uses: ", "acme/", "checkout@v4"][..],
        &["- uses: acme/setup-", "node@v3", " # lts"][..],
        &["  with: { ref: ", "a/b@c", " }"][..],
    ]
    .iter()
    .enumerate()
    {
        let line = tree.append_element(table, "td", &["blob-code-inner"]);
        for (j, part) in parts.iter().enumerate() {
            if (i + j) % 2 == 0 {
                tree.append_text(line, part);
            } else {
                let span = tree.append_element(line, "span", &["pl-s"]);
                tree.append_text(span, part);
            }
        }
    }
    (tree, root)
}

fn dense_diff() -> (ArenaTree, NodeId) {
    let mut tree = ArenaTree::new();
    let root = tree.root();
    let line = tree.append_element(root, "span", &["diff-text-inner"]);
    for part in ["acme/", "a@1 ", "acme/b", "@2 acme", "/c/d", "@3"] {
        let span = tree.append_element(line, "span", &[]);
        tree.append_text(span, part);
    }
    (tree, root)
}

fn mixed_page() -> (ArenaTree, NodeId) {
    let mut tree = ArenaTree::new();
    let root = tree.root();
    let header = tree.append_element(root, "h1", &[]);
    tree.append_text(header, "Release acme/widgets@v2.0.0");
    let a = tree.append_element(root, "a", &[]);
    tree.append_text(a, "acme/linked@already");
    let code = tree.append_element(root, "div", &["blob-code-inner"]);
    tree.append_text(code, "x = ");
    let em = tree.append_element(code, "em", &[]);
    tree.append_text(em, "acme/w@1");
    tree.append_comment(root, "acme/hidden@1");
    (tree, root)
}

fn interrupted_line() -> (ArenaTree, NodeId) {
    let mut tree = ArenaTree::new();
    let root = tree.root();
    let line = tree.append_element(root, "td", &["blob-code-inner"]);
    tree.append_text(line, "acme/");
    let input = tree.append_element(line, "input", &[]);
    tree.append_text(input, "zz");
    tree.append_text(line, "a@1 then acme/b@2");
    (tree, root)
}

const DOCUMENTS: &[Builder] = &[
    plain_paragraph,
    highlighted_workflow,
    dense_diff,
    mixed_page,
    interrupted_line,
];

/// Max nesting depth of `<a` in rendered markup
fn link_depth(markup: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut rest = markup;
    while let Some(pos) = rest.find('<') {
        rest = &rest[pos..];
        if rest.starts_with("<a ") || rest.starts_with("<a>") {
            depth += 1;
            max = max.max(depth);
        } else if rest.starts_with("</a>") {
            depth = depth.saturating_sub(1);
        }
        rest = &rest[1..];
    }
    max
}

#[test]
fn test_text_is_conserved() {
    for build in DOCUMENTS {
        let (mut tree, root) = build();
        let before = tree.visible_text(root);
        Linker::new().process(&mut tree, &root);
        assert_eq!(tree.visible_text(root), before);
    }
}

#[test]
fn test_second_run_is_a_no_op() {
    for build in DOCUMENTS {
        let (mut tree, root) = build();
        Linker::new().process(&mut tree, &root);
        let once = tree.to_markup(root);

        let report = Linker::new().process(&mut tree, &root);
        assert_eq!(report.links_inserted, 0);
        assert_eq!(tree.to_markup(root), once);
    }
}

#[test]
fn test_links_do_not_nest_and_hold_one_reference() {
    for build in DOCUMENTS {
        let (mut tree, root) = build();
        Linker::new().process(&mut tree, &root);

        assert!(link_depth(&tree.to_markup(root)) <= 1);
        for link in tree.links(root) {
            let matches = find_matches(&link.text);
            assert_eq!(matches.len(), 1, "{}", link.text);
            assert_eq!(matches[0].full_text, link.text);
        }
    }
}

#[test]
fn test_every_reference_in_containers_is_linked() {
    for build in [highlighted_workflow as Builder, dense_diff] {
        let (mut tree, root) = build();
        let expected: Vec<String> = find_matches(&tree.visible_text(root))
            .into_iter()
            .map(|m| m.full_text)
            .collect();

        Linker::new().process(&mut tree, &root);

        let linked: Vec<String> = tree.links(root).into_iter().map(|l| l.text).collect();
        assert_eq!(linked, expected);
    }
}

#[test]
fn test_expected_link_counts() {
    let counts: Vec<usize> = DOCUMENTS
        .iter()
        .map(|build| {
            let (mut tree, root) = build();
            Linker::new().process(&mut tree, &root).links_inserted
        })
        .collect();
    assert_eq!(counts, vec![3, 3, 3, 2, 1]);
}

use editor_fold_core::{FoldingDescriptor, FoldingRange, Tag, compute_folding_ranges};
use editor_fold_sexp::SexpParser;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn parens() -> Vec<FoldingDescriptor> {
    vec![FoldingDescriptor::new(true, [Tag::PAREN])]
}

fn fold(text: &str, descriptors: &[FoldingDescriptor]) -> BTreeSet<FoldingRange> {
    let tree = SexpParser::new().parse_str(text, 0);
    compute_folding_ranges(Some(&tree), descriptors)
}

fn ranges(pairs: &[(usize, usize)]) -> BTreeSet<FoldingRange> {
    pairs
        .iter()
        .map(|&(start, length)| FoldingRange::new(start, length))
        .collect()
}

#[test]
fn defn_body_folds_once() {
    let text = "(defn f []\n  (+ 1 2))";
    let folds = fold(text, &parens());
    assert_eq!(folds, ranges(&[(1, 20)]));

    let range = folds.first().unwrap();
    assert_eq!(&text[range.start_offset..range.end_offset()], "defn f []\n  (+ 1 2))");
}

#[test]
fn every_multi_line_form_folds() {
    let text = "(defn f [x]\n  (let [y x]\n    (inc y)))";
    assert_eq!(fold(text, &parens()), ranges(&[(1, 37), (15, 22)]));
}

#[test]
fn nested_forms_fold_separately() {
    assert_eq!(fold("(a\n (b\n) c)", &parens()), ranges(&[(1, 10), (5, 3)]));
}

#[test]
fn single_line_forms_never_fold() {
    assert!(fold("(a b)", &parens()).is_empty());
    assert_eq!(fold("(x\n (a b))", &parens()), ranges(&[(1, 9)]));
}

#[test]
fn dangling_open_is_dropped() {
    assert_eq!(fold("(a\n) (b\n", &parens()), ranges(&[(1, 3)]));
}

#[test]
fn broken_tree_still_folds_well_formed_forms() {
    let text = "(a\n b))\n(c\n d)";
    assert!(SexpParser::new().parse_str(text, 0).is_broken());
    assert_eq!(fold(text, &parens()), ranges(&[(1, 5), (9, 5)]));
}

#[test]
fn multi_line_strings_fold_with_string_descriptor() {
    let text = "(str\n \"a\n)\"\n)";
    let descriptors = vec![
        FoldingDescriptor::new(true, [Tag::PAREN]),
        FoldingDescriptor::new(true, [Tag::STRING_DELIMITER]),
    ];
    assert_eq!(fold(text, &descriptors), ranges(&[(1, 12), (7, 4)]));
    assert_eq!(fold(text, &parens()), ranges(&[(1, 12)]));
}

#[test]
fn collections_fold_only_when_enabled() {
    let text = "{:a [1\n 2]\n :b 3}";
    let mut descriptors = FoldingDescriptor::defaults();
    assert!(fold(text, &descriptors).is_empty());

    for descriptor in &mut descriptors {
        if descriptor.id == "fold-collections" {
            descriptor.enabled = true;
        }
    }
    assert_eq!(fold(text, &descriptors), ranges(&[(1, 16), (5, 5)]));
}

#[test]
fn disabled_descriptors_yield_nothing() {
    let descriptors = vec![FoldingDescriptor::new(false, [Tag::PAREN])];
    assert!(fold("(a\n b)", &descriptors).is_empty());
    assert!(compute_folding_ranges(None, &parens()).is_empty());
}

#[test]
fn ranges_project_to_lines() {
    let text = "(ns demo)\n\n(defn f [x]\n  (let [y x]\n    y))";
    let tree = SexpParser::new().parse_str(text, 0);
    let lines: Vec<(usize, usize)> = compute_folding_ranges(Some(&tree), &parens())
        .iter()
        .map(|range| range.lines_in(&tree))
        .collect();
    assert_eq!(lines, vec![(2, 4), (3, 4)]);
}

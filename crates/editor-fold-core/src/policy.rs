//! Folding policy: which leaves take part in delimiter matching.

use crate::descriptors::{FoldingDescriptor, eligible_tags};
use crate::matcher::match_delimiters;
use crate::range::FoldingRange;
use crate::tags::Tag;
use crate::tree::{Leaf, Tree};
use std::collections::BTreeSet;

/// Compute the folding ranges of `tree` under `descriptors`.
///
/// A leaf is eligible when one of its tags is selected by an enabled descriptor and its
/// immediate parent spans more than one line. Eligible leaves are matched in source order.
/// Broken trees are handled the same way; their well-formed parts still fold.
pub fn compute_folding_ranges(
    tree: Option<&Tree>,
    descriptors: &[FoldingDescriptor],
) -> BTreeSet<FoldingRange> {
    let Some(tree) = tree else {
        return BTreeSet::new();
    };
    if !descriptors.iter().any(|d| d.enabled) {
        return BTreeSet::new();
    }

    let tags = eligible_tags(descriptors);
    let ranges: BTreeSet<FoldingRange> =
        match_delimiters(tree.leaves().filter(|leaf| is_eligible(leaf, &tags)))
            .into_iter()
            .collect();

    tracing::trace!(
        version = tree.version(),
        broken = tree.is_broken(),
        ranges = ranges.len(),
        "computed folding ranges"
    );
    ranges
}

fn is_eligible(leaf: &Leaf<'_>, tags: &BTreeSet<Tag>) -> bool {
    leaf.tags().iter().any(|tag| tags.contains(tag)) && leaf.parent_spans_multiple_lines()
}

use std::collections::BTreeMap;

use crate::extraction::PositionedFragment;

/// Default bucket size for grouping fragment baselines into rows.
pub const DEFAULT_Y_GRANULARITY: f64 = 1.0;

/// A reconstructed row of text on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub y: f64,
    pub content: String,
}

/// Regroup positioned fragments into reading-order lines.
///
/// Fragments are bucketed by their `y` coordinate rounded to a grid of
/// `granularity` units (1.0 rounds to whole units, 0.5 to half units). Inside
/// a bucket the fragments are ordered left to right and joined with a single
/// space. Buckets are returned top of page first (descending `y`).
///
/// Fragment emission order is irrelevant; only coordinates are used.
pub fn reconstruct_lines(fragments: &[PositionedFragment], granularity: f64) -> Vec<TextLine> {
    let granularity = if granularity.is_finite() && granularity > 0.0 {
        granularity
    } else {
        DEFAULT_Y_GRANULARITY
    };

    let mut buckets: BTreeMap<i64, Vec<&PositionedFragment>> = BTreeMap::new();
    for fragment in fragments {
        if !fragment.y.is_finite() {
            continue;
        }
        let key = (fragment.y / granularity).round() as i64;
        buckets.entry(key).or_default().push(fragment);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(key, mut row)| {
            row.sort_by(|a, b| a.x.total_cmp(&b.x));
            let content = row
                .iter()
                .map(|f| f.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            TextLine {
                y: key as f64 * granularity,
                content,
            }
        })
        .collect()
}

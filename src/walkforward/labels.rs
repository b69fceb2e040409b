//! Walk-forward label generation.
//!
//! Every row gets the label the classifier would have produced if the
//! series had ended at that row. The label for row i depends only on rows
//! `0..=i`, so no later information leaks into it.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use crate::data::IndicatorRecord;
use crate::regime::{RegimeCategory, RegimeClassifier};

/// Label every prefix of `records` with the classifier's regime.
///
/// Prefixes are independent, so they are classified in parallel; the output
/// order matches `records`.
pub fn walk_forward_labels(
    records: &[IndicatorRecord],
    classifier: &RegimeClassifier,
) -> Vec<RegimeCategory> {
    let labels: Vec<RegimeCategory> = (0..records.len())
        .into_par_iter()
        .map(|end| classifier.classify(&records[..=end]).category)
        .collect();

    debug!(rows = labels.len(), "Generated walk-forward labels");

    labels
}

/// Count of each regime among `labels`. Every category is present.
pub fn label_distribution(labels: &[RegimeCategory]) -> BTreeMap<RegimeCategory, usize> {
    let mut counts: BTreeMap<RegimeCategory, usize> =
        RegimeCategory::ALL.iter().map(|c| (*c, 0)).collect();

    for label in labels {
        *counts.entry(*label).or_insert(0) += 1;
    }

    counts
}

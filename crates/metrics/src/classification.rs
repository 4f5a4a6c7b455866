//! Threshold classification metrics.
//!
//! A record is predicted to be a member when its score is strictly greater
//! than the decision threshold.

use mia_audit_core::{LabelVector, MiaError, Result};

use crate::curves::binary_clf_curve;
use crate::record::check_inputs;

/// Weighted binary confusion counts (positive class = member).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConfusionCounts {
    /// Members predicted as members.
    pub tp: f64,
    /// Non-members predicted as members.
    pub fp: f64,
    /// Non-members predicted as non-members.
    pub tn: f64,
    /// Members predicted as non-members.
    pub fn_: f64,
}

impl ConfusionCounts {
    /// Tally predictions `score > threshold` against `labels`.
    pub fn at_threshold(
        scores: &[f64],
        labels: &LabelVector,
        threshold: f64,
        weights: Option<&[f64]>,
    ) -> Result<Self> {
        check_inputs("scores", scores, labels, weights)?;
        Ok(Self::tally(scores, labels, threshold, weights))
    }

    /// Unchecked tally; lengths must already agree.
    pub(crate) fn tally(
        scores: &[f64],
        labels: &LabelVector,
        threshold: f64,
        weights: Option<&[f64]>,
    ) -> Self {
        let mut counts = Self::default();
        let weights = weights.into_iter().flatten().copied().chain(std::iter::repeat(1.0));
        for ((&score, member), w) in scores.iter().zip(labels.iter()).zip(weights) {
            match (member, score > threshold) {
                (true, true) => counts.tp += w,
                (false, true) => counts.fp += w,
                (false, false) => counts.tn += w,
                (true, false) => counts.fn_ += w,
            }
        }
        counts
    }

    /// Total weight.
    pub fn total(&self) -> f64 {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// Weighted fraction of correct predictions; 0 for zero total weight.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        (self.tp + self.tn) / total
    }

    /// F1 of the member class; 0 when undefined.
    pub fn f1(&self) -> f64 {
        let denom = 2.0 * self.tp + self.fp + self.fn_;
        if denom <= 0.0 {
            return 0.0;
        }
        2.0 * self.tp / denom
    }
}

/// Accuracy of the classifier `score > threshold`.
pub fn accuracy_at(
    scores: &[f64],
    labels: &LabelVector,
    threshold: f64,
    weights: Option<&[f64]>,
) -> Result<f64> {
    Ok(ConfusionCounts::at_threshold(scores, labels, threshold, weights)?.accuracy())
}

/// F1 of the classifier `score > threshold`.
pub fn f1_at(
    scores: &[f64],
    labels: &LabelVector,
    threshold: f64,
    weights: Option<&[f64]>,
) -> Result<f64> {
    Ok(ConfusionCounts::at_threshold(scores, labels, threshold, weights)?.f1())
}

/// Sample median, averaging the two middle values for even lengths.
///
/// Returns 0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    if sorted.is_empty() {
        return 0.0;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        0.5 * (sorted[mid - 1] + sorted[mid])
    }
}

/// Distinct score values in ascending order.
pub fn distinct_thresholds(scores: &[f64]) -> Vec<f64> {
    let mut thresholds = scores.to_vec();
    thresholds.sort_by(f64::total_cmp);
    thresholds.dedup_by(|a, b| a == b);
    thresholds
}

/// Threshold chosen by the F1 sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BestThreshold {
    /// Selected threshold.
    pub threshold: f64,
    /// F1 at the selected threshold.
    pub f1: f64,
}

/// Sweep every distinct score and keep the one maximizing F1.
///
/// Candidates are visited in ascending order and only a strictly better
/// F1 replaces the incumbent, so ties resolve to the smallest threshold.
pub fn best_f1_threshold(
    scores: &[f64],
    labels: &LabelVector,
    weights: Option<&[f64]>,
) -> Result<BestThreshold> {
    check_inputs("scores", scores, labels, weights)?;
    sweep_best_f1(scores, labels, weights)
        .ok_or_else(|| MiaError::invalid("no threshold candidates"))
}

/// Unchecked F1 sweep over the cumulative counts of the descending curve.
///
/// The records above the `k`-th distinct score (highest first) are
/// exactly those counted at index `k - 1`.
pub(crate) fn sweep_best_f1(
    scores: &[f64],
    labels: &LabelVector,
    weights: Option<&[f64]>,
) -> Option<BestThreshold> {
    let clf = binary_clf_curve(scores, labels, weights);
    let total_tp = clf.tps.last().copied()?;
    let total_fp = clf.fps.last().copied()?;

    let mut best: Option<BestThreshold> = None;
    for k in (0..clf.thresholds.len()).rev() {
        let (tp, fp) = match k.checked_sub(1) {
            Some(above) => (clf.tps[above], clf.fps[above]),
            None => (0.0, 0.0),
        };
        let counts = ConfusionCounts {
            tp,
            fp,
            tn: total_fp - fp,
            fn_: total_tp - tp,
        };
        let f1 = counts.f1();
        if best.map_or(true, |b| f1 > b.f1) {
            best = Some(BestThreshold {
                threshold: clf.thresholds[k],
                f1,
            });
        }
    }
    best
}

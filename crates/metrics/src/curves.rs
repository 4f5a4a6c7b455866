//! Ranking-quality curves: ROC and precision-recall.
//!
//! Both curves are built from the same cumulative count sweep: records
//! are visited by decreasing score and one point is emitted per distinct
//! score value.

use mia_audit_core::{LabelVector, MiaError, Result};
use serde::Serialize;

use crate::record::check_inputs;

/// Cumulative counts at each distinct score, highest score first.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ClfCurve {
    /// Weighted false positives predicted at or above each threshold.
    pub fps: Vec<f64>,
    /// Weighted true positives predicted at or above each threshold.
    pub tps: Vec<f64>,
    /// Distinct scores in decreasing order.
    pub thresholds: Vec<f64>,
}

/// Sweep thresholds from the highest score down, accumulating counts.
///
/// Inputs must already have passed [`check_inputs`].
pub(crate) fn binary_clf_curve(
    scores: &[f64],
    labels: &LabelVector,
    weights: Option<&[f64]>,
) -> ClfCurve {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut curve = ClfCurve {
        fps: Vec::new(),
        tps: Vec::new(),
        thresholds: Vec::new(),
    };
    let mut tp = 0.0;
    let mut fp = 0.0;
    for (pos, &i) in order.iter().enumerate() {
        let w = weights.map_or(1.0, |w| w[i]);
        if labels.is_member(i) {
            tp += w;
        } else {
            fp += w;
        }
        let last_of_group = order
            .get(pos + 1)
            .map_or(true, |&next| scores[next] != scores[i]);
        if last_of_group {
            curve.tps.push(tp);
            curve.fps.push(fp);
            curve.thresholds.push(scores[i]);
        }
    }
    curve
}

/// Receiver operating characteristic curve, ordered by decreasing threshold.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RocCurve {
    /// False-positive rates, non-decreasing.
    pub fpr: Vec<f64>,
    /// True-positive rates, non-decreasing.
    pub tpr: Vec<f64>,
    /// Decision thresholds; the first is `+inf`.
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    /// Number of curve points.
    pub fn len(&self) -> usize {
        self.fpr.len()
    }

    /// True if the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.fpr.is_empty()
    }

    /// Trapezoidal area under the curve, clamped to `[0, 1]`.
    pub fn area(&self) -> f64 {
        trapezoid(&self.fpr, &self.tpr).clamp(0.0, 1.0)
    }

    /// TPR at the first point with FPR at or above `target`.
    pub fn tpr_at_fpr(&self, target: f64) -> f64 {
        tpr_at_fpr(&self.fpr, &self.tpr, target)
    }
}

/// Compute the ROC curve.
///
/// Collinear intermediate points are dropped and an origin point with an
/// infinite threshold is prepended. When the labels contain a single
/// class the corresponding rate stays at 0 instead of dividing by zero.
pub fn roc_curve(
    scores: &[f64],
    labels: &LabelVector,
    weights: Option<&[f64]>,
) -> Result<RocCurve> {
    check_inputs("scores", scores, labels, weights)?;
    Ok(build_roc_curve(scores, labels, weights))
}

pub(crate) fn build_roc_curve(
    scores: &[f64],
    labels: &LabelVector,
    weights: Option<&[f64]>,
) -> RocCurve {
    let clf = binary_clf_curve(scores, labels, weights);
    let keep = collinear_filter(&clf.fps, &clf.tps);

    let mut fps = Vec::with_capacity(keep.len() + 1);
    let mut tps = Vec::with_capacity(keep.len() + 1);
    let mut thresholds = Vec::with_capacity(keep.len() + 1);
    fps.push(0.0);
    tps.push(0.0);
    thresholds.push(f64::INFINITY);
    for &i in &keep {
        fps.push(clf.fps[i]);
        tps.push(clf.tps[i]);
        thresholds.push(clf.thresholds[i]);
    }

    RocCurve {
        fpr: normalize_counts(&fps),
        tpr: normalize_counts(&tps),
        thresholds,
    }
}

/// Indices of points that are not collinear with both neighbours.
fn collinear_filter(fps: &[f64], tps: &[f64]) -> Vec<usize> {
    let n = fps.len();
    if n <= 2 {
        return (0..n).collect();
    }
    let second_diff = |v: &[f64], i: usize| (v[i + 1] - v[i]) - (v[i] - v[i - 1]);
    let mut keep = Vec::with_capacity(n);
    keep.push(0);
    for i in 1..n - 1 {
        if second_diff(fps, i) != 0.0 || second_diff(tps, i) != 0.0 {
            keep.push(i);
        }
    }
    keep.push(n - 1);
    keep
}

fn normalize_counts(counts: &[f64]) -> Vec<f64> {
    let total = counts.last().copied().unwrap_or(0.0);
    if total <= 0.0 {
        return vec![0.0; counts.len()];
    }
    counts.iter().map(|c| c / total).collect()
}

/// Precision-recall curve, ordered by increasing threshold.
///
/// The final point `(recall 0, precision 1)` has no threshold, so
/// `thresholds` is one element shorter than the other two sequences.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PrCurve {
    /// Precision at each point.
    pub precision: Vec<f64>,
    /// Recall at each point, non-increasing.
    pub recall: Vec<f64>,
    /// Distinct scores in increasing order.
    pub thresholds: Vec<f64>,
}

/// Compute the precision-recall curve.
///
/// Recall is 1 everywhere when there are no members.
pub fn precision_recall_curve(
    scores: &[f64],
    labels: &LabelVector,
    weights: Option<&[f64]>,
) -> Result<PrCurve> {
    check_inputs("scores", scores, labels, weights)?;
    Ok(build_pr_curve(scores, labels, weights))
}

pub(crate) fn build_pr_curve(
    scores: &[f64],
    labels: &LabelVector,
    weights: Option<&[f64]>,
) -> PrCurve {
    let clf = binary_clf_curve(scores, labels, weights);
    let total_tp = clf.tps.last().copied().unwrap_or(0.0);

    let mut precision = Vec::with_capacity(clf.tps.len() + 1);
    let mut recall = Vec::with_capacity(clf.tps.len() + 1);
    for (&tp, &fp) in clf.tps.iter().zip(&clf.fps).rev() {
        let predicted = tp + fp;
        precision.push(if predicted != 0.0 { tp / predicted } else { 0.0 });
        recall.push(if total_tp > 0.0 { tp / total_tp } else { 1.0 });
    }
    precision.push(1.0);
    recall.push(0.0);

    let mut thresholds = clf.thresholds;
    thresholds.reverse();
    PrCurve {
        precision,
        recall,
        thresholds,
    }
}

impl PrCurve {
    /// Step-wise average precision: recall increments weighted by precision.
    ///
    /// Clamped to `[0, 1]`; the recall steps can round past 1.
    pub fn average_precision(&self) -> f64 {
        self.recall
            .windows(2)
            .zip(&self.precision)
            .map(|(r, &p)| (r[0] - r[1]) * p)
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }

    /// Trapezoidal area over the recall axis, clamped to `[0, 1]`.
    pub fn area(&self) -> f64 {
        trapezoid(&self.recall, &self.precision).clamp(0.0, 1.0)
    }
}

/// Average precision of `scores` against `labels`.
pub fn average_precision(
    scores: &[f64],
    labels: &LabelVector,
    weights: Option<&[f64]>,
) -> Result<f64> {
    Ok(precision_recall_curve(scores, labels, weights)?.average_precision())
}

/// Area under a curve sampled at monotonic `x`.
///
/// Fails when `x` is neither non-decreasing nor non-increasing or the
/// lengths differ.
pub fn auc(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(MiaError::invalid(format!(
            "x has {} points, y has {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(MiaError::invalid(
            "at least 2 points are needed to compute area under curve",
        ));
    }
    let increasing = x.windows(2).all(|w| w[1] >= w[0]);
    let decreasing = x.windows(2).all(|w| w[1] <= w[0]);
    if !increasing && !decreasing {
        return Err(MiaError::invalid("x is neither increasing nor decreasing"));
    }
    Ok(trapezoid(x, y))
}

/// Trapezoidal rule; the sign is normalized for decreasing `x`.
fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    let area: f64 = x
        .windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[1] + ys[0]) / 2.0)
        .sum();
    area.abs()
}

/// TPR at the first index whose FPR is at least `target`.
///
/// Falls back to index 0 when no point reaches the target. No
/// interpolation is performed.
pub fn tpr_at_fpr(fpr: &[f64], tpr: &[f64], target: f64) -> f64 {
    let idx = fpr.iter().position(|&f| f >= target).unwrap_or(0);
    tpr.get(idx).copied().unwrap_or(0.0)
}

//! Per-method metric computation.

use mia_audit_core::{LabelVector, MiaError, Result};
use serde::Serialize;
use tracing::warn;

use crate::classification::{median, sweep_best_f1, ConfusionCounts};
use crate::curves::{build_pr_curve, build_roc_curve, RocCurve};

/// FPR targets for the reported operating points.
pub const FPR_TARGETS: [f64; 2] = [0.01, 0.1];

/// Metrics for one attack method.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricRecord {
    /// Accuracy with the median score as threshold.
    pub accuracy_median: f64,
    /// Accuracy at the F1-maximizing threshold.
    pub accuracy_best: f64,
    /// Area under the ROC curve.
    pub aucroc: f64,
    /// Average precision.
    pub average_precision: f64,
    /// Trapezoidal area under the precision-recall curve.
    pub pr_auc: f64,
    /// F1 with the median score as threshold.
    pub f1_median: f64,
    /// F1 at the F1-maximizing threshold.
    pub f1_best: f64,
    /// TPR at the first ROC point with FPR >= 0.01.
    pub tpr_at_fpr_001: f64,
    /// TPR at the first ROC point with FPR >= 0.1.
    pub tpr_at_fpr_01: f64,
    /// Median of the scores.
    #[serde(skip)]
    pub median_threshold: f64,
    /// F1-maximizing threshold.
    #[serde(skip)]
    pub best_threshold: f64,
    /// Full ROC curve, kept for plotting only.
    #[serde(skip)]
    pub roc: RocCurve,
}

impl MetricRecord {
    /// Names of the scalar metrics, in report order.
    pub const COLUMNS: [&'static str; 9] = [
        "accuracy_median",
        "accuracy_best",
        "aucroc",
        "average_precision",
        "pr_auc",
        "f1_median",
        "f1_best",
        "tpr_at_fpr_001",
        "tpr_at_fpr_01",
    ];

    /// Scalar metrics paired with their names, in report order.
    pub fn scalars(&self) -> [(&'static str, f64); 9] {
        let values = [
            self.accuracy_median,
            self.accuracy_best,
            self.aucroc,
            self.average_precision,
            self.pr_auc,
            self.f1_median,
            self.f1_best,
            self.tpr_at_fpr_001,
            self.tpr_at_fpr_01,
        ];
        std::array::from_fn(|i| (Self::COLUMNS[i], values[i]))
    }
}

/// Validate one method's inputs.
///
/// Scores must match the labels in length and be finite; weights, when
/// given, must match in length, be finite and non-negative, and have a
/// positive sum.
pub fn check_inputs(
    method: &str,
    scores: &[f64],
    labels: &LabelVector,
    weights: Option<&[f64]>,
) -> Result<()> {
    if scores.is_empty() {
        return Err(MiaError::invalid(format!(
            "method '{method}' has an empty score vector"
        )));
    }
    if scores.len() != labels.len() {
        return Err(MiaError::invalid(format!(
            "method '{method}' has {} scores but there are {} labels",
            scores.len(),
            labels.len()
        )));
    }
    if let Some((index, &value)) = scores.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(MiaError::NonFiniteScore {
            method: method.to_string(),
            index,
            value,
        });
    }
    if let Some(w) = weights {
        if w.len() != scores.len() {
            return Err(MiaError::invalid(format!(
                "{} sample weights for {} scores",
                w.len(),
                scores.len()
            )));
        }
        if w.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(MiaError::invalid(
                "sample weights must be finite and non-negative",
            ));
        }
        if w.iter().sum::<f64>() <= 0.0 {
            return Err(MiaError::invalid("sample weights must have a positive sum"));
        }
    }
    Ok(())
}

/// Compute every metric for one score vector.
pub fn compute_metrics(scores: &[f64], labels: &LabelVector) -> Result<MetricRecord> {
    compute_metrics_weighted(scores, labels, None)
}

/// Compute every metric for one score vector with optional sample weights.
///
/// Weights apply to accuracy, F1 and average precision. The ROC curve and
/// the two curve areas are computed unweighted.
pub fn compute_metrics_weighted(
    scores: &[f64],
    labels: &LabelVector,
    weights: Option<&[f64]>,
) -> Result<MetricRecord> {
    check_inputs("scores", scores, labels, weights)?;

    let median_threshold = median(scores);
    let at_median = ConfusionCounts::tally(scores, labels, median_threshold, weights);

    let best = sweep_best_f1(scores, labels, weights)
        .ok_or_else(|| MiaError::invalid("no threshold candidates"))?;
    let at_best = ConfusionCounts::tally(scores, labels, best.threshold, weights);

    let roc = build_roc_curve(scores, labels, None);
    let aucroc = if labels.is_single_class() {
        warn!(
            members = labels.num_members(),
            records = labels.len(),
            "labels contain a single class; AUC-ROC reported as 0.5"
        );
        0.5
    } else {
        roc.area()
    };

    let average_precision = build_pr_curve(scores, labels, weights).average_precision();
    let pr_auc = build_pr_curve(scores, labels, None).area();

    if roc.thresholds.len() <= 2 {
        warn!("all scores are identical; threshold metrics are degenerate");
    }

    Ok(MetricRecord {
        accuracy_median: at_median.accuracy(),
        accuracy_best: at_best.accuracy(),
        aucroc,
        average_precision,
        pr_auc,
        f1_median: at_median.f1(),
        f1_best: at_best.f1(),
        tpr_at_fpr_001: roc.tpr_at_fpr(FPR_TARGETS[0]),
        tpr_at_fpr_01: roc.tpr_at_fpr(FPR_TARGETS[1]),
        median_threshold,
        best_threshold: best.threshold,
        roc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn labels(v: &[u8]) -> LabelVector {
        LabelVector::new(v.to_vec()).unwrap()
    }

    #[test]
    fn perfect_separation() {
        let rec = compute_metrics(&[0.9, 0.8, 0.3, 0.1], &labels(&[1, 1, 0, 0])).unwrap();
        assert_eq!(rec.aucroc, 1.0);
        assert_eq!(rec.average_precision, 1.0);
        assert_eq!(rec.accuracy_best, 1.0);
        assert_eq!(rec.f1_best, 1.0);
        assert_eq!(rec.accuracy_median, 1.0);
        assert_eq!(rec.best_threshold, 0.3);
        assert!((rec.median_threshold - 0.55).abs() < 1e-12);
        assert_eq!(rec.tpr_at_fpr_001, 1.0);
        assert_eq!(rec.pr_auc, 1.0);
    }

    #[test]
    fn tie_break_threshold_is_smallest() {
        let rec = compute_metrics(&[0.1, 0.2, 0.2, 0.3], &labels(&[0, 1, 1, 0])).unwrap();
        assert_eq!(rec.best_threshold, 0.1);
        assert!((rec.f1_best - 0.8).abs() < 1e-12);
        assert!((rec.accuracy_best - 0.75).abs() < 1e-12);
    }

    #[test]
    fn single_unique_score_is_absorbed() {
        let rec = compute_metrics(&[0.4, 0.4, 0.4], &labels(&[1, 0, 1])).unwrap();
        assert_eq!(rec.f1_best, 0.0);
        assert_eq!(rec.f1_median, 0.0);
        assert!((rec.accuracy_best - 1.0 / 3.0).abs() < 1e-12);
        assert!((rec.aucroc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_class_labels_are_absorbed() {
        let rec = compute_metrics(&[0.1, 0.5, 0.9], &labels(&[0, 0, 0])).unwrap();
        assert_eq!(rec.aucroc, 0.5);
        assert_eq!(rec.average_precision, 0.0);
        assert_eq!(rec.f1_best, 0.0);
        assert_eq!(rec.tpr_at_fpr_01, 0.0);
        for (_, v) in rec.scalars() {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn rejects_length_mismatch_and_non_finite() {
        assert!(matches!(
            compute_metrics(&[0.1, 0.2], &labels(&[1])),
            Err(MiaError::InvalidInput { .. })
        ));
        assert!(matches!(
            compute_metrics(&[0.1, f64::NAN], &labels(&[1, 0])),
            Err(MiaError::NonFiniteScore { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_bad_weights() {
        let y = labels(&[1, 0]);
        assert!(compute_metrics_weighted(&[0.1, 0.2], &y, Some(&[1.0])).is_err());
        assert!(compute_metrics_weighted(&[0.1, 0.2], &y, Some(&[1.0, -1.0])).is_err());
        assert!(compute_metrics_weighted(&[0.1, 0.2], &y, Some(&[0.0, 0.0])).is_err());
    }

    #[test]
    fn unit_weights_match_unweighted() {
        let scores = [0.3, 0.7, 0.2, 0.9, 0.5];
        let y = labels(&[0, 1, 0, 1, 1]);
        let plain = compute_metrics(&scores, &y).unwrap();
        let weighted = compute_metrics_weighted(&scores, &y, Some(&[1.0; 5])).unwrap();
        assert_eq!(plain, weighted);
    }

    #[test]
    fn weights_move_average_precision_only() {
        let scores = [0.9, 0.8, 0.7, 0.6];
        let y = labels(&[1, 0, 1, 0]);
        let plain = compute_metrics(&scores, &y).unwrap();
        let weighted = compute_metrics_weighted(&scores, &y, Some(&[1.0, 1.0, 3.0, 1.0])).unwrap();
        assert!((plain.average_precision - 5.0 / 6.0).abs() < 1e-12);
        assert!((weighted.average_precision - 0.85).abs() < 1e-12);
        assert_eq!(weighted.aucroc, plain.aucroc);
        assert_eq!(weighted.pr_auc, plain.pr_auc);
        assert_eq!(weighted.roc, plain.roc);
    }

    #[test]
    fn round_off_does_not_push_scalars_past_one() {
        let scores = [4.1, 4.3, 2.0, 2.5, 2.1, -0.8, -4.2, -0.9, -3.7];
        let rec = compute_metrics(&scores, &labels(&[1; 9])).unwrap();
        assert_eq!(rec.average_precision, 1.0);
        assert_eq!(rec.pr_auc, 1.0);
        for (name, v) in rec.scalars() {
            assert!((0.0..=1.0).contains(&v), "{name} = {v}");
        }
    }

    #[test]
    fn scalars_follow_column_order() {
        let rec = compute_metrics(&[0.9, 0.1], &labels(&[1, 0])).unwrap();
        let names: Vec<&str> = rec.scalars().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, MetricRecord::COLUMNS.to_vec());
        assert_eq!(rec.scalars()[2].1, rec.aucroc);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn metrics_are_deterministic_and_bounded(
            pairs in prop::collection::vec((-50.0f64..50.0, 0u8..2), 1..40),
        ) {
            let scores: Vec<f64> = pairs.iter().map(|(s, _)| *s).collect();
            let y = LabelVector::new(pairs.iter().map(|(_, l)| *l).collect()).unwrap();
            let a = compute_metrics(&scores, &y).unwrap();
            let b = compute_metrics(&scores, &y).unwrap();
            for ((_, x), (_, z)) in a.scalars().iter().zip(b.scalars().iter()) {
                prop_assert_eq!(x.to_bits(), z.to_bits());
            }
            prop_assert_eq!(&a.roc, &b.roc);
            for (name, v) in a.scalars() {
                prop_assert!((0.0..=1.0).contains(&v), "{} = {}", name, v);
            }
        }

        #[test]
        fn best_f1_dominates_every_candidate(
            pairs in prop::collection::vec((0.0f64..1.0, 0u8..2), 1..30),
        ) {
            let scores: Vec<f64> = pairs.iter().map(|(s, _)| *s).collect();
            let y = LabelVector::new(pairs.iter().map(|(_, l)| *l).collect()).unwrap();
            let rec = compute_metrics(&scores, &y).unwrap();
            for &t in &scores {
                let f1 = ConfusionCounts::at_threshold(&scores, &y, t, None).unwrap().f1();
                prop_assert!(f1 <= rec.f1_best);
                if f1 == rec.f1_best {
                    prop_assert!(rec.best_threshold <= t);
                }
            }
        }
    }
}

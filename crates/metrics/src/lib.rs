//! Metric engine for membership-inference attack scores.
//!
//! Everything here is a pure function of `(scores, labels)`: threshold
//! classification metrics, ROC and precision-recall curves, and the
//! per-method [`MetricRecord`] that combines them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classification;
mod curves;
mod record;
mod synthetic;

pub use classification::{
    accuracy_at, best_f1_threshold, distinct_thresholds, f1_at, median, BestThreshold,
    ConfusionCounts,
};
pub use curves::{
    auc, average_precision, precision_recall_curve, roc_curve, tpr_at_fpr, PrCurve, RocCurve,
};
pub use record::{check_inputs, compute_metrics, compute_metrics_weighted, MetricRecord, FPR_TARGETS};
pub use synthetic::synthetic_scores;

/// Common imports for metric computation.
pub mod prelude {
    pub use crate::{
        auc, average_precision, best_f1_threshold, check_inputs, compute_metrics,
        compute_metrics_weighted, precision_recall_curve, roc_curve, synthetic_scores,
        tpr_at_fpr, BestThreshold, ConfusionCounts, MetricRecord, PrCurve, RocCurve,
    };
}

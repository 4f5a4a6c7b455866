//! Facade crate re-exporting the stable membership-inference audit API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use mia_audit_attack as attack;
pub use mia_audit_core as core;
pub use mia_audit_metrics as metrics;

pub use attack::{
    evaluate_score_set, load_predictions, save_predictions, AttackInputs, AttackRunContext,
    AttackSession, CsvReportWriter, EvaluationPipeline, EvaluationResultTable,
    MembershipInferenceAttack, MethodResult, NoPlot, PlotRenderer, ReportWriter,
    RocCurveTableRenderer,
};
pub use core::{
    AttackModel, AttackModelConfig, AttackParams, AttackScores, AuditConfig, DataTable,
    DatasetProvider, LabelVector, MembershipDataLoader, MiaError, Result, ScoreSet, ScoreVector,
};
pub use metrics::{
    auc, average_precision, best_f1_threshold, compute_metrics, compute_metrics_weighted,
    precision_recall_curve, roc_curve, synthetic_scores, tpr_at_fpr, MetricRecord, PrCurve,
    RocCurve, FPR_TARGETS,
};

/// Convenience prelude covering the common audit building blocks.
pub mod prelude {
    pub use mia_audit_attack::prelude::*;
    pub use mia_audit_core::prelude::*;
    pub use mia_audit_metrics::prelude::*;
}

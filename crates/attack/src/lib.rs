//! Attack contract and evaluation orchestration.
//!
//! An attack variant produces a [`ScoreSet`](mia_audit_core::ScoreSet);
//! this crate turns it into an [`EvaluationResultTable`], hands curves and
//! the table to the plotting and reporting collaborators, and persists raw
//! predictions for later re-evaluation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod evaluation;
pub mod predictions;
pub mod report;
pub mod session;

pub use context::{ensure_dir, AttackRunContext};
pub use evaluation::{evaluate_score_set, EvaluationPipeline, EvaluationResultTable, MethodResult};
pub use predictions::{load_predictions, predictions_path, save_predictions, PREDICTIONS_SUFFIX};
pub use report::{
    escape_field, roc_legend, roc_plot_file_name, CsvReportWriter, NoPlot, PlotRenderer,
    ReportWriter, RocCurveTableRenderer, METHOD_COLUMN,
};
pub use session::{AttackInputs, AttackSession, MembershipInferenceAttack};

/// Common imports for implementing and evaluating attacks.
pub mod prelude {
    pub use crate::{
        evaluate_score_set, AttackInputs, AttackRunContext, AttackSession, CsvReportWriter,
        EvaluationPipeline, EvaluationResultTable, MembershipInferenceAttack, MethodResult,
        PlotRenderer, ReportWriter, RocCurveTableRenderer,
    };
}

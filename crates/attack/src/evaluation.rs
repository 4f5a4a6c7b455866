//! Evaluation orchestration over every method of a score set.

use std::path::Path;

use mia_audit_core::{LabelVector, Result, ScoreSet};
use mia_audit_metrics::{check_inputs, compute_metrics_weighted, MetricRecord};
use tracing::debug;

use crate::report::{CsvReportWriter, PlotRenderer, ReportWriter, RocCurveTableRenderer};

/// Metrics for one named method.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodResult {
    /// Method name.
    pub method: String,
    /// Computed metrics.
    pub record: MetricRecord,
}

/// Per-method results in score-set order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationResultTable {
    results: Vec<MethodResult>,
}

impl EvaluationResultTable {
    /// Number of methods.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when no method was evaluated.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, MethodResult> {
        self.results.iter()
    }

    /// Metrics for `method`.
    pub fn get(&self, method: &str) -> Option<&MetricRecord> {
        self.results
            .iter()
            .find(|r| r.method == method)
            .map(|r| &r.record)
    }
}

impl IntoIterator for EvaluationResultTable {
    type Item = MethodResult;
    type IntoIter = std::vec::IntoIter<MethodResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a EvaluationResultTable {
    type Item = &'a MethodResult;
    type IntoIter = std::slice::Iter<'a, MethodResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Compute metrics for every method, preserving score-set order.
///
/// All inputs are validated before any metric is computed, so a defective
/// score vector aborts the evaluation as a whole.
pub fn evaluate_score_set(
    scores: &ScoreSet,
    labels: &LabelVector,
    weights: Option<&[f64]>,
) -> Result<EvaluationResultTable> {
    for (method, values) in scores.iter() {
        check_inputs(method, values, labels, weights)?;
    }

    let mut results = Vec::with_capacity(scores.len());
    for (method, values) in scores.iter() {
        let record = compute_metrics_weighted(values, labels, weights)?;
        debug!(
            method,
            aucroc = record.aucroc,
            average_precision = record.average_precision,
            f1_best = record.f1_best,
            "method evaluated"
        );
        results.push(MethodResult {
            method: method.to_string(),
            record,
        });
    }
    Ok(EvaluationResultTable { results })
}

/// Metric computation plus delegated plotting and reporting.
pub struct EvaluationPipeline {
    plotter: Box<dyn PlotRenderer>,
    reporter: Box<dyn ReportWriter>,
    weights: Option<Vec<f64>>,
}

impl Default for EvaluationPipeline {
    fn default() -> Self {
        Self::new(Box::new(RocCurveTableRenderer), Box::new(CsvReportWriter))
    }
}

impl EvaluationPipeline {
    /// Pipeline with the given collaborators.
    pub fn new(plotter: Box<dyn PlotRenderer>, reporter: Box<dyn ReportWriter>) -> Self {
        Self {
            plotter,
            reporter,
            weights: None,
        }
    }

    /// Apply per-record sample weights.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Evaluate `scores`, render each ROC curve and write the report to
    /// `output_dir/report_name`.
    pub fn run(
        &self,
        scores: &ScoreSet,
        labels: &LabelVector,
        output_dir: &Path,
        report_name: &str,
    ) -> Result<EvaluationResultTable> {
        let table = evaluate_score_set(scores, labels, self.weights.as_deref())?;
        for result in &table {
            self.plotter
                .render_roc(output_dir, &result.method, &result.record)?;
        }
        self.reporter
            .write_report(&table, &output_dir.join(report_name))?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mia_audit_core::MiaError;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        plotted: Vec<String>,
        reported: Vec<usize>,
    }

    struct Recorder(Rc<RefCell<Calls>>);

    impl PlotRenderer for Recorder {
        fn render_roc(&self, dir: &Path, method: &str, _: &MetricRecord) -> Result<PathBuf> {
            self.0.borrow_mut().plotted.push(method.to_string());
            Ok(dir.to_path_buf())
        }
    }

    impl ReportWriter for Recorder {
        fn write_report(&self, table: &EvaluationResultTable, path: &Path) -> Result<PathBuf> {
            self.0.borrow_mut().reported.push(table.len());
            Ok(path.to_path_buf())
        }
    }

    fn recording_pipeline() -> (EvaluationPipeline, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let pipeline = EvaluationPipeline::new(
            Box::new(Recorder(calls.clone())),
            Box::new(Recorder(calls.clone())),
        );
        (pipeline, calls)
    }

    #[test]
    fn preserves_score_set_order() {
        let labels = LabelVector::new(vec![1, 0, 1, 0]).unwrap();
        let scores = ScoreSet::single("b", vec![0.9, 0.1, 0.8, 0.2])
            .with("a", vec![0.1, 0.9, 0.2, 0.8])
            .unwrap();
        let table = evaluate_score_set(&scores, &labels, None).unwrap();
        let names: Vec<&str> = table.iter().map(|r| r.method.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(table.get("b").unwrap().aucroc, 1.0);
        assert_eq!(table.get("a").unwrap().aucroc, 0.0);
    }

    #[test]
    fn degenerate_method_does_not_block_others() {
        let labels = LabelVector::new(vec![1, 0, 1]).unwrap();
        let scores = ScoreSet::single("flat", vec![0.5, 0.5, 0.5])
            .with("good", vec![0.9, 0.1, 0.8])
            .unwrap();
        let table = evaluate_score_set(&scores, &labels, None).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("flat").unwrap().f1_best, 0.0);
        assert_eq!(table.get("good").unwrap().f1_best, 1.0);
    }

    #[test]
    fn defective_method_aborts_before_side_effects() {
        let labels = LabelVector::new(vec![1, 0]).unwrap();
        let scores = ScoreSet::single("ok", vec![0.9, 0.1])
            .with("bad", vec![f64::INFINITY, 0.1])
            .unwrap();
        let (pipeline, calls) = recording_pipeline();
        let err = pipeline
            .run(&scores, &labels, Path::new("."), "eval.csv")
            .unwrap_err();
        assert!(matches!(err, MiaError::NonFiniteScore { ref method, .. } if method == "bad"));
        assert!(calls.borrow().plotted.is_empty());
        assert!(calls.borrow().reported.is_empty());
    }

    #[test]
    fn delegates_plot_per_method_and_one_report() {
        let labels = LabelVector::new(vec![1, 0]).unwrap();
        let scores = ScoreSet::single("x", vec![0.9, 0.1])
            .with("y", vec![0.2, 0.3])
            .unwrap();
        let (pipeline, calls) = recording_pipeline();
        pipeline
            .run(&scores, &labels, Path::new("."), "eval.csv")
            .unwrap();
        assert_eq!(calls.borrow().plotted, vec!["x", "y"]);
        assert_eq!(calls.borrow().reported, vec![2]);
    }

    #[test]
    fn empty_score_set_still_reports() {
        let labels = LabelVector::new(vec![1]).unwrap();
        let (pipeline, calls) = recording_pipeline();
        let table = pipeline
            .run(&ScoreSet::new(), &labels, Path::new("."), "eval.csv")
            .unwrap();
        assert!(table.is_empty());
        assert_eq!(calls.borrow().reported, vec![0]);
    }

    #[test]
    fn weights_flow_into_metrics() {
        let labels = LabelVector::new(vec![1, 1, 0]).unwrap();
        let scores = ScoreSet::single("m", vec![0.9, 0.1, 0.8]);
        let (pipeline, _) = recording_pipeline();
        let table = pipeline
            .with_weights(vec![2.0, 1.0, 1.0])
            .run(&scores, &labels, Path::new("."), "eval.csv")
            .unwrap();
        let plain = evaluate_score_set(&scores, &labels, None).unwrap();
        assert_ne!(
            table.get("m").unwrap().accuracy_median,
            plain.get("m").unwrap().accuracy_median
        );
    }
}

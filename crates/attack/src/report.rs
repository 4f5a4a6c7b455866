//! Report and plot collaborators.
//!
//! The orchestrator hands each method's ROC curve to a [`PlotRenderer`]
//! and the finished table to a [`ReportWriter`]; it performs no file
//! writes itself.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub use mia_audit_core::escape_field;
use mia_audit_core::{MiaError, Result};
use mia_audit_metrics::MetricRecord;
use tracing::{debug, info};

use crate::evaluation::EvaluationResultTable;

/// Column holding the method name in the evaluation report.
pub const METHOD_COLUMN: &str = "method";

/// Persists an evaluation table.
pub trait ReportWriter {
    /// Write `table` to `path`, returning the path written.
    fn write_report(&self, table: &EvaluationResultTable, path: &Path) -> Result<PathBuf>;
}

/// Renders one method's ROC curve.
pub trait PlotRenderer {
    /// Render the curve of `record` for `method` inside `dir`, returning
    /// the path of what was written.
    fn render_roc(&self, dir: &Path, method: &str, record: &MetricRecord) -> Result<PathBuf>;
}

/// File name of the ROC image for `method`.
pub fn roc_plot_file_name(method: &str) -> String {
    format!("roc_plot_{method}.png")
}

/// Legend line for a method's ROC curve.
pub fn roc_legend(method: &str, record: &MetricRecord) -> String {
    format!(
        "{method} attack, auc={:.3}, ap={:.3}",
        record.aucroc, record.average_precision
    )
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| MiaError::io(path, e))
}

/// Comma-separated report, one row per method.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvReportWriter;

impl CsvReportWriter {
    fn write_rows(table: &EvaluationResultTable, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "{},{}", MetricRecord::COLUMNS.join(","), METHOD_COLUMN)?;
        for result in table.iter() {
            for (_, value) in result.record.scalars() {
                write!(out, "{value:?},")?;
            }
            writeln!(out, "{}", escape_field(&result.method))?;
        }
        out.flush()
    }
}

impl ReportWriter for CsvReportWriter {
    fn write_report(&self, table: &EvaluationResultTable, path: &Path) -> Result<PathBuf> {
        let mut out = create(path)?;
        Self::write_rows(table, &mut out).map_err(|e| MiaError::io(path, e))?;
        info!(path = %path.display(), methods = table.len(), "evaluation results saved");
        Ok(path.to_path_buf())
    }
}

/// Writes ROC curve points for an external plotting tool.
///
/// Produces `roc_plot_{method}.csv` with `fpr,tpr,threshold` columns,
/// preceded by a `#` comment carrying the legend.
#[derive(Clone, Copy, Debug, Default)]
pub struct RocCurveTableRenderer;

impl PlotRenderer for RocCurveTableRenderer {
    fn render_roc(&self, dir: &Path, method: &str, record: &MetricRecord) -> Result<PathBuf> {
        let path = dir.join(roc_plot_file_name(method)).with_extension("csv");
        let mut out = create(&path)?;
        let roc = &record.roc;
        let emit = |out: &mut BufWriter<File>| -> std::io::Result<()> {
            writeln!(out, "# {}", roc_legend(method, record))?;
            writeln!(out, "fpr,tpr,threshold")?;
            for ((fpr, tpr), threshold) in roc.fpr.iter().zip(&roc.tpr).zip(&roc.thresholds) {
                writeln!(out, "{fpr:?},{tpr:?},{threshold:?}")?;
            }
            out.flush()
        };
        emit(&mut out).map_err(|e| MiaError::io(&path, e))?;
        debug!(path = %path.display(), points = roc.len(), "roc curve written");
        Ok(path)
    }
}

/// Renderer that draws nothing and returns the output directory.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPlot;

impl PlotRenderer for NoPlot {
    fn render_roc(&self, dir: &Path, _method: &str, _record: &MetricRecord) -> Result<PathBuf> {
        Ok(dir.to_path_buf())
    }
}

//! Raw score persistence, so runs can be re-evaluated without rescoring.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use mia_audit_core::{read_table, MiaError, Result, ScoreSet, TableFormat};
use tracing::info;

use crate::report::escape_field;

/// Suffix identifying prediction files.
pub const PREDICTIONS_SUFFIX: &str = "_predictions.csv";

/// Prediction file for `method` inside `dir`.
pub fn predictions_path(dir: &Path, method: &str) -> PathBuf {
    dir.join(format!("{method}{PREDICTIONS_SUFFIX}"))
}

/// Write one single-column file per method, headed by `column`.
pub fn save_predictions(dir: &Path, scores: &ScoreSet, column: &str) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(scores.len());
    for (method, values) in scores.iter() {
        let path = predictions_path(dir, method);
        let file = File::create(&path).map_err(|e| MiaError::io(&path, e))?;
        let mut out = BufWriter::new(file);
        let emit = |out: &mut BufWriter<File>| -> std::io::Result<()> {
            writeln!(out, "{}", escape_field(column))?;
            for v in values {
                writeln!(out, "{v:?}")?;
            }
            out.flush()
        };
        emit(&mut out).map_err(|e| MiaError::io(&path, e))?;
        written.push(path);
    }
    info!(dir = %dir.display(), methods = written.len(), "predictions saved");
    Ok(written)
}

/// Recover every method's scores from `dir`, ordered by file name.
pub fn load_predictions(dir: &Path) -> Result<ScoreSet> {
    let entries = std::fs::read_dir(dir).map_err(|e| MiaError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MiaError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(method) = name.strip_suffix(PREDICTIONS_SUFFIX) {
            files.push((method.to_string(), entry.path()));
        }
    }
    files.sort();

    let mut set = ScoreSet::new();
    for (method, path) in files {
        let table = read_table(&path, TableFormat::CSV)?;
        if table.column_labels.len() != 1 {
            return Err(MiaError::parse(
                &path,
                format!(
                    "expected a single score column, found {}",
                    table.column_labels.len()
                ),
            ));
        }
        set.insert(method, table.values.column(0).to_vec())?;
    }
    info!(dir = %dir.display(), methods = set.len(), "predictions loaded");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_recovers_names_and_values() {
        let tmp = tempfile::tempdir().unwrap();
        let scores = ScoreSet::single("logan", vec![0.1, 1.0 / 3.0, -2.5e-9])
            .with("dcr_l2", vec![7.0, 0.0])
            .unwrap();
        save_predictions(tmp.path(), &scores, "is_member").unwrap();
        assert!(tmp.path().join("logan_predictions.csv").exists());

        let loaded = load_predictions(tmp.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("logan"), scores.get("logan"));
        assert_eq!(loaded.get("dcr_l2"), scores.get("dcr_l2"));
        let names: Vec<&str> = loaded.methods().collect();
        assert_eq!(names, vec!["dcr_l2", "logan"]);
    }

    #[test]
    fn unrelated_files_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("eval.csv"), "a\n1\n").unwrap();
        std::fs::write(tmp.path().join("m_predictions.csv"), "is_member\n0.5\n").unwrap();
        let loaded = load_predictions(tmp.path()).unwrap();
        assert_eq!(loaded.get("m"), Some(&vec![0.5]));
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_predictions(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, MiaError::Io { .. }));
    }
}

//! Dataset loading for attack variants.
//!
//! Membership-test and reference tables are stored with records as
//! columns; they are transposed on load so that rows of the in-memory
//! matrix are the evaluated records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::info;

use crate::error::{MiaError, Result};
use crate::scores::LabelVector;

/// Numeric table with row and column labels.
#[derive(Clone, Debug, PartialEq)]
pub struct DataTable {
    /// Row labels (the index column, or positions when there is none).
    pub row_labels: Vec<String>,
    /// Column labels from the header row.
    pub column_labels: Vec<String>,
    /// Numeric body, `row_labels.len() x column_labels.len()`.
    pub values: Array2<f64>,
}

impl DataTable {
    /// Swap rows and columns, labels included.
    pub fn transpose(self) -> Self {
        Self {
            row_labels: self.column_labels,
            column_labels: self.row_labels,
            values: self.values.reversed_axes().as_standard_layout().into_owned(),
        }
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Column named `name`.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_labels.iter().position(|c| c == name)?;
        Some(self.values.column(idx).to_vec())
    }
}

/// Supplies the matrices an attack variant needs.
pub trait DatasetProvider {
    /// Synthetic records, one row per record.
    fn load_synthetic_data(&self) -> Result<Array2<f64>>;

    /// Records whose membership is tested, one row per record.
    fn load_membership_dataset(&self) -> Result<Array2<f64>>;

    /// Ground-truth membership labels, when a label file is configured.
    fn load_membership_labels(&self) -> Result<Option<LabelVector>>;

    /// Reference population, when a reference file is configured.
    fn load_reference_data(&self) -> Result<Option<DataTable>>;
}

/// Options for reading a delimited table.
#[derive(Clone, Copy, Debug)]
pub struct TableFormat {
    /// Field separator.
    pub separator: char,
    /// Whether the first column holds row labels.
    pub index_col: bool,
}

impl TableFormat {
    /// Comma-separated, no index column.
    pub const CSV: Self = Self {
        separator: ',',
        index_col: false,
    };

    /// Comma-separated with an index column.
    pub const INDEXED_CSV: Self = Self {
        separator: ',',
        index_col: true,
    };

    /// Tab-separated with an index column.
    pub const INDEXED_TSV: Self = Self {
        separator: '\t',
        index_col: true,
    };
}

/// Read a delimited numeric table with a header row.
pub fn read_table(path: &Path, format: TableFormat) -> Result<DataTable> {
    if !path.exists() {
        return Err(MiaError::missing(path));
    }
    let text = std::fs::read_to_string(path).map_err(|e| MiaError::io(path, e))?;
    parse_table(path, &text, format)
}

fn parse_table(path: &Path, text: &str, format: TableFormat) -> Result<DataTable> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| MiaError::parse(path, "file is empty"))?;
    let mut column_labels = split_record(header, format.separator);
    if format.index_col {
        if column_labels.is_empty() {
            return Err(MiaError::parse(path, "header has no index column"));
        }
        column_labels.remove(0);
    }

    let width = column_labels.len();
    let mut row_labels = Vec::new();
    let mut body = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let mut fields = split_record(line, format.separator);
        let label = if format.index_col {
            if fields.is_empty() {
                return Err(MiaError::parse(path, format!("row {} is empty", line_no + 1)));
            }
            fields.remove(0)
        } else {
            line_no.to_string()
        };
        if fields.len() != width {
            return Err(MiaError::parse(
                path,
                format!(
                    "row {} has {} fields, header has {}",
                    line_no + 1,
                    fields.len(),
                    width
                ),
            ));
        }
        for field in &fields {
            body.push(parse_number(field).ok_or_else(|| {
                MiaError::parse(
                    path,
                    format!("row {}: '{}' is not numeric", line_no + 1, field),
                )
            })?);
        }
        row_labels.push(label);
    }

    let values = Array2::from_shape_vec((row_labels.len(), width), body)
        .map_err(|e| MiaError::parse(path, e.to_string()))?;
    Ok(DataTable {
        row_labels,
        column_labels,
        values,
    })
}

fn parse_number(field: &str) -> Option<f64> {
    match field.to_ascii_lowercase().as_str() {
        "true" => Some(1.0),
        "false" => Some(0.0),
        other => other.parse().ok(),
    }
}

/// Split one delimited record, honouring double-quoted fields.
pub fn split_record(line: &str, separator: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => {
                fields.push(std::mem::take(&mut current).trim().to_string());
            }
            c => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
pub fn escape_field(field: &str) -> String {
    quote_field(field, ',')
}

fn quote_field(field: &str, separator: char) -> String {
    if field.contains([separator, '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write `table` so that [`read_table`] with the same format reads it back.
pub fn write_table(path: &Path, table: &DataTable, format: TableFormat) -> Result<()> {
    let file = File::create(path).map_err(|e| MiaError::io(path, e))?;
    let mut out = BufWriter::new(file);
    let sep = format.separator.to_string();
    let emit = |out: &mut BufWriter<File>| -> std::io::Result<()> {
        let mut header: Vec<String> = Vec::with_capacity(table.column_labels.len() + 1);
        if format.index_col {
            header.push(String::new());
        }
        header.extend(table.column_labels.iter().map(|c| quote_field(c, format.separator)));
        writeln!(out, "{}", header.join(sep.as_str()))?;
        for (label, row) in table.row_labels.iter().zip(table.values.rows()) {
            let mut fields: Vec<String> = Vec::with_capacity(row.len() + 1);
            if format.index_col {
                fields.push(quote_field(label, format.separator));
            }
            fields.extend(row.iter().map(|v| format!("{v:?}")));
            writeln!(out, "{}", fields.join(sep.as_str()))?;
        }
        out.flush()
    };
    emit(&mut out).map_err(|e| MiaError::io(path, e))
}

/// Dump named matrices into `dir` as `{name}.csv`, one file per matrix.
///
/// Columns are headed `0..n` and no index column is written, so each file
/// reads back with [`TableFormat::CSV`].
pub fn save_arrays(dir: &Path, names: &[&str], arrays: &[Array2<f64>]) -> Result<Vec<PathBuf>> {
    if names.len() != arrays.len() {
        return Err(MiaError::invalid(format!(
            "{} file names for {} arrays",
            names.len(),
            arrays.len()
        )));
    }
    let mut written = Vec::with_capacity(names.len());
    for (name, values) in names.iter().zip(arrays) {
        let path = dir.join(format!("{name}.csv"));
        let table = DataTable {
            row_labels: (0..values.nrows()).map(|i| i.to_string()).collect(),
            column_labels: (0..values.ncols()).map(|j| j.to_string()).collect(),
            values: values.clone(),
        };
        write_table(&path, &table, TableFormat::CSV)?;
        written.push(path);
    }
    info!(dir = %dir.display(), files = written.len(), "arrays saved");
    Ok(written)
}

/// File-backed [`DatasetProvider`].
#[derive(Clone, Debug)]
pub struct MembershipDataLoader {
    /// Synthetic data, comma-separated with a header row.
    pub synthetic_file: PathBuf,
    /// Membership-test data, tab-separated, records as columns.
    pub membership_test_file: PathBuf,
    /// Optional labels, comma-separated with an index column.
    pub membership_lbl_file: Option<PathBuf>,
    /// Label column to select from the label file.
    pub membership_label_col: String,
    /// Generator that produced the synthetic data.
    pub generator_model: String,
    /// Optional reference data, tab-separated, records as columns.
    pub reference_file: Option<PathBuf>,
}

impl DatasetProvider for MembershipDataLoader {
    fn load_synthetic_data(&self) -> Result<Array2<f64>> {
        let table = read_table(&self.synthetic_file, TableFormat::CSV)?;
        info!(
            generator = %self.generator_model,
            shape = ?table.shape(),
            "synthetic data loaded"
        );
        Ok(table.values)
    }

    fn load_membership_dataset(&self) -> Result<Array2<f64>> {
        let table = read_table(&self.membership_test_file, TableFormat::INDEXED_TSV)?.transpose();
        info!(shape = ?table.shape(), "membership test set loaded");
        Ok(table.values)
    }

    fn load_membership_labels(&self) -> Result<Option<LabelVector>> {
        let Some(path) = &self.membership_lbl_file else {
            return Ok(None);
        };
        let table = read_table(path, TableFormat::INDEXED_CSV)?;
        let column = table.column(&self.membership_label_col).ok_or_else(|| {
            MiaError::invalid(format!(
                "label column '{}' not found in {}",
                self.membership_label_col,
                path.display()
            ))
        })?;
        let labels = LabelVector::from_reals(&column)?;
        info!(len = labels.len(), "membership test labels loaded");
        Ok(Some(labels))
    }

    fn load_reference_data(&self) -> Result<Option<DataTable>> {
        let Some(path) = &self.reference_file else {
            return Ok(None);
        };
        let table = read_table(path, TableFormat::INDEXED_TSV)?.transpose();
        info!(shape = ?table.shape(), "reference data loaded");
        Ok(Some(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn loader(dir: &Path) -> MembershipDataLoader {
        MembershipDataLoader {
            synthetic_file: dir.join("synthetic.csv"),
            membership_test_file: dir.join("membership.tsv"),
            membership_lbl_file: Some(dir.join("labels.csv")),
            membership_label_col: "is_member".into(),
            generator_model: "ctgan".into(),
            reference_file: None,
        }
    }

    #[test]
    fn membership_dataset_is_transposed() {
        let dir = tempfile::tempdir().unwrap();
        // Three features (rows) by two records (columns).
        fs::write(
            dir.path().join("membership.tsv"),
            "feature\trec_a\trec_b\nf1\t1\t2\nf2\t3\t4\nf3\t5\t6\n",
        )
        .unwrap();
        let data = loader(dir.path()).load_membership_dataset().unwrap();
        assert_eq!(data.dim(), (2, 3));
        assert_eq!(data.row(0).to_vec(), vec![1.0, 3.0, 5.0]);
        assert_eq!(data.row(1).to_vec(), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn missing_membership_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader(dir.path()).load_membership_dataset().unwrap_err();
        assert!(err.is_missing_file());
    }

    #[test]
    fn labels_are_selected_by_column_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("labels.csv"),
            "id,batch,is_member\nrec_a,3,1\nrec_b,4,0\nrec_c,5,1\n",
        )
        .unwrap();
        let labels = loader(dir.path()).load_membership_labels().unwrap().unwrap();
        assert_eq!(labels.as_slice(), &[1, 0, 1]);
    }

    #[test]
    fn absent_label_and_reference_files_yield_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut l = loader(dir.path());
        l.membership_lbl_file = None;
        assert!(l.load_membership_labels().unwrap().is_none());
        assert!(l.load_reference_data().unwrap().is_none());
    }

    #[test]
    fn synthetic_data_keeps_row_orientation() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("synthetic.csv"), "a,b\n0.5,1\n2,\"3\"\n").unwrap();
        let data = loader(dir.path()).load_synthetic_data().unwrap();
        assert_eq!(data.dim(), (2, 2));
        assert_eq!(data[(1, 1)], 3.0);
    }

    #[test]
    fn non_numeric_field_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("synthetic.csv"), "a,b\n0.5,abc\n").unwrap();
        let err = loader(dir.path()).load_synthetic_data().unwrap_err();
        assert!(matches!(err, MiaError::Parse { .. }));
    }

    #[test]
    fn split_record_handles_quotes() {
        assert_eq!(
            split_record("x,\"a,b\",\"say \"\"hi\"\"\"", ','),
            vec!["x", "a,b", "say \"hi\""]
        );
    }

    #[test]
    fn escape_quotes_only_when_needed() {
        assert_eq!(escape_field("domias"), "domias");
        assert_eq!(escape_field("a\"b"), "\"a\"\"b\"");
        assert_eq!(escape_field("x,y"), "\"x,y\"");
    }

    #[test]
    fn saved_arrays_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let a = ndarray::array![[1.0, -2.5], [0.125, 3.0]];
        let b = ndarray::array![[7.0, 8.0, 9.0]];
        let paths = save_arrays(dir.path(), &["train", "holdout"], &[a.clone(), b.clone()]).unwrap();
        assert_eq!(paths[0], dir.path().join("train.csv"));
        assert_eq!(read_table(&paths[0], TableFormat::CSV).unwrap().values, a);
        assert_eq!(read_table(&paths[1], TableFormat::CSV).unwrap().values, b);
    }

    #[test]
    fn save_arrays_rejects_unpaired_names() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_arrays(dir.path(), &["only"], &[]).unwrap_err();
        assert!(matches!(err, MiaError::InvalidInput { .. }));
    }

    #[test]
    fn indexed_tsv_round_trips_through_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.tsv");
        let table = DataTable {
            row_labels: vec!["f1".into(), "f 2".into()],
            column_labels: vec!["rec_a".into(), "rec_b".into()],
            values: ndarray::array![[1.0, 2.0], [3.0, 4.0]],
        };
        write_table(&path, &table, TableFormat::INDEXED_TSV).unwrap();
        assert_eq!(read_table(&path, TableFormat::INDEXED_TSV).unwrap(), table);
    }
}

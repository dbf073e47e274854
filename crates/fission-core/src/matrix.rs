//! Labeled boolean matrices and the alignment utilities used by the
//! boundary-detection pipeline.
//!
//! The original analysis data arrives as adjacency tables whose row/column
//! labels are fully-qualified class or method names.  `BoolMatrix` keeps the
//! labels in insertion order (via `IndexSet`) and maps them to dense indices
//! once, so all matrix algebra runs on plain integer-indexed storage while
//! every observable iteration stays deterministic.

use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::errors::{FissionError, FissionResult};

// ---------------------------------------------------------------------------
// BoolMatrix
// ---------------------------------------------------------------------------

/// A dense boolean matrix with ordered string labels on both axes.
#[derive(Clone, Debug)]
pub struct BoolMatrix {
    rows: IndexSet<String>,
    cols: IndexSet<String>,
    /// Row-major storage, stride = `cols.len()`.
    data: Vec<bool>,
}

impl BoolMatrix {
    /// Create an all-false matrix with the given row and column labels.
    ///
    /// Duplicate labels are collapsed (first occurrence wins).
    pub fn new<R, C>(rows: R, cols: C) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows: IndexSet<String> = rows.into_iter().map(Into::into).collect();
        let cols: IndexSet<String> = cols.into_iter().map(Into::into).collect();
        let data = vec![false; rows.len() * cols.len()];
        Self { rows, cols, data }
    }

    /// Create an all-false square matrix with identical row and column labels.
    pub fn square<L>(labels: L) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
    {
        let labels: IndexSet<String> = labels.into_iter().map(Into::into).collect();
        let data = vec![false; labels.len() * labels.len()];
        Self {
            rows: labels.clone(),
            cols: labels,
            data,
        }
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.cols.len()
    }

    /// Row labels in insertion order.
    pub fn row_labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(String::as_str)
    }

    /// Column labels in insertion order.
    pub fn col_labels(&self) -> impl Iterator<Item = &str> {
        self.cols.iter().map(String::as_str)
    }

    pub fn has_row(&self, label: &str) -> bool {
        self.rows.contains(label)
    }

    pub fn has_col(&self, label: &str) -> bool {
        self.cols.contains(label)
    }

    #[inline]
    fn at(&self, ri: usize, ci: usize) -> bool {
        self.data[ri * self.cols.len() + ci]
    }

    #[inline]
    fn at_mut(&mut self, ri: usize, ci: usize) -> &mut bool {
        let stride = self.cols.len();
        &mut self.data[ri * stride + ci]
    }

    /// Read an entry by label. `None` when either label is unknown.
    pub fn get(&self, row: &str, col: &str) -> Option<bool> {
        let ri = self.rows.get_index_of(row)?;
        let ci = self.cols.get_index_of(col)?;
        Some(self.at(ri, ci))
    }

    /// Write an entry by label.  Returns false (and leaves the matrix
    /// untouched) when either label is unknown; callers building matrices
    /// from analysis records use this to drop references to library types.
    pub fn set(&mut self, row: &str, col: &str, value: bool) -> bool {
        match (self.rows.get_index_of(row), self.cols.get_index_of(col)) {
            (Some(ri), Some(ci)) => {
                *self.at_mut(ri, ci) = value;
                true
            }
            _ => false,
        }
    }

    fn same_labels(a: &IndexSet<String>, b: &IndexSet<String>) -> bool {
        a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
    }

    fn shape_err(context: &str, left: &Self, right: &Self) -> FissionError {
        FissionError::Shape {
            context: context.to_string(),
            left: format!("{}x{}", left.nrows(), left.ncols()),
            right: format!("{}x{}", right.nrows(), right.ncols()),
        }
    }

    /// Boolean matrix product: `out[i][k] = OR_j self[i][j] AND rhs[j][k]`.
    ///
    /// The column labels of `self` must equal the row labels of `rhs`
    /// (same labels, same order); anything else is a genuine shape error.
    pub fn matmul(&self, rhs: &BoolMatrix) -> FissionResult<BoolMatrix> {
        if !Self::same_labels(&self.cols, &rhs.rows) {
            return Err(Self::shape_err("matmul", self, rhs));
        }
        let mut out = BoolMatrix::new(self.rows.iter().cloned(), rhs.cols.iter().cloned());
        for ri in 0..self.nrows() {
            for j in 0..self.ncols() {
                if !self.at(ri, j) {
                    continue;
                }
                for ci in 0..rhs.ncols() {
                    if rhs.at(j, ci) {
                        *out.at_mut(ri, ci) = true;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Transposed copy (column labels become row labels and vice versa).
    pub fn transpose(&self) -> BoolMatrix {
        let mut out = BoolMatrix::new(self.cols.iter().cloned(), self.rows.iter().cloned());
        for ri in 0..self.nrows() {
            for ci in 0..self.ncols() {
                if self.at(ri, ci) {
                    *out.at_mut(ci, ri) = true;
                }
            }
        }
        out
    }

    /// Elementwise OR.  Both operands must carry identical labels.
    pub fn or(&self, rhs: &BoolMatrix) -> FissionResult<BoolMatrix> {
        if !Self::same_labels(&self.rows, &rhs.rows) || !Self::same_labels(&self.cols, &rhs.cols) {
            return Err(Self::shape_err("or", self, rhs));
        }
        let mut out = self.clone();
        for (o, r) in out.data.iter_mut().zip(rhs.data.iter()) {
            *o |= *r;
        }
        Ok(out)
    }

    /// Elementwise `self AND NOT rhs`.  Both operands must carry identical
    /// labels.  This is the masking step that removes same-service entries.
    pub fn and_not(&self, rhs: &BoolMatrix) -> FissionResult<BoolMatrix> {
        if !Self::same_labels(&self.rows, &rhs.rows) || !Self::same_labels(&self.cols, &rhs.cols) {
            return Err(Self::shape_err("and_not", self, rhs));
        }
        let mut out = self.clone();
        for (o, r) in out.data.iter_mut().zip(rhs.data.iter()) {
            *o &= !*r;
        }
        Ok(out)
    }

    /// Submatrix restricted to the given row and column labels, preserving
    /// the order of the requested slices.  Labels that are not present are
    /// skipped with a debug log rather than failing the analysis.
    pub fn select(&self, rows: &[String], cols: &[String]) -> BoolMatrix {
        let kept_rows: Vec<&String> = rows
            .iter()
            .filter(|r| {
                let known = self.rows.contains(r.as_str());
                if !known {
                    debug!("Dropping unknown row label from selection: {r}");
                }
                known
            })
            .collect();
        let kept_cols: Vec<&String> = cols
            .iter()
            .filter(|c| {
                let known = self.cols.contains(c.as_str());
                if !known {
                    debug!("Dropping unknown column label from selection: {c}");
                }
                known
            })
            .collect();
        let mut out = BoolMatrix::new(kept_rows.iter().map(|s| s.to_string()),
                                      kept_cols.iter().map(|s| s.to_string()));
        for (ri, row) in kept_rows.iter().enumerate() {
            let src_ri = self.rows.get_index_of(row.as_str()).unwrap_or_default();
            for (ci, col) in kept_cols.iter().enumerate() {
                let src_ci = self.cols.get_index_of(col.as_str()).unwrap_or_default();
                if self.at(src_ri, src_ci) {
                    *out.at_mut(ri, ci) = true;
                }
            }
        }
        out
    }

    /// Restrict only the columns, keeping every row.
    pub fn select_cols(&self, cols: &[String]) -> BoolMatrix {
        let rows: Vec<String> = self.rows.iter().cloned().collect();
        self.select(&rows, cols)
    }

    /// Restrict only the rows, keeping every column.
    pub fn select_rows(&self, rows: &[String]) -> BoolMatrix {
        let cols: Vec<String> = self.cols.iter().cloned().collect();
        self.select(rows, &cols)
    }

    /// All true entries as `(row_label, col_label)` pairs in row-major label
    /// order.  This ordering is observable downstream and must stay stable.
    pub fn true_entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        for (ri, row) in self.rows.iter().enumerate() {
            for (ci, col) in self.cols.iter().enumerate() {
                if self.at(ri, ci) {
                    entries.push((row.clone(), col.clone()));
                }
            }
        }
        entries
    }

    /// Column labels with at least one true entry, in column order.
    pub fn columns_with_any_true(&self) -> Vec<String> {
        self.cols
            .iter()
            .enumerate()
            .filter(|(ci, _)| (0..self.nrows()).any(|ri| self.at(ri, *ci)))
            .map(|(_, col)| col.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Alignment utilities
// ---------------------------------------------------------------------------

/// Intersection of two label sets, preserving the order of `a`.
fn common_labels(a: impl Iterator<Item = impl Into<String>>, b: &IndexSet<String>) -> Vec<String> {
    a.map(Into::into).filter(|l| b.contains(l.as_str())).collect()
}

fn warn_missing(present_in: &str, missing_from: &str, missing: &[&str]) {
    if !missing.is_empty() {
        warn!(
            "{} labels present in {present_in} but missing in {missing_from}: {missing:?}",
            missing.len()
        );
    }
}

fn difference<'a>(a: &'a IndexSet<String>, b: &IndexSet<String>) -> Vec<&'a str> {
    a.iter()
        .filter(|l| !b.contains(l.as_str()))
        .map(String::as_str)
        .collect()
}

/// Align a class-methods matrix (`C x M`) with an inter-method call matrix
/// (`M x M`) on their common method labels.
///
/// Methods known to only one side are logged as warnings and dropped; the
/// silently-shrunk intersection is the explicit policy, never a failure.
pub fn align_method_matrices(
    class_methods: &BoolMatrix,
    call_data: &BoolMatrix,
) -> (BoolMatrix, BoolMatrix) {
    let common = common_labels(class_methods.col_labels(), &call_data.cols);
    warn_missing(
        "inter-method calls",
        "the class-methods matrix",
        &difference(&call_data.rows, &class_methods.cols),
    );
    warn_missing(
        "the class-methods matrix",
        "inter-method calls",
        &difference(&class_methods.cols, &call_data.rows),
    );
    let aligned_class_methods = class_methods.select_cols(&common);
    let aligned_call_data = call_data.select(&common, &common);
    (aligned_class_methods, aligned_call_data)
}

/// Align a decomposition membership matrix (`K x C`) with a class-methods
/// matrix (`C x M`) on their common class labels.
pub fn align_class_matrices(
    decomposition: &BoolMatrix,
    class_methods: &BoolMatrix,
) -> (BoolMatrix, BoolMatrix) {
    let common = common_labels(decomposition.col_labels(), &class_methods.rows);
    warn_missing(
        "the static analysis data",
        "the decomposition data",
        &difference(&class_methods.rows, &decomposition.cols),
    );
    warn_missing(
        "the decomposition data",
        "the static analysis data",
        &difference(&decomposition.cols, &class_methods.rows),
    );
    let aligned_decomposition = decomposition.select_cols(&common);
    let aligned_class_methods = class_methods.select_rows(&common);
    (aligned_decomposition, aligned_class_methods)
}

/// Align a decomposition membership matrix (`K x C`) with a class-to-class
/// reference matrix (`C x C`) on their common class labels.
pub fn align_class_references(
    decomposition: &BoolMatrix,
    references: &BoolMatrix,
) -> (BoolMatrix, BoolMatrix) {
    let common = common_labels(decomposition.col_labels(), &references.cols);
    warn_missing(
        "the references data",
        "the decomposition data",
        &difference(&references.rows, &decomposition.cols),
    );
    warn_missing(
        "the decomposition data",
        "the references data",
        &difference(&decomposition.cols, &references.rows),
    );
    let aligned_decomposition = decomposition.select_cols(&common);
    let aligned_references = references.select(&common, &common);
    (aligned_decomposition, aligned_references)
}

use crate::bail;
use crate::error::{ErrorKind, StrataResult};
use crate::types::Cell;

/// An ordered-column table of cells.
///
/// [`Frame`] is the in-memory shape of a staged snapshot or a
/// warehouse-bound table: a fixed column list plus rows of cells aligned to
/// it. The column list is part of the value even when there are no rows, so
/// degenerate inputs still carry their full schema downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    /// Creates an empty frame with the given column list.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates an empty frame from static column names.
    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|name| name.to_string()).collect())
    }

    /// Appends a row, which must match the column arity.
    pub fn push_row(&mut self, row: Vec<Cell>) -> StrataResult<()> {
        if row.len() != self.columns.len() {
            bail!(
                ErrorKind::InvalidData,
                "Row arity does not match frame columns",
                format!("expected {} cells, got {}", self.columns.len(), row.len())
            );
        }

        self.rows.push(row);
        Ok(())
    }

    /// Returns the column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows in order.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Consumes the frame and returns its rows.
    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the positional index of a column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns the cell at `(row, column)`, if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Cell>> {
        &mut self.rows
    }

    pub(crate) fn columns_mut(&mut self) -> &mut Vec<String> {
        &mut self.columns
    }
}

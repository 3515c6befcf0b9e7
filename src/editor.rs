//! # Table Editing
//!
//! Content mutations an editor applies to a table before a render pass, and
//! the per-session "which cell is being edited" state. Every mutation takes
//! the current table view and rows and returns new ones.

use crate::error::{ReflowError, Result};
use crate::table::{Rows, TableSchema};

/// Width percentage given to a newly added column.
pub const NEW_COLUMN_PERCENTAGE: f64 = 25.0;

/// Append a row of empty cells, one per head column.
pub fn add_row(table: &TableSchema, rows: &Rows) -> Rows {
    let mut next = rows.clone();
    next.push(vec![String::new(); table.head.len()]);
    next
}

/// Drop body row `index`.
pub fn remove_row(rows: &Rows, index: usize) -> Result<Rows> {
    if index >= rows.len() {
        return Err(out_of_range("row", index, rows.len()));
    }
    Ok(rows
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, row)| row.clone())
        .collect())
}

/// Append an empty column. Existing columns shrink proportionally so the
/// new one gets [`NEW_COLUMN_PERCENTAGE`] and the total stays 100.
pub fn add_column(table: &TableSchema, rows: &Rows) -> Result<(TableSchema, Rows)> {
    let mut next = table.clone();
    let total: f64 = table.head_width_percentages.iter().sum();
    if total > 0.0 {
        let scale = (100.0 - NEW_COLUMN_PERCENTAGE) / total;
        for width in &mut next.head_width_percentages {
            *width *= scale;
        }
        next.head_width_percentages.push(NEW_COLUMN_PERCENTAGE);
    } else if table.head_width_percentages.is_empty() {
        next.head_width_percentages.push(100.0);
    } else {
        return Err(ReflowError::Configuration(
            "cannot add a column to a table whose widths sum to zero".to_string(),
        ));
    }
    next.head.push(String::new());

    let rows = rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.push(String::new());
            row
        })
        .collect();
    Ok((next, rows))
}

/// Drop column `index` from the head, the widths and every row. The
/// remaining widths are renormalized to sum to 100.
pub fn remove_column(table: &TableSchema, rows: &Rows, index: usize) -> Result<(TableSchema, Rows)> {
    let columns = table.column_count();
    if index >= columns {
        return Err(out_of_range("column", index, columns));
    }

    let mut next = table.clone();
    if index < next.head.len() {
        next.head.remove(index);
    }
    if index < next.head_width_percentages.len() {
        next.head_width_percentages.remove(index);
        let remaining: f64 = next.head_width_percentages.iter().sum();
        if remaining > 0.0 {
            for width in &mut next.head_width_percentages {
                *width = *width / remaining * 100.0;
            }
        }
    }

    let rows = rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, cell)| cell.clone())
                .collect()
        })
        .collect();
    Ok((next, rows))
}

fn out_of_range(what: &str, index: usize, len: usize) -> ReflowError {
    ReflowError::Configuration(format!(
        "{} {} out of range for a table with {} {}s",
        what, index, len, what
    ))
}

/// Which part of a table a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Head,
    Body,
}

/// A cell address within one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub row: usize,
    pub column: usize,
}

/// Editing state owned by one editor session. At most one cell, in either
/// the head or the body, is being edited at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSession {
    head: Option<CellPosition>,
    body: Option<CellPosition>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing a cell; the other section's selection is cleared.
    pub fn select(&mut self, section: Section, position: CellPosition) {
        match section {
            Section::Head => {
                self.head = Some(position);
                self.body = None;
            }
            Section::Body => {
                self.body = Some(position);
                self.head = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.head = None;
        self.body = None;
    }

    pub fn editing(&self, section: Section) -> Option<CellPosition> {
        match section {
            Section::Head => self.head,
            Section::Body => self.body,
        }
    }

    pub fn is_editing(&self, section: Section, position: CellPosition) -> bool {
        self.editing(section) == Some(position)
    }

    /// Write `value` into the selected body cell.
    pub fn set_body_cell(&self, rows: &Rows, value: &str) -> Result<Rows> {
        let pos = self.body.ok_or_else(|| {
            ReflowError::Configuration("no body cell is being edited".to_string())
        })?;
        let mut next = rows.clone();
        let cell = next
            .get_mut(pos.row)
            .and_then(|row| row.get_mut(pos.column))
            .ok_or_else(|| {
                ReflowError::Configuration(format!(
                    "cell ({}, {}) is outside the table",
                    pos.row, pos.column
                ))
            })?;
        *cell = value.to_string();
        Ok(next)
    }
}

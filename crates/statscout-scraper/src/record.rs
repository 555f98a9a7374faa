//! Tabular records scraped or downloaded from a page.

use crate::error::{Result, ScrapeError};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;

/// Column names plus rows of cell text, every row as wide as the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableRecord {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableRecord {
    /// Empty record with the given columns.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append one row; it must be exactly as wide as the header.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ScrapeError::RowShape {
                row: self.rows.len() + 1,
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append the rows of another page of the same grid.
    pub fn append(&mut self, other: TableRecord) -> Result<()> {
        if other.columns != self.columns {
            return Err(ScrapeError::ColumnMismatch {
                expected: self.columns.clone(),
                found: other.columns,
            });
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Add a column to the right, one value per existing row.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(ScrapeError::RowShape {
                row: 0,
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        self.columns.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Values of the named column, matched exactly.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    /// Cell at `row` in the named column.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| r[index].as_str())
    }

    /// Write header and rows as delimited text.
    pub fn write_to<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write to a file, creating parent directories.
    pub fn write_csv(&self, path: &Path, delimiter: u8) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write_to(file, delimiter)?;
        tracing::debug!(path = %path.display(), rows = self.len(), "wrote records");
        Ok(())
    }

    /// Read delimited text whose first line is the header.
    pub fn read_from<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_reader(reader);

        let columns = reader.headers()?.iter().map(str::to_string).collect();
        let mut record = Self::new(columns);
        for row in reader.records() {
            record.push_row(row?.iter().map(str::to_string).collect())?;
        }
        Ok(record)
    }

    /// Read a delimited file.
    pub fn read_csv(path: &Path, delimiter: u8) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::read_from(file, delimiter)
    }
}

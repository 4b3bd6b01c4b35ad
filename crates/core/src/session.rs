//! Mutable import session.
//!
//! The one piece of state in the pipeline: the currently loaded rows and
//! the source file name they came from. Owned by the front-end (CLI here,
//! a panel controller in the browser build); the mapping functions
//! themselves stay pure.

use chrono::NaiveDate;

use crate::encode;
use crate::error::ConvertError;
use crate::mapper;
use crate::model::{RawRecord, TradeRow};

/// Fallback source stem when a session is asked for a filename before a
/// load ever succeeded.
const DEFAULT_SOURCE_NAME: &str = "saxo_trades";

#[derive(Debug, Default)]
pub struct ImportSession {
    rows: Vec<TradeRow>,
    source_name: String,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `records` and replace the session contents wholesale.
    ///
    /// If every record is rejected, the session rows are cleared and
    /// `NoMappableRows` is returned; the caller reports it and the user
    /// starts over. Returns the number of rows loaded otherwise.
    pub fn load(&mut self, records: &[RawRecord], source_name: &str) -> Result<usize, ConvertError> {
        let mapped = mapper::map_rows(records);
        if mapped.is_empty() {
            self.rows.clear();
            return Err(ConvertError::NoMappableRows);
        }
        self.rows = mapped;
        self.source_name = source_name.to_string();
        Ok(self.rows.len())
    }

    /// Delete one row by its preview index. Returns false when the index
    /// is out of range (the session is untouched).
    pub fn remove_row(&mut self, index: usize) -> bool {
        if index < self.rows.len() {
            self.rows.remove(index);
            true
        } else {
            false
        }
    }

    /// "Back": drop all rows and the source name.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.source_name.clear();
    }

    /// Encode the current rows. An empty session is an empty action:
    /// rejected, nothing encoded.
    pub fn csv(&self) -> Result<String, ConvertError> {
        if self.rows.is_empty() {
            return Err(ConvertError::NoRows);
        }
        encode::to_csv(&self.rows)
    }

    /// Output filename for the current source, dated `today`.
    pub fn filename(&self, today: NaiveDate) -> String {
        let source = if self.source_name.is_empty() {
            DEFAULT_SOURCE_NAME
        } else {
            &self.source_name
        };
        encode::csv_filename(source, today)
    }

    pub fn rows(&self) -> &[TradeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

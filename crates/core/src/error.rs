use std::fmt;

#[derive(Debug)]
pub enum ConvertError {
    /// Input filename is not a recognized spreadsheet extension.
    NotSpreadsheet(String),
    /// Workbook has no sheets at all.
    NoSheet,
    /// A requested sheet name does not exist in the workbook.
    UnknownSheet(String),
    /// Sheet has a header row but zero data rows (or no rows at all).
    EmptySheet { sheet: String },
    /// Every record was rejected by the row mapper.
    NoMappableRows,
    /// Upload/download style action invoked with zero current rows.
    NoRows,
    /// Spreadsheet decode failure; prior session state is left intact.
    Read(String),
    /// File IO error (write, etc.).
    Io(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSpreadsheet(name) => {
                write!(f, "'{name}' is not a .xlsx/.xls file")
            }
            Self::NoSheet => write!(f, "no sheet found in workbook"),
            Self::UnknownSheet(name) => write!(f, "sheet '{name}' not found in workbook"),
            Self::EmptySheet { sheet } => write!(f, "sheet '{sheet}' has no rows"),
            Self::NoMappableRows => write!(f, "no mappable rows found"),
            Self::NoRows => write!(f, "no rows loaded"),
            Self::Read(msg) => write!(f, "failed to read spreadsheet: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ConvertError {}

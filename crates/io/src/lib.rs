// File I/O operations

pub mod xlsx;

pub use xlsx::{
    is_spreadsheet_name, preferred_sheet, read_preferred_sheet, read_sheet, sheet_names,
    write_csv, SheetData,
};

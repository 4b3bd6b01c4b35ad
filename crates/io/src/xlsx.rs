// Saxo export import (xlsx, xls)
//
// One-way conversion boundary: a workbook file in, a raw 2-D grid of
// tagged cell values out. Sheet choice follows the export's layout:
// "TradesWithAdditionalInfo" carries the option/futures columns when
// present, "Trades" is the plain export, anything else means a reshuffled
// workbook and we take the first sheet.

use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use saxozella_core::{CellValue, ConvertError};

/// Sheet names the reader prefers, most specific first.
const PREFERRED_SHEETS: [&str; 2] = ["TradesWithAdditionalInfo", "Trades"];

/// A decoded sheet: the name actually chosen plus its raw cell grid.
#[derive(Debug)]
pub struct SheetData {
    pub sheet_name: String,
    pub grid: Vec<Vec<CellValue>>,
}

/// Case-insensitive `.xlsx`/`.xls` extension check.
pub fn is_spreadsheet_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".xlsx") || lower.ends_with(".xls")
}

/// List the workbook's sheet names in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, ConvertError> {
    let workbook = open_workbook_auto(path).map_err(|e| ConvertError::Read(e.to_string()))?;
    Ok(workbook.sheet_names().to_vec())
}

/// The sheet the selection policy picks from `names`, if any.
pub fn preferred_sheet(names: &[String]) -> Option<&String> {
    PREFERRED_SHEETS
        .iter()
        .find_map(|wanted| names.iter().find(|name| name == wanted))
        .or_else(|| names.first())
}

/// Read the policy-chosen sheet (see `preferred_sheet`).
pub fn read_preferred_sheet(path: &Path) -> Result<SheetData, ConvertError> {
    read_sheet(path, None)
}

/// Read one sheet as a raw grid. `sheet` overrides the selection policy
/// and must name an existing sheet.
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<SheetData, ConvertError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if !is_spreadsheet_name(&file_name) {
        return Err(ConvertError::NotSpreadsheet(file_name));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| ConvertError::Read(e.to_string()))?;
    let names: Vec<String> = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err(ConvertError::NoSheet);
    }

    let sheet_name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|name| name.as_str() == wanted)
            .cloned()
            .ok_or_else(|| ConvertError::UnknownSheet(wanted.to_string()))?,
        // names is non-empty, so the policy always picks something
        None => preferred_sheet(&names)
            .cloned()
            .ok_or(ConvertError::NoSheet)?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ConvertError::Read(e.to_string()))?;

    let grid = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Ok(SheetData { sheet_name, grid })
}

/// Map a calamine cell onto the engine's tagged variant.
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::Temporal(naive),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

/// Write the generated CSV text to `path`.
pub fn write_csv(path: &Path, text: &str) -> Result<(), ConvertError> {
    fs::write(path, text).map_err(|e| ConvertError::Io(format!("{}: {}", path.display(), e)))
}

//! CSV serialization for the importer, plus output-filename derivation.

use chrono::NaiveDate;

use crate::error::ConvertError;
use crate::model::{TradeRow, HEADER};

/// Serialize the fixed header plus one line per row.
///
/// The importer is strict about shape: `\n` separators, standard quoting
/// (quote on comma/quote/newline, inner quotes doubled), and no trailing
/// newline after the final row.
pub fn to_csv(rows: &[TradeRow]) -> Result<String, ConvertError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(HEADER)
        .map_err(|e| ConvertError::Io(e.to_string()))?;
    for row in rows {
        writer
            .write_record(row.fields())
            .map_err(|e| ConvertError::Io(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ConvertError::Io(e.to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|e| ConvertError::Io(e.to_string()))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// `<source stem>_tradezella_YYYY-MM-DD.csv`, dated at generation time.
pub fn csv_filename(source_name: &str, today: NaiveDate) -> String {
    format!(
        "{}_tradezella_{}.csv",
        strip_extension(source_name),
        today.format("%Y-%m-%d")
    )
}

/// Strip the final `.ext` (if any) from a file name.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => &name[..idx],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> TradeRow {
        TradeRow {
            date: "03/15/24".into(),
            time: "09:30:00".into(),
            symbol: "AAPL".into(),
            side: "Sell".into(),
            quantity: "10".into(),
            price: "150.25".into(),
            spread: "Stock".into(),
            expiration: String::new(),
            strike: String::new(),
            call_put: String::new(),
            commission: String::new(),
            fees: String::new(),
        }
    }

    #[test]
    fn test_header_line_and_no_trailing_newline() {
        let text = to_csv(&[sample_row()]).unwrap();
        let mut lines = text.split('\n');
        assert_eq!(
            lines.next(),
            Some("Date,Time,Symbol,Buy/Sell,Quantity,Price,Spread,Expiration,Strike,Call/Put,Commission,Fees")
        );
        assert_eq!(
            lines.next(),
            Some("03/15/24,09:30:00,AAPL,Sell,10,150.25,Stock,,,,,")
        );
        assert_eq!(lines.next(), None);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_escaping() {
        let mut row = sample_row();
        row.symbol = "Say \"hi\", please".into();
        let text = to_csv(&[row]).unwrap();
        assert!(text.contains("\"Say \"\"hi\"\", please\""));
    }

    #[test]
    fn test_round_trip() {
        let mut quoted = sample_row();
        quoted.symbol = "A,B\n\"C\"".into();
        let rows = vec![sample_row(), quoted.clone()];
        let text = to_csv(&rows).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            HEADER.to_vec()
        );
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(2), Some("AAPL"));
        assert_eq!(records[1].get(2), Some("A,B\n\"C\""));
        assert_eq!(
            records[1].iter().collect::<Vec<_>>(),
            quoted.fields().to_vec()
        );
    }

    #[test]
    fn test_empty_rows_is_just_header() {
        let text = to_csv(&[]).unwrap();
        assert_eq!(text.split('\n').count(), 1);
    }

    #[test]
    fn test_filename_derivation() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            csv_filename("trades_export.xlsx", today),
            "trades_export_tradezella_2024-03-15.csv"
        );
        // Only the final extension is stripped
        assert_eq!(
            csv_filename("report.v2.xlsx", today),
            "report.v2_tradezella_2024-03-15.csv"
        );
        // No extension: name used as-is
        assert_eq!(
            csv_filename("saxo_trades", today),
            "saxo_trades_tradezella_2024-03-15.csv"
        );
    }
}

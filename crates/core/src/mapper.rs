//! Grid → records → canonical rows.

use crate::fields::{
    self, ASSET_TYPE_KEYS, DATE_TIME_KEYS, DESCRIPTION_KEYS, EXPIRY_KEYS, OPTION_TYPE_KEYS,
    PRICE_KEYS, QUANTITY_KEYS, SIDE_KEYS, STRIKE_KEYS, SYMBOL_KEYS,
};
use crate::model::{format_number, CellValue, RawRecord, TradeRow};

/// Build one header-keyed record per data row. Row 0 is the header row;
/// blank header cells contribute no key; missing cells normalize to
/// `CellValue::Empty`. A grid with zero rows yields zero records.
pub fn build_records(grid: &[Vec<CellValue>]) -> Vec<RawRecord> {
    let Some((header_row, data_rows)) = grid.split_first() else {
        return Vec::new();
    };

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_text().trim().to_string())
        .collect();

    data_rows
        .iter()
        .map(|row| {
            let mut record = RawRecord::new();
            for (i, header) in headers.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                let cell = row.get(i).cloned().unwrap_or(CellValue::Empty);
                record.insert(header.clone(), cell);
            }
            record
        })
        .collect()
}

/// Map one record to a canonical row, or reject it.
///
/// Only two fields are mandatory: an execution date/time and a symbol.
/// Everything else degrades to an empty string or a computed default.
/// Pure: the same record always maps to the same row.
pub fn map_row(record: &RawRecord) -> Option<TradeRow> {
    let executed = fields::pick_date(record, DATE_TIME_KEYS)?;

    let raw_symbol = fields::pick_value(record, SYMBOL_KEYS);
    if raw_symbol.is_empty() {
        return None;
    }

    let raw_side = fields::pick_value(record, SIDE_KEYS);
    let raw_quantity = fields::pick_number(record, QUANTITY_KEYS);
    let raw_price = fields::pick_number(record, PRICE_KEYS);
    let asset_type = fields::pick_value(record, ASSET_TYPE_KEYS);
    let expiry = fields::pick_date(record, EXPIRY_KEYS);
    let strike = fields::pick_value(record, STRIKE_KEYS);
    let option_type = fields::pick_value(record, OPTION_TYPE_KEYS);
    let description = fields::pick_value(record, DESCRIPTION_KEYS);

    Some(TradeRow {
        date: fields::format_date(executed),
        time: fields::format_time(executed),
        symbol: fields::normalize_symbol(&raw_symbol, &asset_type, &description),
        side: fields::normalize_side(&raw_side, raw_quantity),
        // Direction is carried by the side, so quantity is absolute
        quantity: raw_quantity.map(|q| format_number(q.abs())).unwrap_or_default(),
        price: raw_price.map(format_number).unwrap_or_default(),
        spread: fields::normalize_spread(&asset_type, &option_type, &strike),
        expiration: expiry.map(fields::format_expiry).unwrap_or_default(),
        strike: fields::sanitize_strike(&strike),
        call_put: fields::normalize_call_put(&option_type),
        commission: String::new(),
        fees: String::new(),
    })
}

/// Map all records, keeping mapped rows in input order.
pub fn map_rows(records: &[RawRecord]) -> Vec<TradeRow> {
    records.iter().filter_map(map_row).collect()
}

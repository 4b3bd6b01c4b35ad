use std::collections::HashMap;

use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// A raw cell value as delivered by the sheet reader.
///
/// Spreadsheet cells are loosely typed at the source; this is the explicit
/// tagged form the extraction functions consume.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Temporal(NaiveDateTime),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Render the cell as display text. Integral floats print without a
    /// decimal point so `10.0` round-trips as `"10"`.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Temporal(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Empty => String::new(),
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One data row keyed by the exact header text from row 1 of the sheet.
/// Headers with blank names contribute no key.
pub type RawRecord = HashMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Canonical output
// ---------------------------------------------------------------------------

/// The Tradezella import header, in the exact column order the importer
/// expects.
pub const HEADER: [&str; 12] = [
    "Date",
    "Time",
    "Symbol",
    "Buy/Sell",
    "Quantity",
    "Price",
    "Spread",
    "Expiration",
    "Strike",
    "Call/Put",
    "Commission",
    "Fees",
];

/// A single mapped trade in the target schema. Every field is plain text,
/// possibly empty; direction lives in `side`, never in the quantity sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRow {
    pub date: String,
    pub time: String,
    pub symbol: String,
    pub side: String,
    pub quantity: String,
    pub price: String,
    pub spread: String,
    pub expiration: String,
    pub strike: String,
    pub call_put: String,
    pub commission: String,
    pub fees: String,
}

impl TradeRow {
    /// The 12 field values in `HEADER` column order.
    pub fn fields(&self) -> [&str; 12] {
        [
            &self.date,
            &self.time,
            &self.symbol,
            &self.side,
            &self.quantity,
            &self.price,
            &self.spread,
            &self.expiration,
            &self.strike,
            &self.call_put,
            &self.commission,
            &self.fees,
        ]
    }

    /// Preview display: fields joined with ` | `, as the row list shows them.
    pub fn display(&self) -> String {
        self.fields().join(" | ")
    }
}

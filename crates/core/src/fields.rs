//! Field extraction and normalization.
//!
//! Saxo exports the same trade field under an English or a Japanese header
//! depending on export locale, so every target column has an ordered
//! candidate-key list; the first non-empty candidate wins. Each normalizer
//! here is pure and degrades to an empty value rather than failing.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{CellValue, RawRecord};

// ---------------------------------------------------------------------------
// Candidate-key tables
// ---------------------------------------------------------------------------

pub const SYMBOL_KEYS: &[&str] = &["Underlying Instrument Symbol", "銘柄コード", "銘柄名"];
pub const DESCRIPTION_KEYS: &[&str] = &["Underlying Instrument Description", "銘柄名"];
pub const DATE_TIME_KEYS: &[&str] = &["Trade Execution Time", "取引時間"];
pub const SIDE_KEYS: &[&str] = &["売買タイプ", "Direction"];
pub const QUANTITY_KEYS: &[&str] = &["数量"];
pub const PRICE_KEYS: &[&str] = &["価格"];
pub const ASSET_TYPE_KEYS: &[&str] = &["Asset type"];
pub const EXPIRY_KEYS: &[&str] = &["ExpiryDate"];
pub const STRIKE_KEYS: &[&str] = &["ストライク"];
pub const OPTION_TYPE_KEYS: &[&str] = &["Option Event Type"];

// ---------------------------------------------------------------------------
// Candidate lookup
// ---------------------------------------------------------------------------

/// First candidate key whose stringified, trimmed value is non-empty.
/// Earlier keys shadow later ones even when the later value is non-empty.
pub fn pick_value(record: &RawRecord, keys: &[&str]) -> String {
    for key in keys {
        if let Some(value) = record.get(*key) {
            let text = value.to_text();
            let text = text.trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    String::new()
}

/// Like `pick_value` but numeric: thousands-separator commas are stripped
/// before parsing, and a candidate that does not parse is skipped.
pub fn pick_number(record: &RawRecord, keys: &[&str]) -> Option<f64> {
    for key in keys {
        match record.get(*key) {
            Some(CellValue::Number(n)) => return Some(*n),
            Some(CellValue::Text(s)) => {
                let cleaned = s.replace(',', "");
                let cleaned = cleaned.trim();
                if cleaned.is_empty() {
                    continue;
                }
                if let Ok(n) = cleaned.parse::<f64>() {
                    return Some(n);
                }
            }
            _ => {}
        }
    }
    None
}

/// First candidate key whose raw value parses as a date.
pub fn pick_date(record: &RawRecord, keys: &[&str]) -> Option<NaiveDateTime> {
    for key in keys {
        if let Some(value) = record.get(*key) {
            if let Some(dt) = parse_cell_date(value) {
                return Some(dt);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

static ISO_DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})(?:[ T](\d{2}):(\d{2}):(\d{2})(?:\.(\d{1,3}))?)?$")
        .unwrap()
});

/// Fallback formats for free-form date strings, tried in order. Anything
/// outside this list is "field absent", never an error.
const FALLBACK_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
];

const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%B %d, %Y",
];

/// Parse a raw cell into a date-time. Three accepted forms: a native
/// temporal value, a spreadsheet serial number, or text.
pub fn parse_cell_date(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::Temporal(dt) => Some(*dt),
        CellValue::Number(n) => parse_serial_date(*n),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty => None,
    }
}

/// Spreadsheet serial date: day count from epoch day zero = 1899-12-30.
/// The epoch choice absorbs the historical leap-year-bug offset, so serial
/// `1` is 1899-12-31.
fn parse_serial_date(value: f64) -> Option<NaiveDateTime> {
    if !value.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (value * 86_400_000.0).round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(Duration::milliseconds(millis as i64))
}

/// A string matching the ISO shape must also be a real calendar date;
/// `2024-13-01` is rejected outright, not rolled over into the next year.
fn parse_date_text(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = ISO_DATE_TIME_RE.captures(trimmed) {
        let num = |i: usize| caps.get(i).map_or(0u32, |m| m.as_str().parse().unwrap_or(0));
        let year: i32 = caps.get(1)?.as_str().parse().ok()?;
        let millis = caps
            .get(7)
            .map_or(0, |m| format!("{:0<3}", m.as_str()).parse().unwrap_or(0));
        return NaiveDate::from_ymd_opt(year, num(2), num(3))?
            .and_hms_milli_opt(num(4), num(5), num(6), millis);
    }

    for fmt in FALLBACK_DATE_TIME_FORMATS {
        if let Ok(dt) = chrono::DateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.naive_local());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in FALLBACK_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// `MM/DD/YY`, the importer's trade-date format.
pub fn format_date(dt: NaiveDateTime) -> String {
    format!(
        "{:02}/{:02}/{:02}",
        dt.month(),
        dt.day(),
        dt.year().rem_euclid(100)
    )
}

/// `HH:MM:SS`, 24-hour.
pub fn format_time(dt: NaiveDateTime) -> String {
    format!("{:02}:{:02}:{:02}", dt.hour(), dt.minute(), dt.second())
}

/// `DD Mon YY`. A parsed year ≤ 1900 is the "no real expiry" sentinel the
/// export uses for non-expiring instruments and formats to empty.
pub fn format_expiry(dt: NaiveDateTime) -> String {
    if dt.year() <= 1900 {
        return String::new();
    }
    dt.format("%d %b %y").to_string()
}

// ---------------------------------------------------------------------------
// Normalizers
// ---------------------------------------------------------------------------

/// Normalize the side field. Recognizes English `buy`/`sell` (any case) and
/// the literal Japanese tokens `買` (buy) / `売` (sell). Anything else falls
/// back to the sign of the raw quantity, including side text that is
/// present but unrecognized.
pub fn normalize_side(raw: &str, quantity: Option<f64>) -> String {
    let lower = raw.to_lowercase();
    if lower == "buy" || raw == "買" {
        return "Buy".to_string();
    }
    if lower == "sell" || raw == "売" {
        return "Sell".to_string();
    }
    if quantity.is_some_and(|q| q < 0.0) {
        return "Sell".to_string();
    }
    "Buy".to_string()
}

/// Asset types whose trades map to a fixed spread class.
fn spread_for_asset_type(asset_type: &str) -> Option<&'static str> {
    match asset_type {
        "FxSpot" | "CfdOnFutures" => Some("Stock"),
        _ => None,
    }
}

/// Spread classification: any option marker (option type or a real strike)
/// means `Single`; otherwise the asset-type table, defaulting to `Stock`.
pub fn normalize_spread(asset_type: &str, option_type: &str, strike: &str) -> String {
    if !option_type.is_empty() || !sanitize_strike(strike).is_empty() {
        return "Single".to_string();
    }
    spread_for_asset_type(asset_type)
        .unwrap_or("Stock")
        .to_string()
}

/// Saxo renders "no strike" as a lone dash. No numeric validation beyond
/// that; the value passes through as text.
pub fn sanitize_strike(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return String::new();
    }
    trimmed.to_string()
}

/// Substring match on the free-text option-type field. Spread/combination
/// labels that name neither leg stay unclassified (empty).
pub fn normalize_call_put(option_type: &str) -> String {
    let lower = option_type.to_lowercase();
    if lower.contains("call") {
        return "Call".to_string();
    }
    if lower.contains("put") {
        return "Put".to_string();
    }
    String::new()
}

// ---------------------------------------------------------------------------
// Symbol normalization (futures roots)
// ---------------------------------------------------------------------------

const MONTH_FRAGMENT: &str = "(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)";

static MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i){MONTH_FRAGMENT}[a-z]*\s+\d{{4}}")).unwrap());

static MONTH_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i){MONTH_FRAGMENT}\d{{2}}")).unwrap());

static FUTURES_ASSET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)futures").unwrap());

struct FuturesRule {
    pattern: Regex,
    symbol: &'static str,
    micro_symbol: Option<&'static str>,
}

/// Ordered contract-root table; first matching rule wins. The micro ticker
/// applies when the combined symbol/description text contains `micro`.
static FUTURES_SYMBOL_RULES: Lazy<Vec<FuturesRule>> = Lazy::new(|| {
    let rule = |pattern: &str, symbol: &'static str, micro_symbol: Option<&'static str>| {
        FuturesRule {
            pattern: Regex::new(pattern).unwrap(),
            symbol,
            micro_symbol,
        }
    };
    vec![
        rule("(crude|wti|oil)", "CL", Some("MCL")),
        rule("(natural gas|natgas|nat gas|henry hub)", "NG", None),
        rule("(platinum|plat)", "PL", None),
        rule("gold", "GC", Some("MGC")),
        rule("(silver|silv)", "SI", Some("SIL")),
    ]
});

fn is_futures_symbol(raw_symbol: &str, asset_type: &str, description: &str) -> bool {
    if FUTURES_ASSET_RE.is_match(asset_type) {
        return true;
    }
    MONTH_YEAR_RE.is_match(raw_symbol)
        || MONTH_YEAR_RE.is_match(description)
        || MONTH_CODE_RE.is_match(raw_symbol)
        || MONTH_CODE_RE.is_match(description)
}

/// Rewrite futures contract symbols to their canonical root ticker. Anything
/// that does not look like a futures contract passes through unchanged, as
/// does a futures contract no rule recognizes.
pub fn normalize_symbol(raw_symbol: &str, asset_type: &str, description: &str) -> String {
    if !is_futures_symbol(raw_symbol, asset_type, description) {
        return raw_symbol.to_string();
    }

    let text = format!("{} {}", raw_symbol, description).to_lowercase();
    let is_micro = text.contains("micro");

    for rule in FUTURES_SYMBOL_RULES.iter() {
        if !rule.pattern.is_match(&text) {
            continue;
        }
        if is_micro {
            if let Some(micro) = rule.micro_symbol {
                return micro.to_string();
            }
        }
        return rule.symbol.to_string();
    }

    raw_symbol.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entries: &[(&str, CellValue)]) -> RawRecord {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_pick_value_first_candidate_shadows_later() {
        let rec = record(&[
            ("Underlying Instrument Symbol", text("AAPL")),
            ("銘柄コード", text("7203")),
        ]);
        assert_eq!(pick_value(&rec, SYMBOL_KEYS), "AAPL");
    }

    #[test]
    fn test_pick_value_skips_blank_candidates() {
        let rec = record(&[
            ("Underlying Instrument Symbol", text("   ")),
            ("銘柄コード", text("7203")),
        ]);
        assert_eq!(pick_value(&rec, SYMBOL_KEYS), "7203");
        assert_eq!(pick_value(&record(&[]), SYMBOL_KEYS), "");
    }

    #[test]
    fn test_pick_number_strips_thousands_commas() {
        let rec = record(&[("数量", text("1,250"))]);
        assert_eq!(pick_number(&rec, QUANTITY_KEYS), Some(1250.0));
    }

    #[test]
    fn test_pick_number_skips_unparseable() {
        let rec = record(&[("数量", text("n/a"))]);
        assert_eq!(pick_number(&rec, QUANTITY_KEYS), None);
        let rec = record(&[("数量", CellValue::Number(-10.0))]);
        assert_eq!(pick_number(&rec, QUANTITY_KEYS), Some(-10.0));
    }

    #[test]
    fn test_serial_date_boundary() {
        // Serial 1 = epoch + 1 day
        let dt = parse_serial_date(1.0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(1899, 12, 31).unwrap());
        assert_eq!(format_time(dt), "00:00:00");
    }

    #[test]
    fn test_serial_date_with_time_fraction() {
        // 45366.5 = 2024-03-15 12:00:00
        let dt = parse_serial_date(45366.5).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(format_time(dt), "12:00:00");
    }

    #[test]
    fn test_iso_text_with_and_without_time() {
        let dt = parse_date_text("2024-03-15T09:30:00").unwrap();
        assert_eq!(format_date(dt), "03/15/24");
        assert_eq!(format_time(dt), "09:30:00");

        let dt = parse_date_text("2024-03-15 09:30:00.250").unwrap();
        assert_eq!(format_time(dt), "09:30:00");

        // Time parts default to zero
        let dt = parse_date_text("2024-03-15").unwrap();
        assert_eq!(format_time(dt), "00:00:00");
    }

    #[test]
    fn test_iso_shaped_but_calendar_invalid_rejected() {
        // Month 13 and Feb 30 look ISO but name no real date; they count
        // as "field absent", never a rolled-over date
        assert!(parse_date_text("2024-13-01").is_none());
        assert!(parse_date_text("2024-02-30").is_none());
        assert!(parse_date_text("2024-13-01T09:30:00").is_none());
        // An out-of-range time part is rejected the same way
        assert!(parse_date_text("2024-03-15T25:00:00").is_none());
    }

    #[test]
    fn test_free_form_fallback_and_garbage() {
        let dt = parse_date_text("2024/03/15 09:30:00").unwrap();
        assert_eq!(format_date(dt), "03/15/24");
        assert!(parse_date_text("not a date").is_none());
        assert!(parse_date_text("").is_none());
    }

    #[test]
    fn test_expiry_format_and_sentinel() {
        let real = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_expiry(real), "15 Mar 24");

        for year in [1899, 1900] {
            let sentinel = NaiveDate::from_ymd_opt(year, 6, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            assert_eq!(format_expiry(sentinel), "");
        }
    }

    #[test]
    fn test_side_tokens() {
        assert_eq!(normalize_side("Buy", None), "Buy");
        assert_eq!(normalize_side("SELL", None), "Sell");
        assert_eq!(normalize_side("買", None), "Buy");
        assert_eq!(normalize_side("売", None), "Sell");
    }

    #[test]
    fn test_side_quantity_fallback_runs_for_unrecognized_text() {
        assert_eq!(normalize_side("Short", Some(-5.0)), "Sell");
        assert_eq!(normalize_side("Short", Some(5.0)), "Buy");
        assert_eq!(normalize_side("", Some(-5.0)), "Sell");
        assert_eq!(normalize_side("", None), "Buy");
    }

    #[test]
    fn test_strike_sanitization() {
        assert_eq!(sanitize_strike("-"), "");
        assert_eq!(sanitize_strike(""), "");
        assert_eq!(sanitize_strike("  150.0  "), "150.0");
        // No numeric validation: pass-through
        assert_eq!(sanitize_strike("abc"), "abc");
    }

    #[test]
    fn test_spread_classification() {
        assert_eq!(normalize_spread("", "Exercised Call", ""), "Single");
        assert_eq!(normalize_spread("", "", "150"), "Single");
        // A dash strike is "no strike" and falls through to the asset table
        assert_eq!(normalize_spread("FxSpot", "", "-"), "Stock");
        assert_eq!(normalize_spread("CfdOnFutures", "", ""), "Stock");
        assert_eq!(normalize_spread("StockOption", "", ""), "Stock");
        assert_eq!(normalize_spread("", "", ""), "Stock");
    }

    #[test]
    fn test_call_put_substring() {
        assert_eq!(normalize_call_put("Exercised CALL"), "Call");
        assert_eq!(normalize_call_put("put option"), "Put");
        assert_eq!(normalize_call_put("Straddle"), "");
        assert_eq!(normalize_call_put(""), "");
    }

    #[test]
    fn test_futures_detection_by_asset_type() {
        assert_eq!(normalize_symbol("CLJ24", "Futures", "Crude Oil Apr 2024"), "CL");
        assert_eq!(
            normalize_symbol("MCLJ24", "ContractFutures", "Micro Crude Oil Apr 2024"),
            "MCL"
        );
    }

    #[test]
    fn test_futures_detection_by_month_patterns() {
        // "March 2024" in the description, no futures asset type
        assert_eq!(normalize_symbol("GOLD", "", "Gold March 2024"), "GC");
        // 3-letter month code + 2-digit year in the symbol
        assert_eq!(normalize_symbol("NGMAR24", "", "Henry Hub"), "NG");
    }

    #[test]
    fn test_futures_first_rule_wins_and_unmatched_pass_through() {
        // "crude" outranks "gold" in the ordered table
        assert_eq!(normalize_symbol("X", "Futures", "crude gold"), "CL");
        // Futures contract no rule recognizes: raw symbol unchanged
        assert_eq!(normalize_symbol("ZCN24", "Futures", "Corn Jul 2024"), "ZCN24");
    }

    #[test]
    fn test_non_futures_symbol_unchanged() {
        assert_eq!(normalize_symbol("AAPL", "Stock", "Apple Inc"), "AAPL");
        // "plat" rule must not fire for equities with matching text
        assert_eq!(normalize_symbol("PLTR", "Stock", "Palantir platform co"), "PLTR");
    }

    #[test]
    fn test_micro_without_micro_ticker_uses_root() {
        assert_eq!(
            normalize_symbol("NGJ24", "Futures", "Micro Natural Gas Apr 2024"),
            "NG"
        );
    }
}

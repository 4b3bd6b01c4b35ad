//! `saxozella-core`: Saxo export to Tradezella import conversion engine.
//!
//! Pure engine crate: receives pre-loaded cell grids, returns canonical
//! trade rows and CSV text. No file or terminal I/O.

pub mod encode;
pub mod error;
pub mod fields;
pub mod host;
pub mod mapper;
pub mod model;
pub mod session;

pub use encode::{csv_filename, to_csv};
pub use error::ConvertError;
pub use mapper::{build_records, map_row, map_rows};
pub use model::{CellValue, RawRecord, TradeRow, HEADER};
pub use session::ImportSession;

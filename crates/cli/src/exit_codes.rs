//! CLI exit code registry.
//!
//! Single source of truth; scripts wrapping the converter rely on these.
//!
//! | Code | Meaning                                      |
//! |------|----------------------------------------------|
//! | 0    | Success                                      |
//! | 2    | Usage error (bad args, wrong file type)      |
//! | 3    | IO error (cannot read/write a file)          |
//! | 4    | Read/convert failure (bad workbook or sheet) |
//! | 5    | No rows (nothing mapped, or all dropped)     |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, unsupported input file type.
pub const EXIT_USAGE: u8 = 2;

/// IO error - file read/write failed.
pub const EXIT_IO: u8 = 3;

/// Read/convert failure - undecodable workbook, missing or empty sheet.
pub const EXIT_READ: u8 = 4;

/// No rows - every record was rejected, or an action ran on zero rows.
pub const EXIT_NO_ROWS: u8 = 5;

use saxozella_core::ConvertError;

/// Map a ConvertError to its exit code.
pub fn convert_exit_code(err: &ConvertError) -> u8 {
    match err {
        ConvertError::NotSpreadsheet(_) => EXIT_USAGE,
        ConvertError::NoSheet
        | ConvertError::UnknownSheet(_)
        | ConvertError::EmptySheet { .. }
        | ConvertError::Read(_) => EXIT_READ,
        ConvertError::NoMappableRows | ConvertError::NoRows => EXIT_NO_ROWS,
        ConvertError::Io(_) => EXIT_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_exit_codes() {
        assert_eq!(
            convert_exit_code(&ConvertError::NotSpreadsheet("x.csv".into())),
            EXIT_USAGE
        );
        assert_eq!(convert_exit_code(&ConvertError::NoSheet), EXIT_READ);
        assert_eq!(
            convert_exit_code(&ConvertError::NoMappableRows),
            EXIT_NO_ROWS
        );
        assert_eq!(convert_exit_code(&ConvertError::Io("disk".into())), EXIT_IO);
    }
}

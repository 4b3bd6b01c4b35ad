// saxozella - convert Saxo trade exports to Tradezella CSV imports

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use saxozella_core::{build_records, ConvertError, ImportSession};
use saxozella_io as io;

use exit_codes::{convert_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "saxozella")]
#[command(about = "Convert Saxo .xlsx trade exports to Tradezella CSV imports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an export to the Tradezella import CSV
    #[command(after_help = "\
Examples:
  saxozella convert trades.xlsx
  saxozella convert trades.xlsx -o import.csv
  saxozella convert trades.xlsx -o - | head -5
  saxozella convert trades.xlsx --sheet Trades --drop 3 --drop 7")]
    Convert {
        /// Input workbook (.xlsx or .xls)
        input: PathBuf,

        /// Output file ('-' for stdout; default: derived name in the
        /// current directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Sheet name (default: preferred-sheet policy)
        #[arg(long)]
        sheet: Option<String>,

        /// Delete a row by its preview index before writing. Repeatable.
        #[arg(long, value_name = "INDEX")]
        drop: Vec<usize>,

        /// Suppress the summary line
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Show the mapped rows with their indices, without writing anything
    Preview {
        /// Input workbook (.xlsx or .xls)
        input: PathBuf,

        /// Sheet name (default: preferred-sheet policy)
        #[arg(long)]
        sheet: Option<String>,
    },

    /// List the workbook's sheets, marking the one the policy would pick
    Sheets {
        /// Input workbook (.xlsx or .xls)
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            sheet,
            drop,
            quiet,
        } => cmd_convert(&input, output, sheet.as_deref(), &drop, quiet),
        Commands::Preview { input, sheet } => cmd_preview(&input, sheet.as_deref()),
        Commands::Sheets { input } => cmd_sheets(&input),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Wrap an engine error with its exit code and a usage hint where one
    /// helps.
    pub fn convert(err: ConvertError) -> Self {
        let hint = match &err {
            ConvertError::NotSpreadsheet(_) => {
                Some("expected a Saxo .xlsx/.xls export".to_string())
            }
            ConvertError::NoMappableRows => Some(
                "rows need an execution time ('Trade Execution Time' or '取引時間') \
                 and a symbol column"
                    .to_string(),
            ),
            ConvertError::UnknownSheet(_) => {
                Some("run 'saxozella sheets <input>' to list sheet names".to_string())
            }
            _ => None,
        };
        Self { code: convert_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// convert
// ============================================================================

fn cmd_convert(
    input: &Path,
    output: Option<PathBuf>,
    sheet: Option<&str>,
    drop: &[usize],
    quiet: bool,
) -> Result<(), CliError> {
    let (mut session, sheet_name) = load_session(input, sheet)?;

    apply_drops(&mut session, drop)?;

    let csv = session.csv().map_err(CliError::convert)?;

    let out_path = match output {
        Some(path) if path.to_str() == Some("-") => {
            print!("{}", csv);
            if !quiet {
                eprintln!(
                    "{} row(s) from sheet '{}' of {}",
                    session.len(),
                    sheet_name,
                    input.display()
                );
            }
            return Ok(());
        }
        Some(path) => path,
        None => PathBuf::from(session.filename(chrono::Local::now().date_naive())),
    };

    io::write_csv(&out_path, &csv).map_err(CliError::convert)?;

    if !quiet {
        eprintln!(
            "wrote {} row(s) from sheet '{}' to {}",
            session.len(),
            sheet_name,
            out_path.display()
        );
    }
    Ok(())
}

/// Delete rows by preview index, highest first so the remaining indices
/// keep meaning what the preview showed.
fn apply_drops(session: &mut ImportSession, drop: &[usize]) -> Result<(), CliError> {
    let mut indices: Vec<usize> = drop.to_vec();
    indices.sort_unstable();
    indices.dedup();

    if let Some(&max) = indices.last() {
        if max >= session.len() {
            return Err(CliError::args(format!(
                "--drop index {} out of range ({} row(s), indices 0..{})",
                max,
                session.len(),
                session.len().saturating_sub(1)
            ))
            .with_hint("run 'saxozella preview <input>' to see row indices"));
        }
    }

    for index in indices.into_iter().rev() {
        session.remove_row(index);
    }
    Ok(())
}

// ============================================================================
// preview
// ============================================================================

fn cmd_preview(input: &Path, sheet: Option<&str>) -> Result<(), CliError> {
    let (session, sheet_name) = load_session(input, sheet)?;

    for (index, row) in session.rows().iter().enumerate() {
        println!("{:>4}  {}", index, row.display());
    }
    eprintln!(
        "{} row(s) mapped from sheet '{}' of {}",
        session.len(),
        sheet_name,
        input.display()
    );
    Ok(())
}

// ============================================================================
// sheets
// ============================================================================

fn cmd_sheets(input: &Path) -> Result<(), CliError> {
    let names = io::sheet_names(input).map_err(CliError::convert)?;
    if names.is_empty() {
        return Err(CliError::convert(ConvertError::NoSheet));
    }

    let picked = io::preferred_sheet(&names).cloned();
    for name in &names {
        let marker = if Some(name) == picked.as_ref() { "*" } else { " " };
        println!("{} {}", marker, name);
    }
    Ok(())
}

// ============================================================================
// shared
// ============================================================================

/// Read, build records, and load a session from one input file.
fn load_session(input: &Path, sheet: Option<&str>) -> Result<(ImportSession, String), CliError> {
    let data = io::read_sheet(input, sheet).map_err(CliError::convert)?;

    let records = build_records(&data.grid);
    if records.is_empty() {
        return Err(CliError::convert(ConvertError::EmptySheet {
            sheet: data.sheet_name,
        }));
    }

    let source_name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut session = ImportSession::new();
    session
        .load(&records, &source_name)
        .map_err(CliError::convert)?;
    Ok((session, data.sheet_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use saxozella_core::{CellValue, RawRecord};

    fn session_with(symbols: &[&str]) -> ImportSession {
        let records: Vec<RawRecord> = symbols
            .iter()
            .map(|symbol| {
                [
                    (
                        "Trade Execution Time".to_string(),
                        CellValue::Text("2024-03-15T09:30:00".to_string()),
                    ),
                    (
                        "Underlying Instrument Symbol".to_string(),
                        CellValue::Text(symbol.to_string()),
                    ),
                ]
                .into_iter()
                .collect()
            })
            .collect();
        let mut session = ImportSession::new();
        session.load(&records, "export.xlsx").unwrap();
        session
    }

    #[test]
    fn test_apply_drops_uses_preview_indices() {
        let mut session = session_with(&["A", "B", "C", "D"]);
        // Ascending input must still remove the rows the preview numbered
        apply_drops(&mut session, &[1, 3]).unwrap();
        let symbols: Vec<&str> = session.rows().iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["A", "C"]);
    }

    #[test]
    fn test_apply_drops_dedups() {
        let mut session = session_with(&["A", "B", "C"]);
        apply_drops(&mut session, &[2, 2]).unwrap();
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_apply_drops_out_of_range() {
        let mut session = session_with(&["A", "B"]);
        let err = apply_drops(&mut session, &[2]).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
        // Nothing removed on error
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_convert_error_codes_and_hints() {
        let err = CliError::convert(ConvertError::NoMappableRows);
        assert_eq!(err.code, exit_codes::EXIT_NO_ROWS);
        assert!(err.hint.is_some());

        let err = CliError::convert(ConvertError::NotSpreadsheet("t.csv".into()));
        assert_eq!(err.code, EXIT_USAGE);
    }
}

//! Result writers
//!
//! The crawler itself only returns an in-memory [`CrawlResult`]; these writers are
//! used by the CLI to persist it.

use crate::crawler::{CrawlResult, CrawledSymbol};
use std::path::Path;

pub mod csv;
pub mod json;

pub use self::csv::CsvTradesWriter;
pub use self::json::write_json;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Generic output writer trait
pub trait OutputWriter {
    /// Flush any buffered data to disk
    fn flush(&mut self) -> OutputResult<()>;

    /// Close the writer and finalize output
    fn close(self) -> OutputResult<()>;
}

/// Trait for writing crawled symbols
pub trait SymbolWriter: OutputWriter {
    /// Write one crawled symbol
    fn write_symbol(&mut self, symbol: &CrawledSymbol) -> OutputResult<()>;

    /// Write several crawled symbols in order
    fn write_symbols(&mut self, symbols: &[CrawledSymbol]) -> OutputResult<()> {
        for symbol in symbols {
            self.write_symbol(symbol)?;
        }
        Ok(())
    }
}

/// Supported result file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultFormat {
    /// Pretty JSON of the whole result
    #[default]
    Json,
    /// One CSV row per trade
    Csv,
}

/// Write `result` to `path` in `format`
pub fn write_result(result: &CrawlResult, path: &Path, format: ResultFormat) -> OutputResult<()> {
    match format {
        ResultFormat::Json => write_json(result, path),
        ResultFormat::Csv => {
            let mut writer = CsvTradesWriter::new(path)?;
            writer.write_symbols(&result.entries)?;
            writer.close()
        }
    }
}

/// Create the parent directory of `path` if it is missing
pub(crate) fn ensure_parent_dir(path: &Path) -> OutputResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}"))),
        _ => Ok(()),
    }
}

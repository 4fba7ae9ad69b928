//! CSV output writer
//!
//! One row per trade. Each row repeats the source identifier and the symbol header so
//! the file can be loaded as a flat table. A symbol without trades is written as a
//! single row with empty trade columns.

use crate::crawler::CrawledSymbol;
use crate::TradeRow;
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

use super::{ensure_parent_dir, OutputError, OutputResult, OutputWriter, SymbolWriter};

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Flush every N rows
const FLUSH_INTERVAL: u64 = 1_000;

/// CSV record for one trade of one symbol
#[derive(Debug, Serialize)]
struct TradeRecord<'a> {
    identifier: &'a str,
    load_type_name: &'a str,
    delivery_date: String,
    start_date: &'a str,
    end_date: &'a str,
    expire_date: &'a str,
    stuff_code: &'a str,
    load_type: &'a str,
    title: &'a str,
    hours: &'a str,
    energy_symbol: &'a str,
    start_validity: &'a str,
    end_validity: &'a str,
    start_validity_shamsi: &'a str,
    end_validity_shamsi: &'a str,
    ins_code: &'a str,
    open_symbol: &'a str,
    trade_date: &'a str,
    end: &'a str,
    lowest: &'a str,
    highest: &'a str,
    amount: &'a str,
    volume: &'a str,
    cost: &'a str,
}

impl<'a> TradeRecord<'a> {
    fn new(symbol: &'a CrawledSymbol, trade: Option<&'a TradeRow>) -> Self {
        let record = &symbol.record;
        let column = |f: fn(&'a TradeRow) -> &'a str| trade.map(f).unwrap_or("");
        Self {
            identifier: symbol.identifier.as_str(),
            load_type_name: &symbol.load_type,
            delivery_date: symbol.date.to_string(),
            start_date: &record.start_date,
            end_date: &record.end_date,
            expire_date: &record.expire_date,
            stuff_code: &record.stuff_code,
            load_type: &record.load_type,
            title: &record.title,
            hours: &record.hours,
            energy_symbol: &record.energy_symbol,
            start_validity: &record.start_validity,
            end_validity: &record.end_validity,
            start_validity_shamsi: &record.start_validity_shamsi,
            end_validity_shamsi: &record.end_validity_shamsi,
            ins_code: &record.ins_code,
            open_symbol: &record.open_symbol,
            trade_date: column(|t| t.date.as_str()),
            end: column(|t| t.end.as_str()),
            lowest: column(|t| t.lowest.as_str()),
            highest: column(|t| t.highest.as_str()),
            amount: column(|t| t.amount.as_str()),
            volume: column(|t| t.volume.as_str()),
            cost: column(|t| t.cost.as_str()),
        }
    }
}

/// CSV writer for crawled trades
pub struct CsvTradesWriter {
    writer: Writer<BufWriter<File>>,
    rows_written: u64,
}

impl CsvTradesWriter {
    /// Create a new CSV writer, creating parent directories as needed
    pub fn new<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        Self::new_with_buffer_size(path, DEFAULT_BUFFER_SIZE)
    }

    /// Create a new CSV writer with custom buffer size
    pub fn new_with_buffer_size<P: AsRef<Path>>(
        path: P,
        buffer_size: usize,
    ) -> OutputResult<Self> {
        let path = path.as_ref();
        info!("Creating CSV writer: path={}", path.display());

        ensure_parent_dir(path)?;
        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;

        let buf_writer = BufWriter::with_capacity(buffer_size, file);
        Ok(Self {
            writer: Writer::from_writer(buf_writer),
            rows_written: 0,
        })
    }

    /// Get number of rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    fn write_row(&mut self, row: &TradeRecord<'_>) -> OutputResult<()> {
        self.writer
            .serialize(row)
            .map_err(|e| OutputError::CsvError(format!("Failed to write row: {e}")))?;
        self.rows_written += 1;

        if self.rows_written % FLUSH_INTERVAL == 0 {
            self.flush()?;
            debug!("Progress: {} rows written", self.rows_written);
        }
        Ok(())
    }
}

impl SymbolWriter for CsvTradesWriter {
    fn write_symbol(&mut self, symbol: &CrawledSymbol) -> OutputResult<()> {
        if symbol.record.trades.is_empty() {
            return self.write_row(&TradeRecord::new(symbol, None));
        }
        for trade in &symbol.record.trades {
            self.write_row(&TradeRecord::new(symbol, Some(trade)))?;
        }
        Ok(())
    }
}

impl OutputWriter for CsvTradesWriter {
    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
    }

    fn close(mut self) -> OutputResult<()> {
        self.flush()?;
        info!("CSV writer closed: {} rows written", self.rows_written);
        Ok(())
    }
}

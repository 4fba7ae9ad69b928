//! JSON output

use crate::crawler::CrawlResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use super::{ensure_parent_dir, OutputError, OutputResult};

/// Write the whole result as pretty-printed JSON
pub fn write_json<P: AsRef<Path>>(result: &CrawlResult, path: P) -> OutputResult<()> {
    let path = path.as_ref();
    info!("Writing JSON result: path={}", path.display());

    ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, result)
        .map_err(|e| OutputError::SerializationError(e.to_string()))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
}

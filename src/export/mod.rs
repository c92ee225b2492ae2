//! Writing fetched tickets to disk.
//!
//! Output is a pretty-printed JSON array, either in one file
//! (`{stem}.json`) or split into numbered chunks (`{stem}1.json`,
//! `{stem}2.json`, ...).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::ticket::Ticket;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("unsupported export format '{0}'. Please use 'json'.")]
    UnsupportedFormat(String),

    #[error("failed to encode tickets for '{}': {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("error writing to file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
}

impl ExportFormat {
    /// Parse a configured format name, ignoring case.
    pub fn parse(name: &str) -> Result<Self, WriteError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            _ => Err(WriteError::UnsupportedFormat(name.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
        }
    }
}

/// One file that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub tickets: usize,
}

/// Per-file results of an export.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<WrittenFile>,
    pub failures: Vec<WriteError>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn tickets_written(&self) -> usize {
        self.written.iter().map(|f| f.tickets).sum()
    }
}

/// Write `batch` under the file stem `filename`.
///
/// With `tickets_per_file` set, every chunk is attempted even if an earlier
/// one failed; files already written stay on disk. An unsupported format
/// fails before anything is written.
pub fn write_batch(
    batch: &[Ticket],
    filename: &str,
    format: &str,
    tickets_per_file: Option<usize>,
) -> Result<ExportReport, WriteError> {
    let format = ExportFormat::parse(format)?;
    let mut report = ExportReport::default();

    let chunk_size = tickets_per_file.filter(|&n| n > 0);
    let Some(chunk_size) = chunk_size else {
        let path = output_path(filename, None, format);
        record(&mut report, write_file(&path, batch, format), path, batch.len());
        return Ok(report);
    };

    let chunks = batch.chunks(chunk_size);
    info!(files = chunks.len(), chunk_size, "splitting export across files");
    for (index, chunk) in chunks.enumerate() {
        let path = output_path(filename, Some(index + 1), format);
        record(&mut report, write_file(&path, chunk, format), path, chunk.len());
    }
    Ok(report)
}

fn record(report: &mut ExportReport, result: Result<(), WriteError>, path: PathBuf, tickets: usize) {
    match result {
        Ok(()) => {
            info!(path = %path.display(), tickets, "saved tickets");
            report.written.push(WrittenFile { path, tickets });
        }
        Err(e) => {
            error!(error = %e, "failed to save tickets");
            report.failures.push(e);
        }
    }
}

/// `{stem}.{ext}` or `{stem}{index}.{ext}`.
pub fn output_path(filename: &str, index: Option<usize>, format: ExportFormat) -> PathBuf {
    match index {
        Some(i) => PathBuf::from(format!("{}{}.{}", filename, i, format.extension())),
        None => PathBuf::from(format!("{}.{}", filename, format.extension())),
    }
}

fn write_file(path: &Path, tickets: &[Ticket], format: ExportFormat) -> Result<(), WriteError> {
    let io_err = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    match format {
        ExportFormat::Json => {
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
            tickets
                .serialize(&mut serializer)
                .map_err(|source| WriteError::Serialize {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
    }
    writer.flush().map_err(io_err)
}

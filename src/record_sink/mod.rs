//! Durable persistence of extracted records.
//!
//! The format is picked once per run; both variants share the same
//! `write`/`flush`/`close` contract. Opening and closing failures are fatal,
//! a single failed write is not.

pub mod csv_sink;
pub mod json_sink;

pub use csv_sink::CsvSink;
pub use json_sink::JsonDocumentSink;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::SinkFormat;
use crate::listing_extractor::JobRecord;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to open sink at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write record '{title}': {message}")]
    Write { title: String, message: String },

    #[error("Failed to flush {path}: {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to close sink at {path}: {message}")]
    Close { path: PathBuf, message: String },
}

/// What a closed sink left on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
    pub format: SinkFormat,
    /// CSV file or document directory
    pub artifact: PathBuf,
    pub records_written: usize,
}

pub enum RecordSink {
    Csv(CsvSink),
    JsonDocuments(JsonDocumentSink),
}

impl RecordSink {
    /// Open a sink of `format` at `destination` (file for CSV, directory for documents)
    pub fn open(format: SinkFormat, destination: &Path) -> Result<Self, PersistError> {
        match format {
            SinkFormat::Csv => CsvSink::create(destination).map(RecordSink::Csv),
            SinkFormat::JsonDocuments => {
                JsonDocumentSink::create(destination).map(RecordSink::JsonDocuments)
            }
        }
    }

    pub fn write(&mut self, record: &JobRecord) -> Result<(), PersistError> {
        match self {
            RecordSink::Csv(sink) => sink.write(record),
            RecordSink::JsonDocuments(sink) => sink.write(record),
        }
    }

    /// Make everything written so far durable
    pub fn flush(&mut self) -> Result<(), PersistError> {
        match self {
            RecordSink::Csv(sink) => sink.flush(),
            // Every document is written in full by `write`
            RecordSink::JsonDocuments(_) => Ok(()),
        }
    }

    pub fn close(self) -> Result<SinkReport, PersistError> {
        match self {
            RecordSink::Csv(sink) => sink.close(),
            RecordSink::JsonDocuments(sink) => Ok(sink.close()),
        }
    }

    #[must_use]
    pub fn artifact_path(&self) -> &Path {
        match self {
            RecordSink::Csv(sink) => sink.path(),
            RecordSink::JsonDocuments(sink) => sink.dir(),
        }
    }

    #[must_use]
    pub fn records_written(&self) -> usize {
        match self {
            RecordSink::Csv(sink) => sink.records_written(),
            RecordSink::JsonDocuments(sink) => sink.records_written(),
        }
    }
}

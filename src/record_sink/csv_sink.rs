use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};

use super::{PersistError, SinkReport};
use crate::config::SinkFormat;
use crate::listing_extractor::JobRecord;
use crate::utils::constants::CSV_HEADER;

/// One CSV file, header first, one row per record.
///
/// The file is truncated on open, so reruns against the same pages produce
/// the same bytes.
pub struct CsvSink {
    path: PathBuf,
    writer: Writer<File>,
    records_written: usize,
}

impl CsvSink {
    pub fn create(path: &Path) -> Result<Self, PersistError> {
        let open_err = |source: std::io::Error| PersistError::Open {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(open_err)?;
        }

        let file = File::create(path).map_err(open_err)?;
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file);

        writer
            .write_record(CSV_HEADER)
            .and_then(|()| writer.flush().map_err(csv::Error::from))
            .map_err(|e| open_err(std::io::Error::other(e.to_string())))?;

        log::debug!("Opened CSV sink at {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            writer,
            records_written: 0,
        })
    }

    pub fn write(&mut self, record: &JobRecord) -> Result<(), PersistError> {
        self.writer
            .write_record(record.csv_row())
            .map_err(|e| PersistError::Write {
                title: record.title.clone(),
                message: e.to_string(),
            })?;
        self.records_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), PersistError> {
        self.writer.flush().map_err(|source| PersistError::Flush {
            path: self.path.clone(),
            source,
        })
    }

    pub fn close(mut self) -> Result<SinkReport, PersistError> {
        self.flush()?;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| PersistError::Close {
                path: self.path.clone(),
                message: e.error().to_string(),
            })?;
        file.sync_all().map_err(|e| PersistError::Close {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        log::info!(
            "Wrote {} record(s) to {}",
            self.records_written,
            self.path.display()
        );
        Ok(SinkReport {
            format: SinkFormat::Csv,
            artifact: self.path,
            records_written: self.records_written,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

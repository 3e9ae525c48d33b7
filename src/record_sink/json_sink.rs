use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{PersistError, SinkReport};
use crate::config::SinkFormat;
use crate::listing_extractor::JobRecord;

/// One pretty-printed JSON document per record, named after the title.
///
/// Two records with the same title map to the same file and the later one
/// wins; the overwrite is logged.
pub struct JsonDocumentSink {
    dir: PathBuf,
    written: HashSet<PathBuf>,
    records_written: usize,
}

/// `Senior Dev / Ops` → `Senior_Dev___Ops.json`
#[must_use]
pub fn document_file_name(title: &str) -> String {
    let underscored: String = title
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let mut stem = sanitize_filename::sanitize(&underscored);
    if stem.is_empty() {
        stem = "untitled".to_string();
    }
    format!("{stem}.json")
}

impl JsonDocumentSink {
    pub fn create(dir: &Path) -> Result<Self, PersistError> {
        std::fs::create_dir_all(dir).map_err(|source| PersistError::Open {
            path: dir.to_path_buf(),
            source,
        })?;
        log::debug!("Writing JSON documents under {}", dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            written: HashSet::new(),
            records_written: 0,
        })
    }

    pub fn write(&mut self, record: &JobRecord) -> Result<(), PersistError> {
        let write_err = |message: String| PersistError::Write {
            title: record.title.clone(),
            message,
        };

        let path = self.dir.join(document_file_name(&record.title));
        let body = serde_json::to_string_pretty(record).map_err(|e| write_err(e.to_string()))?;
        std::fs::write(&path, body)
            .map_err(|e| write_err(format!("{}: {e}", path.display())))?;

        if !self.written.insert(path.clone()) {
            log::warn!(
                "Overwrote {} (another record this run has the same title)",
                path.display()
            );
        }
        self.records_written += 1;
        Ok(())
    }

    pub fn close(self) -> SinkReport {
        log::info!(
            "Wrote {} document(s) ({} distinct file(s)) to {}",
            self.records_written,
            self.written.len(),
            self.dir.display()
        );
        SinkReport {
            format: SinkFormat::JsonDocuments,
            artifact: self.dir,
            records_written: self.records_written,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_replaces_spaces_and_separators() {
        assert_eq!(document_file_name("Senior Dev / Ops"), "Senior_Dev___Ops.json");
        assert_eq!(document_file_name(r"A\B"), "A_B.json");
    }

    #[test]
    fn test_file_name_never_empty() {
        assert_eq!(document_file_name("::"), "untitled.json");
    }
}

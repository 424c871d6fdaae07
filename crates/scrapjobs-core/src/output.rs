//! Serialization boundary for harvested records.
//!
//! Records leave the pipeline either as one JSON array (stdout) or as one
//! JSON file per record:
//!
//! ```text
//! output_dir/
//! ├── Senior_Rust_Engineer.json
//! └── Go_Developer.json
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::Record;
use crate::util::record_file_name;

/// Where harvested records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSink {
    /// A pretty-printed JSON array on stdout.
    Stdout,
    /// One pretty-printed JSON file per record; records sharing a title
    /// overwrite each other.
    Directory(PathBuf),
}

impl RecordSink {
    pub fn from_output_dir(dir: Option<PathBuf>) -> Self {
        dir.map_or(RecordSink::Stdout, RecordSink::Directory)
    }

    /// Writes `records`, returning the files created (none for stdout).
    pub fn write(&self, records: &[Record]) -> Result<Vec<PathBuf>, AppError> {
        match self {
            RecordSink::Stdout => {
                let stdout = std::io::stdout();
                write_json(records, stdout.lock())?;
                Ok(Vec::new())
            }
            RecordSink::Directory(dir) => write_files(records, dir),
        }
    }
}

/// Writes `records` as a pretty JSON array followed by a newline.
pub fn write_json<T: serde::Serialize + ?Sized, W: Write>(
    value: &T,
    mut writer: W,
) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn write_files(records: &[Record], dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(records.len());
    for record in records {
        let path = dir.join(record_file_name(record.title()));
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, json)?;
        tracing::info!(path = %path.display(), "Record written");
        written.push(path);
    }
    Ok(written)
}

/// Lists the `*.json` files directly inside `dir`, sorted by path.
pub fn record_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads one record file as written by [`RecordSink::Directory`].
pub fn read_record(path: &Path) -> Result<Record, AppError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

//! Source and sink adapters for in-memory cells and text-line files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use sluice_core::error::{RuntimeError, SourceFailure};
use sluice_core::io::{Sink, Source};
use sluice_core::types::{record, Value};

/// An immutable in-memory source.
pub struct MemorySource {
    name: String,
    records: Vec<Value>,
}

impl MemorySource {
    /// Wrap pre-encoded records.
    pub fn new(name: impl Into<String>, records: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Encode a typed collection.
    pub fn from_iter<T, I>(name: &str, items: I) -> Result<Self, RuntimeError>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let records = items
            .into_iter()
            .map(|item| record::encode(&item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, records))
    }
}

impl Source for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), SourceFailure> {
        Ok(())
    }

    fn read(&self) -> Result<Vec<Value>, RuntimeError> {
        Ok(self.records.clone())
    }
}

/// A sink writing into a shared in-memory cell.
///
/// The cell stays readable after the run completes, which is how callers
/// (and tests) observe a plan's output.
pub struct MemorySink {
    name: String,
    cell: Arc<Mutex<Vec<Value>>>,
}

impl MemorySink {
    /// Create a sink with a fresh cell.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cell: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The shared cell; clones observe the same written records.
    pub fn cell(&self) -> Arc<Mutex<Vec<Value>>> {
        Arc::clone(&self.cell)
    }

    /// Snapshot of the records written so far.
    pub fn records(&self) -> Vec<Value> {
        self.cell.lock().clone()
    }

    /// Decode the written records back into their typed form.
    pub fn typed_records<T: DeserializeOwned>(&self) -> Result<Vec<T>, RuntimeError> {
        self.records().into_iter().map(record::decode).collect()
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, records: &[Value]) -> Result<(), RuntimeError> {
        *self.cell.lock() = records.to_vec();
        Ok(())
    }
}

/// A source reading one string record per line of a text file.
pub struct TextLineSource {
    path: PathBuf,
    name: String,
}

impl TextLineSource {
    /// Read lines from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl Source for TextLineSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), SourceFailure> {
        if self.path.is_file() {
            Ok(())
        } else {
            Err(SourceFailure {
                name: self.name.clone(),
                message: "input file does not exist".to_string(),
            })
        }
    }

    fn read(&self) -> Result<Vec<Value>, RuntimeError> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| RuntimeError::Source(format!("{}: {}", self.name, e)))?;
        Ok(text.lines().map(|line| Value::String(line.to_string())).collect())
    }
}

/// A sink writing one line per record to a text file.
///
/// String records are written verbatim; anything else is rendered in its
/// canonical encoded form.
pub struct TextLineSink {
    path: PathBuf,
    name: String,
}

impl TextLineSink {
    /// Write lines to `path`, replacing any existing file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    /// The output path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for TextLineSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, records: &[Value]) -> Result<(), RuntimeError> {
        let mut out = String::new();
        for value in records {
            match value {
                Value::String(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            }
            out.push('\n');
        }
        fs::write(&self.path, out).map_err(|e| RuntimeError::Sink(format!("{}: {}", self.name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let source = MemorySource::from_iter("numbers", vec![1u64, 2, 3]).unwrap();
        let sink = MemorySink::new("out");

        let records = source.read().unwrap();
        sink.write(&records).unwrap();

        assert_eq!(sink.typed_records::<u64>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_text_line_source_validates_missing_file() {
        let source = TextLineSource::new("/definitely/not/here.txt");
        let failure = source.validate().unwrap_err();
        assert!(failure.message.contains("does not exist"));
    }

    #[test]
    fn test_text_line_sink_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let sink = TextLineSink::new(&path);
        sink.write(&[
            Value::String("hello".to_string()),
            Value::String("world".to_string()),
        ])
        .unwrap();

        let source = TextLineSource::new(&path);
        source.validate().unwrap();
        let back = source.read().unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0], Value::String("hello".to_string()));
    }
}

//! Reading and writing motion records by file extension

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{MotionError, Result};

/// Serialization formats a motion record may be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Yaml,
}

impl RecordFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Extensions recognised for this format
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Json => &["json"],
            Self::Yaml => &["yaml", "yml"],
        }
    }

    fn require(path: &Path) -> Result<Self> {
        Self::from_path(path).ok_or_else(|| MotionError::UnsupportedFormat(path.to_path_buf()))
    }
}

/// Whether `path` has an extension of a supported record format
pub fn is_record_file(path: &Path) -> bool {
    RecordFormat::from_path(path).is_some()
}

/// Read a record, picking the decoder by extension
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = RecordFormat::require(path)?;
    let reader = BufReader::new(File::open(path)?);
    let record = match format {
        RecordFormat::Json => serde_json::from_reader(reader)?,
        RecordFormat::Yaml => serde_yaml_ng::from_reader(reader)?,
    };
    Ok(record)
}

/// Write a record, picking the encoder by extension
///
/// Missing parent directories are created.
pub fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let format = RecordFormat::require(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        RecordFormat::Json => serde_json::to_writer_pretty(&mut writer, record)?,
        RecordFormat::Yaml => serde_yaml_ng::to_writer(&mut writer, record)?,
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;
    use test_case::test_case;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        fps: f32,
        values: Vec<f32>,
    }

    #[test_case("clip.json", Some(RecordFormat::Json))]
    #[test_case("clip.JSON", Some(RecordFormat::Json))]
    #[test_case("clip.yml", Some(RecordFormat::Yaml))]
    #[test_case("clip.yaml", Some(RecordFormat::Yaml))]
    #[test_case("clip.npz", None)]
    #[test_case("clip", None)]
    fn test_format_detection(name: &str, expected: Option<RecordFormat>) {
        assert_eq!(RecordFormat::from_path(Path::new(name)), expected);
    }

    #[test_case("out.json")]
    #[test_case("nested/dir/out.yaml")]
    fn test_write_then_read(name: &str) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        let sample = Sample {
            fps: 30.0,
            values: vec![0.5, -1.25],
        };
        write_record(&path, &sample).unwrap();
        let back: Sample = read_record(&path).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.pkl");
        let err = write_record(&path, &Sample { fps: 1.0, values: vec![] }).unwrap_err();
        assert!(matches!(err, MotionError::UnsupportedFormat(_)));
    }
}

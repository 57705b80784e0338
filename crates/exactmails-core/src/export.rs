use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::{Error, Result};

pub use exactmails_api::ExportRequestFormat;

/// Export format options for the server-side history export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "xlsx" => Some(ExportFormat::Xlsx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// Wire name the backend expects in the export request.
    pub fn as_request(&self) -> ExportRequestFormat {
        match self {
            ExportFormat::Csv => ExportRequestFormat::Csv,
            ExportFormat::Xlsx => ExportRequestFormat::Xlsx,
        }
    }
}

/// Saves the opaque export payload the backend produced.
pub struct Exporter;

impl Exporter {
    /// Write an export payload to a file, validating the extension matches a
    /// known format.
    pub fn save_to_file<P: AsRef<Path>>(payload: &[u8], path: P) -> Result<ExportFormat> {
        let path = path.as_ref();

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ExportFormat::from_extension)
            .ok_or_else(|| {
                Error::ConfigError(
                    "Could not determine export format from extension. Use .csv or .xlsx"
                        .to_string(),
                )
            })?;

        let mut file = File::create(path)
            .map_err(|e| Error::ConfigError(format!("Failed to create file: {}", e)))?;

        file.write_all(payload)
            .map_err(|e| Error::ConfigError(format!("Failed to write file: {}", e)))?;

        Ok(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_detection() {
        assert_eq!(ExportFormat::from_extension("csv"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_extension("CSV"), Some(ExportFormat::Csv));
        assert_eq!(
            ExportFormat::from_extension("xlsx"),
            Some(ExportFormat::Xlsx)
        );
        assert_eq!(ExportFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let format = Exporter::save_to_file(b"email,status\n", &path).unwrap();
        assert_eq!(format, ExportFormat::Csv);
        assert_eq!(std::fs::read(&path).unwrap(), b"email,status\n");
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        assert!(Exporter::save_to_file(b"data", &path).is_err());
    }
}

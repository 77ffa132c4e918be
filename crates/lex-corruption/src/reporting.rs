//! Writing corrupted datasets and corruption reports to disk.

use crate::error::{Result, ResultExt};
use crate::types::CorruptionReport;
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes corruption outputs under a single output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `df` as `<output_dir>/<file_name>.csv`.
    pub fn write_dataset(&self, df: &mut DataFrame, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(format!("{}.csv", file_name));
        let mut file = File::create(&output_path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(df)
            .context(format!("Writing {}", output_path.display()))?;

        info!("Dataset saved: {}", output_path.display());
        Ok(output_path)
    }

    /// Write `report` as pretty JSON to `<output_dir>/<base_name>_report.json`.
    pub fn write_report(&self, report: &CorruptionReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::io::csv::read::CsvReadOptions;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "lex-corruption-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_write_dataset_round_trip() {
        let dir = scratch_dir("dataset");
        let writer = ReportWriter::new(&dir);
        let mut df = df!("a" => [1i64, 2], "b" => ["x", "y, z"]).unwrap();

        let path = writer.write_dataset(&mut df, "corrupted").unwrap();
        assert!(path.ends_with("corrupted.csv"));

        let read = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path))
            .unwrap()
            .finish()
            .unwrap();
        assert!(read.equals(&df));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_report() {
        let dir = scratch_dir("report");
        let writer = ReportWriter::new(&dir);
        let report = CorruptionReport {
            generated_at: "2024-01-01T00:00:00+00:00".to_string(),
            seed: Some(3),
            rows_before: 10,
            rows_after: 10,
            columns: 2,
            steps: Vec::new(),
        };

        let path = writer.write_report(&report, "iris").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(path.ends_with("iris_report.json"));
        assert!(content.contains("\"seed\": 3"));

        fs::remove_dir_all(&dir).unwrap();
    }
}

//! Output writing module for reconstructed series
//!
//! Writes one file per station, `{STATION}.csv` or `{STATION}.parquet`,
//! into the output directory.

use crate::config::{OutputFormat, ProcessorConfig};
use crate::error::{AsosError, Result};
use crate::series::ObservationSeries;

use polars::prelude::{CsvWriter, DataFrame, ParquetWriter as PolarsParquetWriter, SerWriter};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// ISO 8601 timestamps in CSV output
const CSV_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Per-station series writer
#[derive(Debug)]
pub struct SeriesWriter {
    output_dir: PathBuf,
    config: ProcessorConfig,
}

impl SeriesWriter {
    /// Create a new writer targeting `output_dir`
    pub fn new(output_dir: PathBuf, config: ProcessorConfig) -> Self {
        Self { output_dir, config }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Output path for a station
    pub fn station_path(&self, station: &str) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            station,
            self.config.output_format.extension()
        ))
    }

    /// Write a station's series and return the path and row count
    pub fn write_station(
        &self,
        station: &str,
        series: &ObservationSeries,
    ) -> Result<(PathBuf, usize)> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self.station_path(station);
        let mut df = series.to_dataframe(
            &self.config.precipitation_column,
            self.config.retain_raw_precipitation,
        )?;
        let rows = df.height();

        debug!(
            "Writing {} rows for {} to {}",
            rows,
            station,
            path.display()
        );

        match self.config.output_format {
            OutputFormat::Csv => self.write_csv(&path, &mut df)?,
            OutputFormat::Parquet => self.write_parquet(&path, &mut df)?,
        }

        Ok((path, rows))
    }

    fn write_csv(&self, path: &Path, df: &mut DataFrame) -> Result<()> {
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_datetime_format(Some(CSV_DATETIME_FORMAT.to_string()))
            .finish(df)
            .map_err(|e| AsosError::ProcessingFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to write csv: {}", e),
            })
    }

    fn write_parquet(&self, path: &Path, df: &mut DataFrame) -> Result<()> {
        let file = File::create(path)?;
        PolarsParquetWriter::new(file)
            .with_compression(self.config.compression_algorithm.to_polars_compression())
            .finish(df)
            .map_err(|e| AsosError::ProcessingFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to write parquet: {}", e),
            })?;
        Ok(())
    }
}

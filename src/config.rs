//! Configuration management and validation.
//!
//! Provides the processing parameters for batch reconstruction and the
//! output settings used by the series writer.

use crate::constants::{DEFAULT_CADENCE_MINUTES, columns};
use crate::error::{AsosError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Output file formats for reconstructed series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Comma separated text, one file per station
    Csv,
    /// Apache Parquet, one file per station
    Parquet,
}

impl OutputFormat {
    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }

    /// Parse a format name as given on the command line
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" | "pq" => Ok(OutputFormat::Parquet),
            other => Err(AsosError::configuration(format!(
                "Unknown output format '{}' (expected csv or parquet)",
                other
            ))),
        }
    }
}

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }

    /// Parse a compression name as given on the command line
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "snappy" => Ok(CompressionAlgorithm::Snappy),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "none" | "uncompressed" => Ok(CompressionAlgorithm::Uncompressed),
            other => Err(AsosError::configuration(format!(
                "Unknown compression '{}' (expected snappy, zstd, lz4 or none)",
                other
            ))),
        }
    }
}

/// Global configuration for ASOS batch processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Reporting cadence of the reconstructed series, in minutes
    pub cadence_minutes: u32,

    /// Maximum number of batches (station-months) processed concurrently
    pub max_concurrent_batches: usize,

    /// Descend into sub-directories when discovering report files
    pub recursive: bool,

    /// Output file format
    pub output_format: OutputFormat,

    /// Compression used when writing parquet
    pub compression_algorithm: CompressionAlgorithm,

    /// Keep the uncorrected hourly accumulation column in the output
    pub retain_raw_precipitation: bool,

    /// Label of the corrected precipitation column
    pub precipitation_column: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            cadence_minutes: DEFAULT_CADENCE_MINUTES,
            max_concurrent_batches: num_cpus::get().max(1),
            recursive: false,
            output_format: OutputFormat::Csv,
            compression_algorithm: CompressionAlgorithm::Snappy,
            retain_raw_precipitation: true,
            precipitation_column: columns::PRECIPITATION.to_string(),
        }
    }
}

impl ProcessorConfig {
    /// Create configuration with a custom cadence
    pub fn with_cadence_minutes(mut self, minutes: u32) -> Self {
        self.cadence_minutes = minutes;
        self
    }

    /// Create configuration with a custom concurrency limit
    pub fn with_max_concurrent_batches(mut self, batches: usize) -> Self {
        self.max_concurrent_batches = batches;
        self
    }

    /// Enable recursive discovery of report files
    pub fn with_recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Set the output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the parquet compression algorithm
    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression_algorithm = compression;
        self
    }

    /// Drop the raw precipitation column from the output
    pub fn without_raw_precipitation(mut self) -> Self {
        self.retain_raw_precipitation = false;
        self
    }

    /// Rename the corrected precipitation column
    pub fn with_precipitation_column(mut self, name: impl Into<String>) -> Self {
        self.precipitation_column = name.into();
        self
    }

    /// Series cadence as a chrono duration
    pub fn cadence(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::minutes(i64::from(self.cadence_minutes))
    }

    /// Check the configuration for values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.cadence_minutes == 0 || 60 % self.cadence_minutes != 0 {
            return Err(AsosError::configuration(format!(
                "Cadence must divide the hour evenly, got {} minutes",
                self.cadence_minutes
            )));
        }

        if self.max_concurrent_batches == 0 {
            return Err(AsosError::configuration(
                "At least one concurrent batch is required",
            ));
        }

        let name = self.precipitation_column.trim();
        if name.is_empty() {
            return Err(AsosError::configuration(
                "Precipitation column name must not be empty",
            ));
        }
        if [
            columns::DATETIME,
            columns::TEMPERATURE,
            columns::DEW_POINT,
            columns::WIND_SPEED,
            columns::WIND_DIRECTION,
            columns::AIR_PRESSURE,
            columns::SKY_COVER,
            columns::RAW_PRECIPITATION,
        ]
        .contains(&name)
        {
            return Err(AsosError::configuration(format!(
                "Precipitation column name '{}' collides with another output column",
                name
            )));
        }

        debug!(
            "Configuration valid: cadence={}min, concurrency={}, format={:?}",
            self.cadence_minutes, self.max_concurrent_batches, self.output_format
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProcessorConfig::default();
        assert_eq!(config.cadence_minutes, 5);
        assert!(config.retain_raw_precipitation);
        assert_eq!(config.precipitation_column, "precipitation");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cadence_must_divide_hour() {
        assert!(
            ProcessorConfig::default()
                .with_cadence_minutes(0)
                .validate()
                .is_err()
        );
        assert!(
            ProcessorConfig::default()
                .with_cadence_minutes(7)
                .validate()
                .is_err()
        );
        assert!(
            ProcessorConfig::default()
                .with_cadence_minutes(15)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_precipitation_column_collision() {
        let config = ProcessorConfig::default().with_precipitation_column("temperature");
        match config.validate() {
            Err(AsosError::Configuration { message }) => assert!(message.contains("collides")),
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_format_and_compression_names() {
        assert_eq!(OutputFormat::from_name("CSV").unwrap(), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_name("parquet").unwrap(),
            OutputFormat::Parquet
        );
        assert!(OutputFormat::from_name("xlsx").is_err());
        assert_eq!(OutputFormat::Parquet.extension(), "parquet");

        assert_eq!(
            CompressionAlgorithm::from_name("none").unwrap(),
            CompressionAlgorithm::Uncompressed
        );
        assert!(CompressionAlgorithm::from_name("brotli").is_err());
    }
}

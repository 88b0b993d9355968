//! ASOS Processor Library
//!
//! A Rust library for decoding US ASOS/METAR surface observation reports
//! and rebuilding them into regular time series.
//!
//! This library provides tools for:
//! - Parsing raw METAR text, including NCDC 5-minute archive envelopes and
//!   the North American remark groups
//! - Deduplicating and resampling reports onto a fixed cadence
//! - Inferring the rain gauge's hourly reset minute and converting the
//!   cumulative-within-hour counter to per-interval depths
//! - Processing whole archives concurrently into per-station CSV or Parquet files

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod metar;
pub mod models;
pub mod processor;
pub mod series;

// Re-export commonly used types
pub use config::ProcessorConfig;
pub use error::{AsosError, Result};
pub use metar::{MetarReport, parse, parse_with_reference};
pub use models::{BatchKey, BatchStats, Diagnostic, ParsedObservation, ProcessingStats};
pub use processor::BatchProcessor;
pub use series::{
    ObservationSeries, ResetTime, deduplicate_and_resample, difference_precipitation,
    infer_reset_time, reconstruct,
};

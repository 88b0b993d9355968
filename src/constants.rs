//! Application constants for the ASOS processor
//!
//! Cover fractions, record offsets, unit conversions, plausibility ranges
//! and output column names used throughout the crate.

// =============================================================================
// Sky Cover
// =============================================================================

/// Opacity fractions assigned to sky cover codes
pub mod sky_cover {
    /// Clear / sky clear / no significant cloud / no cloud detected
    pub const CLEAR: f64 = 0.0;

    /// Few clouds (1-2 oktas)
    pub const FEW: f64 = 0.1785;

    /// Scattered (3-4 oktas)
    pub const SCATTERED: f64 = 0.4375;

    /// Broken (5-7 oktas)
    pub const BROKEN: f64 = 0.75;

    /// Vertical visibility into an obscured sky
    pub const VERTICAL_VISIBILITY: f64 = 0.99;

    /// Overcast (8 oktas)
    pub const OVERCAST: f64 = 1.0;
}

// =============================================================================
// NCDC 5-minute ASOS record layout (DSI-6401)
// =============================================================================

/// Fixed character offsets of the station-products envelope
pub mod envelope {
    use std::ops::Range;

    pub const STATION: Range<usize> = 5..9;
    pub const YEAR: Range<usize> = 13..17;
    pub const MONTH: Range<usize> = 17..19;
    pub const DAY: Range<usize> = 19..21;
    pub const HOUR: Range<usize> = 37..39;
    pub const MINUTE: Range<usize> = 40..42;

    /// Offsets of the two `:` separators in the `HH:MM:SS` field
    pub const TIME_SEPARATORS: [usize; 2] = [39, 42];

    /// The METAR body starts after the `HH:MM:SS` field
    pub const BODY_START: usize = 45;
}

/// File name prefix used by NCDC for 5-minute ASOS files (`64010KPDX201601.dat`)
pub const NCDC_FILE_PREFIX: &str = "64010";

/// Extension of raw report files
pub const REPORT_FILE_EXTENSION: &str = "dat";

/// Skipped-report messages kept per batch for the summary
pub const MAX_SKIPPED_MESSAGES: usize = 20;

// =============================================================================
// Time Series
// =============================================================================

/// ASOS reporting cadence in minutes
pub const DEFAULT_CADENCE_MINUTES: u32 = 5;

/// Reset minute used when a batch carries no precipitation signal
pub const DEFAULT_RESET_MINUTE: u32 = 0;

// =============================================================================
// Units and Plausibility
// =============================================================================

pub mod units {
    /// Knots per metre per second
    pub const KNOTS_PER_MPS: f64 = 1.943_844;

    /// Knots per kilometre per hour
    pub const KNOTS_PER_KMH: f64 = 1.0 / 1.852;

    /// Inches of mercury per hectopascal
    pub const INHG_PER_HPA: f64 = 0.029_529_983;

    /// Statute miles per metre
    pub const MILES_PER_METRE: f64 = 1.0 / 1609.344;

    /// Statute miles per kilometre
    pub const MILES_PER_KM: f64 = 1.0 / 1.609_344;
}

/// Physically plausible bounds; values outside are malformed groups
pub mod limits {
    pub const MIN_TEMPERATURE_C: f64 = -90.0;
    pub const MAX_TEMPERATURE_C: f64 = 70.0;

    pub const MAX_WIND_DIRECTION: f64 = 360.0;

    pub const MIN_ALTIMETER_INHG: f64 = 25.0;
    pub const MAX_ALTIMETER_INHG: f64 = 33.0;
}

// =============================================================================
// Output Columns
// =============================================================================

pub mod columns {
    pub const DATETIME: &str = "datetime";
    pub const TEMPERATURE: &str = "temperature";
    pub const DEW_POINT: &str = "dew_point";
    pub const WIND_SPEED: &str = "wind_speed";
    pub const WIND_DIRECTION: &str = "wind_direction";
    pub const AIR_PRESSURE: &str = "air_pressure";
    pub const SKY_COVER: &str = "sky_cover";
    pub const PRECIPITATION: &str = "precipitation";
    pub const RAW_PRECIPITATION: &str = "raw_precipitation";
}

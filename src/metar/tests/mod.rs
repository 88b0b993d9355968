//! Tests for report decoding
//!
//! Group-by-group grammar checks plus whole-line parsing with and without
//! the NCDC envelope.

pub mod parse_tests;
pub mod remark_tests;

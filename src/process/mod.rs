// src/process/mod.rs
//! The table stages: load → combine → timestamps → clean → write.
//!
//! Every stage takes a `RecordBatch` by reference and hands back a new one;
//! nothing is mutated in place.

pub mod clean;
pub mod combine;
pub mod fixups;
pub mod load;
pub mod timestamp;
pub mod utils;
pub mod write;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::sync::Arc;

pub const INCIDENT_DATE: &str = "Incident Date";
pub const INCIDENT_TIME: &str = "Incident Time";
pub const FLIGHT_ID: &str = "Flight ID";
pub const LASER_COLOR: &str = "Laser Color";
pub const INJURY: &str = "Injury";
pub const STATE: &str = "State";

/// Column set every source is loaded into, in order.
pub const CANONICAL_HEADERS: [&str; 10] = [
    INCIDENT_DATE,
    INCIDENT_TIME,
    FLIGHT_ID,
    "Aircraft",
    "Altitude",
    "Airport",
    LASER_COLOR,
    INJURY,
    "City",
    STATE,
];

pub const DATETIME_UTC: &str = "datetime_utc";
pub const YEAR: &str = "year";
pub const INJURY_CLEAN: &str = "injury_clean";
pub const STATE_CLEAN: &str = "state_clean";
pub const COLORS_CLEAN: &str = "colors_clean";

/// Every column of the written file, in the order the stages add them.
pub fn output_headers() -> Vec<&'static str> {
    CANONICAL_HEADERS
        .iter()
        .copied()
        .chain([DATETIME_UTC, YEAR, INJURY_CLEAN, STATE_CLEAN, COLORS_CLEAN])
        .collect()
}

/// Ten nullable utf8 columns.
pub fn canonical_schema() -> SchemaRef {
    Arc::new(Schema::new(
        CANONICAL_HEADERS
            .iter()
            .map(|h| Field::new(*h, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ))
}

//! Wind resource analysis over point data frames.
//!
//! Every routine takes a Polars [`polars::frame::DataFrame`] as returned by
//! [`crate::WindToolkit::point_data`]: a `time_index` datetime column plus one or
//! more numeric columns such as `windspeed_100m`.

pub mod columns;
pub mod diurnal;
pub mod error;
pub mod pdf;
pub mod turbulence;

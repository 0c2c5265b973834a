//! Core types for CHIRPS point precipitation reports.
//!
//! The heavy lifting (date filtering, temporal sum, spatial mean) happens in a
//! remote geospatial service reached through [`service::AggregationService`].
//! With the `api` feature enabled, [`earth_engine::Session`] is the Earth Engine
//! implementation of that trait.

pub mod error;
pub mod point;
pub mod query;
pub mod record;
pub mod service;
pub mod window;

#[cfg(feature = "api")]
pub mod earth_engine;

pub use error::{InitError, InputError, QueryError};
pub use point::Point;
pub use record::{AnnualRecord, Thresholds};
pub use service::{AggregationRequest, AggregationService, Reducer};
pub use window::{MonthDay, SeasonWindow, YearRange};

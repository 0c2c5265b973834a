//! The seam between report generation and the remote geospatial service.

use crate::{error::QueryError, point::Point};
use serde::Serialize;
use std::future::Future;

/// CHIRPS daily precipitation collection.
pub const CHIRPS_DAILY: &str = "UCSB-CHG/CHIRPS/DAILY";

/// Band holding daily precipitation in millimetres.
pub const PRECIPITATION_BAND: &str = "precipitation";

/// Spatial resolution of the reduction, in metres.
pub const DEFAULT_SCALE: f64 = 5000.0;

/// Spatial reducer applied around the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reducer {
    Mean,
}

impl Reducer {
    /// Name of the reducer constructor on the remote side.
    pub fn function_name(&self) -> &'static str {
        match self {
            Reducer::Mean => "Reducer.mean",
        }
    }
}

/// Sum `band` of `dataset` over `[start, end)` and reduce it spatially at `point`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationRequest {
    pub dataset: String,
    pub band: String,
    /// `YYYY-MM-DD`, inclusive
    pub start: String,
    /// `YYYY-MM-DD`, exclusive
    pub end: String,
    pub point: Point,
    pub reducer: Reducer,
    pub scale: f64,
}

impl AggregationRequest {
    /// A CHIRPS daily precipitation request with the fixed reducer and scale.
    pub fn chirps(point: Point, start: String, end: String) -> Self {
        AggregationRequest {
            dataset: CHIRPS_DAILY.to_string(),
            band: PRECIPITATION_BAND.to_string(),
            start,
            end,
            point,
            reducer: Reducer::Mean,
            scale: DEFAULT_SCALE,
        }
    }
}

/// A remote service able to answer aggregation requests.
///
/// `Ok(None)` means the service answered but had no value for the band.
pub trait AggregationService {
    fn aggregate(
        &self,
        request: &AggregationRequest,
    ) -> impl Future<Output = Result<Option<f64>, QueryError>>;
}

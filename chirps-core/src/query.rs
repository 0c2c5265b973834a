//! Builds one year's aggregation request and turns the answer into a record.

use crate::{
    error::QueryError,
    point::Point,
    record::AnnualRecord,
    service::{AggregationRequest, AggregationService},
    window::SeasonWindow,
};
use log::debug;

pub fn annual_request(point: Point, year: i32, window: &SeasonWindow) -> AggregationRequest {
    let (start, end) = window.date_strings(year);
    AggregationRequest::chirps(point, start, end)
}

/// Query the accumulated precipitation at `point` for `year`'s window.
///
/// A missing value becomes 0.0. Service errors are returned untouched.
pub async fn annual_record<S: AggregationService>(
    service: &S,
    point: Point,
    year: i32,
    window: &SeasonWindow,
) -> Result<AnnualRecord, QueryError> {
    let request = annual_request(point, year, window);
    debug!(
        "aggregating {} {} from {} to {} at {}",
        request.dataset, request.band, request.start, request.end, point
    );
    let value = service.aggregate(&request).await?;
    Ok(AnnualRecord::new(year, value.unwrap_or(0.0)))
}

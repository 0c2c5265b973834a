use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single geographic location in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InputError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(InputError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(InputError::Longitude(longitude));
        }
        Ok(Point {
            latitude,
            longitude,
        })
    }

    /// GeoJSON coordinate order: longitude first.
    pub fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::Point;
    use crate::error::InputError;

    #[test]
    fn test_valid_point() {
        let point = Point::new(-15.0, -47.0).unwrap();
        assert_eq!(point.coordinates(), [-47.0, -15.0]);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(Point::new(91.0, 0.0), Err(InputError::Latitude(91.0)));
        assert_eq!(Point::new(0.0, -180.5), Err(InputError::Longitude(-180.5)));
        assert!(Point::new(f64::NAN, 0.0).is_err());
    }
}

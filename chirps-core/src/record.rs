use crate::error::InputError;
use serde::{Deserialize, Serialize};

/// Accumulated precipitation at one point for one year's season window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualRecord {
    pub year: i32,
    /// Millimetres; 0.0 when the service had no value for the window
    pub accumulated: f64,
}

impl AnnualRecord {
    pub fn new(year: i32, accumulated: f64) -> Self {
        AnnualRecord { year, accumulated }
    }

    pub fn is_positive(&self) -> bool {
        self.accumulated > 0.0
    }
}

/// Presentation thresholds for the chart, in millimetres.
///
/// `strike` is the lower bound and `exit` the upper one; they never change the
/// computed data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub strike: f64,
    pub exit: f64,
}

impl Thresholds {
    pub fn new(strike: f64, exit: f64) -> Result<Self, InputError> {
        if !strike.is_finite() {
            return Err(InputError::Threshold {
                name: "strike",
                value: strike,
            });
        }
        if !exit.is_finite() {
            return Err(InputError::Threshold {
                name: "exit",
                value: exit,
            });
        }
        if strike > exit {
            log::warn!("strike {strike} is above exit {exit}; bands will be inverted");
        }
        Ok(Thresholds { strike, exit })
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            strike: 230.0,
            exit: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_positive() {
        assert!(AnnualRecord::new(2020, 0.5).is_positive());
        assert!(!AnnualRecord::new(2020, 0.0).is_positive());
        assert!(!AnnualRecord::new(2020, -1.0).is_positive());
    }

    #[test]
    fn test_thresholds_must_be_finite() {
        assert!(Thresholds::new(230.0, 1000.0).is_ok());
        assert!(Thresholds::new(f64::INFINITY, 1000.0).is_err());
        assert!(Thresholds::new(230.0, f64::NAN).is_err());
        // inverted thresholds are allowed, only logged
        assert!(Thresholds::new(1000.0, 230.0).is_ok());
    }
}

//! Defines the `LatLon` coordinate type used throughout the crate.

use std::fmt;
use thiserror::Error;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are represented as `f64`.
///
/// # Examples
///
/// ```
/// use albatross::LatLon;
///
/// let golden = LatLon(39.913561, -105.222422);
/// assert_eq!(golden.0, 39.913561); // Latitude
/// assert_eq!(golden.1, -105.222422); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

#[derive(Debug, Error, PartialEq)]
pub enum LatLonError {
    #[error("lat_lon must have a length of 2")]
    Length,

    #[error("lat/lon points must be finite")]
    NotFinite,
}

impl LatLon {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }

    /// Checks that both members are finite numbers.
    pub fn validate(&self) -> Result<Self, LatLonError> {
        if self.0.is_finite() && self.1.is_finite() {
            Ok(*self)
        } else {
            Err(LatLonError::NotFinite)
        }
    }
}

impl TryFrom<&[f64]> for LatLon {
    type Error = LatLonError;

    fn try_from(value: &[f64]) -> Result<Self, Self::Error> {
        match value {
            [lat, lon] => LatLon(*lat, *lon).validate(),
            _ => Err(LatLonError::Length),
        }
    }
}

impl From<(f64, f64)> for LatLon {
    fn from((lat, lon): (f64, f64)) -> Self {
        LatLon(lat, lon)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lon_from_slice() {
        let point = LatLon::try_from(&[41.96364, -71.79364][..]).unwrap();
        assert_eq!(point, LatLon(41.96364, -71.79364));
    }

    #[test]
    fn test_lat_lon_invalid_length() {
        assert_eq!(LatLon::try_from(&[1.0][..]), Err(LatLonError::Length));
        assert_eq!(
            LatLon::try_from(&[1.0, 2.0, 3.0][..]),
            Err(LatLonError::Length)
        );
        assert_eq!(
            LatLonError::Length.to_string(),
            "lat_lon must have a length of 2"
        );
    }

    #[test]
    fn test_lat_lon_not_finite() {
        assert_eq!(
            LatLon::try_from(&[f64::NAN, 2.0][..]),
            Err(LatLonError::NotFinite)
        );
        assert_eq!(
            LatLon(1.0, f64::INFINITY).validate(),
            Err(LatLonError::NotFinite)
        );
    }
}

//! Wind turbine classification following IEC 61400-1, section 6.2.
//!
//! Turbines are classified in terms of both wind speed and turbulence. Wind speed
//! classes are I, II, III; turbulence classes are A+, A, B, C. Each class carries
//! reference values used by the analysis routines. Class S (custom) is not supported.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TurbineError {
    #[error("Wind speed classification \"{0}\" not found.")]
    UnknownWindSpeedClass(String),

    #[error("Turbulence classification \"{0}\" not found.")]
    UnknownTurbulenceClass(String),
}

/// IEC wind speed class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindSpeedClass {
    I,
    II,
    III,
}

/// IEC turbulence class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurbulenceClass {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
}

/// Reference wind speeds (m/s) for a wind speed class.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WindSpeedReference {
    v_ave: f64,
    v_ref: f64,
    v_ref_t: f64,
}

impl WindSpeedClass {
    pub fn label(&self) -> &'static str {
        match self {
            WindSpeedClass::I => "I",
            WindSpeedClass::II => "II",
            WindSpeedClass::III => "III",
        }
    }

    fn reference(&self) -> WindSpeedReference {
        match self {
            WindSpeedClass::I => WindSpeedReference {
                v_ave: 10.0,
                v_ref: 50.0,
                v_ref_t: 57.0,
            },
            WindSpeedClass::II => WindSpeedReference {
                v_ave: 8.5,
                v_ref: 42.5,
                v_ref_t: 57.0,
            },
            WindSpeedClass::III => WindSpeedReference {
                v_ave: 7.5,
                v_ref: 37.5,
                v_ref_t: 57.0,
            },
        }
    }
}

impl TurbulenceClass {
    pub fn label(&self) -> &'static str {
        match self {
            TurbulenceClass::APlus => "A+",
            TurbulenceClass::A => "A",
            TurbulenceClass::B => "B",
            TurbulenceClass::C => "C",
        }
    }

    /// Expected turbulence intensity at 15 m/s.
    fn i_ref(&self) -> f64 {
        match self {
            TurbulenceClass::APlus => 0.18,
            TurbulenceClass::A => 0.16,
            TurbulenceClass::B => 0.14,
            TurbulenceClass::C => 0.12,
        }
    }
}

impl FromStr for WindSpeedClass {
    type Err = TurbineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(WindSpeedClass::I),
            "II" => Ok(WindSpeedClass::II),
            "III" => Ok(WindSpeedClass::III),
            other => Err(TurbineError::UnknownWindSpeedClass(other.to_string())),
        }
    }
}

impl FromStr for TurbulenceClass {
    type Err = TurbineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A+" => Ok(TurbulenceClass::APlus),
            "A" => Ok(TurbulenceClass::A),
            "B" => Ok(TurbulenceClass::B),
            "C" => Ok(TurbulenceClass::C),
            other => Err(TurbineError::UnknownTurbulenceClass(other.to_string())),
        }
    }
}

impl fmt::Display for WindSpeedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for TurbulenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A wind turbine described by its IEC wind speed and turbulence classes.
///
/// The reference values are resolved once at construction and never change.
///
/// # Examples
///
/// ```
/// use albatross::WindTurbine;
///
/// let turbine = WindTurbine::new("I", "A+").unwrap();
/// assert_eq!(turbine.v_ave(), 10.0);
/// assert_eq!(turbine.i_ref(), 0.18);
///
/// assert!(WindTurbine::new("IV", "A").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindTurbine {
    wind_speed_class: WindSpeedClass,
    turbulence_class: TurbulenceClass,
    v_ave: f64,
    v_ref: f64,
    v_ref_t: f64,
    i_ref: f64,
}

impl WindTurbine {
    /// Creates a turbine from its class labels, e.g. `("II", "B")`.
    ///
    /// # Errors
    ///
    /// Returns [`TurbineError`] naming the first label that is not a known class.
    pub fn new(wind_speed_class: &str, turbulence_class: &str) -> Result<Self, TurbineError> {
        let wind_speed_class = wind_speed_class.parse::<WindSpeedClass>()?;
        let turbulence_class = turbulence_class.parse::<TurbulenceClass>()?;
        Ok(Self::from_classes(wind_speed_class, turbulence_class))
    }

    pub fn from_classes(wind_speed_class: WindSpeedClass, turbulence_class: TurbulenceClass) -> Self {
        let reference = wind_speed_class.reference();
        Self {
            wind_speed_class,
            turbulence_class,
            v_ave: reference.v_ave,
            v_ref: reference.v_ref,
            v_ref_t: reference.v_ref_t,
            i_ref: turbulence_class.i_ref(),
        }
    }

    pub fn wind_speed_class(&self) -> WindSpeedClass {
        self.wind_speed_class
    }

    pub fn turbulence_class(&self) -> TurbulenceClass {
        self.turbulence_class
    }

    /// Annual average wind speed at hub height (m/s).
    pub fn v_ave(&self) -> f64 {
        self.v_ave
    }

    /// Reference wind speed averaged over 10 minutes (m/s).
    pub fn v_ref(&self) -> f64 {
        self.v_ref
    }

    /// Reference wind speed for tropical cyclone regions (m/s).
    pub fn v_ref_t(&self) -> f64 {
        self.v_ref_t
    }

    pub fn i_ref(&self) -> f64 {
        self.i_ref
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_turbine_invalid_speed() {
        let err = WindTurbine::new("bad", "C").unwrap_err();
        assert_eq!(err.to_string(), "Wind speed classification \"bad\" not found.");
    }

    #[test]
    fn test_wind_turbine_invalid_turbulence() {
        let err = WindTurbine::new("I", "bad").unwrap_err();
        assert_eq!(err.to_string(), "Turbulence classification \"bad\" not found.");
    }

    #[test]
    fn test_wind_turbine() {
        let turbine = WindTurbine::new("I", "A+").unwrap();
        assert_eq!(turbine.v_ave(), 10.0);
        assert_eq!(turbine.v_ref(), 50.0);
        assert_eq!(turbine.v_ref_t(), 57.0);
        assert_eq!(turbine.i_ref(), 0.18);
        assert_eq!(turbine.wind_speed_class(), WindSpeedClass::I);
        assert_eq!(turbine.turbulence_class(), TurbulenceClass::APlus);
    }

    #[test]
    fn test_wind_turbine_all_classes() {
        let turbine = WindTurbine::new("III", "C").unwrap();
        assert_eq!(turbine.v_ave(), 7.5);
        assert_eq!(turbine.v_ref(), 37.5);
        assert_eq!(turbine.i_ref(), 0.12);

        let turbine = WindTurbine::from_classes(WindSpeedClass::II, TurbulenceClass::B);
        assert_eq!(turbine.v_ref(), 42.5);
        assert_eq!(turbine.i_ref(), 0.14);
        assert_eq!(turbine.turbulence_class().to_string(), "B");
    }
}

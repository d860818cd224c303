//! Builds the list of WTK dataset names to read for a point request.
//!
//! Height-indexed quantities are stored as `{name}_{height}m` datasets, e.g.
//! `windspeed_100m`. Auxiliary datasets have a fixed name.

use crate::requests::error::RequestError;
use std::fmt;
use std::str::FromStr;

/// A logical quantity that can be requested from the WIND Toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    WindSpeed,
    WindDirection,
    Pressure,
    Temperature,
    TimeIndex,
    Meta,
    Coordinates,
    InverseMoninObukhovLength,
    RelativeHumidity,
    PrecipitationRate,
}

const ALL_FIELDS: [Field; 10] = [
    Field::WindSpeed,
    Field::WindDirection,
    Field::Pressure,
    Field::Temperature,
    Field::TimeIndex,
    Field::Meta,
    Field::Coordinates,
    Field::InverseMoninObukhovLength,
    Field::RelativeHumidity,
    Field::PrecipitationRate,
];

/// Dataset naming for a [`Field`].
enum Dataset {
    /// `{prefix}_{height}m`, height in metres within `min..=max`.
    HeightIndexed {
        prefix: &'static str,
        min: i32,
        max: i32,
    },
    Fixed(&'static str),
}

impl Field {
    /// The logical name accepted by [`FromStr`], e.g. `"wind_speed"`.
    pub fn name(&self) -> &'static str {
        match self {
            Field::WindSpeed => "wind_speed",
            Field::WindDirection => "wind_direction",
            Field::Pressure => "pressure",
            Field::Temperature => "temperature",
            Field::TimeIndex => "time_index",
            Field::Meta => "meta",
            Field::Coordinates => "coordinates",
            Field::InverseMoninObukhovLength => "inverse_monin_obukhov_length",
            Field::RelativeHumidity => "relative_humidity",
            Field::PrecipitationRate => "precipitation_rate",
        }
    }

    fn dataset(&self) -> Dataset {
        match self {
            Field::WindSpeed => Dataset::HeightIndexed {
                prefix: "windspeed",
                min: 10,
                max: 200,
            },
            Field::WindDirection => Dataset::HeightIndexed {
                prefix: "winddirection",
                min: 10,
                max: 200,
            },
            Field::Pressure => Dataset::HeightIndexed {
                prefix: "pressure",
                min: 0,
                max: 200,
            },
            Field::Temperature => Dataset::HeightIndexed {
                prefix: "temperature",
                min: 2,
                max: 200,
            },
            Field::TimeIndex => Dataset::Fixed("time_index"),
            Field::Meta => Dataset::Fixed("meta"),
            Field::Coordinates => Dataset::Fixed("coordinates"),
            Field::InverseMoninObukhovLength => Dataset::Fixed("inversemoninobukhovlength_2m"),
            Field::RelativeHumidity => Dataset::Fixed("relativehumidity_2m"),
            Field::PrecipitationRate => Dataset::Fixed("precipitationrate_0m"),
        }
    }

    /// Inclusive height range in metres, `None` for fixed fields.
    pub fn height_range(&self) -> Option<(i32, i32)> {
        match self.dataset() {
            Dataset::HeightIndexed { min, max, .. } => Some((min, max)),
            Dataset::Fixed(_) => None,
        }
    }

    /// Resolves the dataset names for this field, validating every height first.
    fn column_names(&self, heights: &[i32]) -> Result<Vec<String>, RequestError> {
        match self.dataset() {
            Dataset::HeightIndexed { prefix, min, max } => {
                if heights.is_empty() {
                    return Err(RequestError::MissingHeight(self.name().to_string()));
                }
                if let Some(&height) = heights.iter().find(|h| !(min..=max).contains(*h)) {
                    return Err(RequestError::HeightOutOfRange {
                        field: self.name().to_string(),
                        height,
                        min,
                        max,
                    });
                }
                Ok(heights
                    .iter()
                    .map(|height| format!("{}_{}m", prefix, height))
                    .collect())
            }
            Dataset::Fixed(name) => {
                if !heights.is_empty() {
                    return Err(RequestError::UnexpectedHeight(self.name().to_string()));
                }
                Ok(vec![name.to_string()])
            }
        }
    }
}

impl FromStr for Field {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_FIELDS
            .iter()
            .find(|field| field.name() == s)
            .copied()
            .ok_or_else(|| RequestError::FieldNotFound(s.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Returns the logical names of every registrable field.
pub fn get_fields() -> Vec<&'static str> {
    ALL_FIELDS.iter().map(Field::name).collect()
}

/// An append-only, ordered list of WTK dataset names.
///
/// Registering the same field twice appends its datasets twice.
///
/// # Examples
///
/// ```
/// use albatross::{Field, RequestParams};
///
/// let mut params = RequestParams::new();
/// params
///     .register(Field::WindSpeed, &[10, 20, 30])?
///     .register(Field::RelativeHumidity, &[])?;
///
/// assert_eq!(
///     params.as_slice(),
///     ["windspeed_10m", "windspeed_20m", "windspeed_30m", "relativehumidity_2m"]
/// );
/// # Ok::<(), albatross::RequestError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    params: Vec<String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the dataset names for `field` at each of `heights`.
    ///
    /// Fixed fields must be registered with no heights. Nothing is appended
    /// unless every height is valid.
    ///
    /// # Errors
    ///
    /// * [`RequestError::MissingHeight`] for a height-indexed field without heights.
    /// * [`RequestError::HeightOutOfRange`] for a height outside the field's range.
    /// * [`RequestError::UnexpectedHeight`] for a fixed field given heights.
    pub fn register(&mut self, field: Field, heights: &[i32]) -> Result<&mut Self, RequestError> {
        let names = field.column_names(heights)?;
        self.params.extend(names);
        Ok(self)
    }

    /// Like [`RequestParams::register`], resolving `field` from its logical name.
    pub fn register_name(&mut self, field: &str, heights: &[i32]) -> Result<&mut Self, RequestError> {
        let field = field.parse::<Field>()?;
        self.register(field, heights)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.params
    }
}

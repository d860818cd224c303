//! Representative turbulence standard deviation (IEC 61400-1, normal turbulence model).
//!
//! `sigma_1 = i_ref * (0.75 * v_hub + b)` with `b = 5.6 m/s`.

use crate::analysis::columns::{require_time_index, resolve_speed_column, TIME_INDEX_COLUMN};
use crate::analysis::error::AnalysisError;
use crate::types::turbine::WindTurbine;
use log::debug;
use polars::prelude::*;

/// Default offset `b` of the normal turbulence model, in m/s.
pub const DEFAULT_B: f64 = 5.6;

/// Name of the output column of [`turbulence_std`] on a frame.
pub const TURBULENCE_STD_COLUMN: &str = "turbulence_std";

/// Averaging window of the turbulence model.
const WINDOW: &str = "10m";
const SPEED: &str = "speed";

/// A wind speed input for [`turbulence_std`]: a single hub height speed or a
/// time-indexed frame.
pub trait TurbulenceInput {
    type Output;

    fn turbulence_std(
        self,
        turbine: &WindTurbine,
        speed_column: Option<&str>,
        b: f64,
    ) -> Result<Self::Output, AnalysisError>;
}

impl TurbulenceInput for f64 {
    type Output = f64;

    fn turbulence_std(
        self,
        turbine: &WindTurbine,
        _speed_column: Option<&str>,
        b: f64,
    ) -> Result<f64, AnalysisError> {
        Ok(turbine.i_ref() * (0.75 * self + b))
    }
}

impl TurbulenceInput for &DataFrame {
    type Output = DataFrame;

    /// Averages the speed column over 10 minute windows of `time_index`,
    /// then applies the model to each window. The output covers every window
    /// from the first to the last sample; windows without data hold null.
    fn turbulence_std(
        self,
        turbine: &WindTurbine,
        speed_column: Option<&str>,
        b: f64,
    ) -> Result<DataFrame, AnalysisError> {
        let speed_column = resolve_speed_column(self, speed_column)?;
        require_time_index(self)?;
        debug!(
            "Computing turbulence std of '{}' for class {}{} turbine",
            speed_column,
            turbine.wind_speed_class(),
            turbine.turbulence_class()
        );

        let window_means = self
            .clone()
            .lazy()
            .filter(col(TIME_INDEX_COLUMN).is_not_null())
            .select([
                col(TIME_INDEX_COLUMN).dt().truncate(lit(WINDOW)),
                col(speed_column.as_str())
                    .cast(DataType::Float64)
                    .alias(SPEED),
            ])
            .group_by([col(TIME_INDEX_COLUMN)])
            .agg([col(SPEED).mean()])
            .collect()?;

        let frame = window_grid(&window_means)?
            .lazy()
            .left_join(
                window_means.lazy(),
                col(TIME_INDEX_COLUMN),
                col(TIME_INDEX_COLUMN),
            )
            .sort([TIME_INDEX_COLUMN], SortMultipleOptions::default())
            .select([
                col(TIME_INDEX_COLUMN),
                (lit(turbine.i_ref()) * (lit(0.75) * col(SPEED) + lit(b)))
                    .alias(TURBULENCE_STD_COLUMN),
            ])
            .collect()?;

        Ok(frame)
    }
}

/// Every 10 minute window start between the first and last window of `windows`.
fn window_grid(windows: &DataFrame) -> Result<DataFrame, AnalysisError> {
    let time_index = windows.column(TIME_INDEX_COLUMN)?;
    let dtype = time_index.dtype().clone();
    let step: i64 = match &dtype {
        DataType::Datetime(TimeUnit::Milliseconds, _) => 600_000,
        DataType::Datetime(TimeUnit::Microseconds, _) => 600_000_000,
        DataType::Datetime(TimeUnit::Nanoseconds, _) => 600_000_000_000,
        other => return Err(AnalysisError::InvalidTimeIndex(other.clone())),
    };

    let physical = time_index.as_materialized_series().to_physical_repr();
    let starts = physical.i64()?;
    let grid: Vec<i64> = match (starts.min(), starts.max()) {
        (Some(first), Some(last)) => (first..=last).step_by(step as usize).collect(),
        _ => Vec::new(),
    };

    let grid = Series::new(TIME_INDEX_COLUMN.into(), grid).cast(&dtype)?;
    Ok(DataFrame::new(vec![grid.into()])?)
}

/// Computes the representative turbulence standard deviation for `turbine`.
///
/// For an `f64` hub height wind speed this returns a single value. For a
/// `&DataFrame` it returns a frame with `time_index` and `turbulence_std`
/// columns, one row per 10 minute window.
///
/// # Arguments
///
/// * `input` - A wind speed in m/s or a frame with a `time_index` column.
/// * `turbine` - The turbine whose turbulence class sets `i_ref`.
/// * `speed_column` - Frame column to use. Defaults to the first column
///   containing `windspeed`. Ignored for scalar input.
/// * `b` - Model offset in m/s, [`DEFAULT_B`] when `None`.
///
/// # Examples
///
/// ```
/// use albatross::{turbulence_std, WindTurbine};
///
/// let turbine = WindTurbine::new("II", "B").unwrap();
/// let sigma = turbulence_std(3.9, &turbine, None, None).unwrap();
/// assert_eq!(sigma, turbine.i_ref() * (0.75 * 3.9 + 5.6));
/// ```
pub fn turbulence_std<T: TurbulenceInput>(
    input: T,
    turbine: &WindTurbine,
    speed_column: Option<&str>,
    b: Option<f64>,
) -> Result<T::Output, AnalysisError> {
    input.turbulence_std(turbine, speed_column, b.unwrap_or(DEFAULT_B))
}

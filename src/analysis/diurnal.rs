//! Hour-of-day statistics of a wind speed series.

use crate::analysis::columns::{require_time_index, resolve_speed_column, TIME_INDEX_COLUMN};
use crate::analysis::error::AnalysisError;
use log::debug;
use polars::prelude::*;

/// Name of the hour-of-day column of a diurnal statistics table.
pub const HOUR_COLUMN: &str = "hour";

/// Statistic columns of a diurnal statistics table, in output order.
pub const DIURNAL_STAT_COLUMNS: [&str; 6] = [
    "Mean",
    "Mean+Std",
    "Mean-Std",
    "10th Percentile",
    "Median",
    "90th Percentile",
];

const SPEED: &str = "speed";

/// Computes wind speed statistics for each hour of the day.
///
/// Observations are grouped by the hour of their `time_index`, regardless of
/// date. The returned frame has an `hour` column (0 to 23, always 24 rows)
/// followed by [`DIURNAL_STAT_COLUMNS`]. Standard deviation is the sample
/// standard deviation and percentiles interpolate linearly. Hours without
/// observations hold nulls.
///
/// # Arguments
///
/// * `df` - Wind data with a `time_index` datetime column.
/// * `speed_column` - Column to analyse. Defaults to the first column whose
///   name contains `windspeed`.
///
/// # Errors
///
/// Returns [`AnalysisError`] if the speed or time column cannot be found, if
/// `df` has no rows, or if Polars fails while aggregating.
pub fn get_diurnal_stats(
    df: &DataFrame,
    speed_column: Option<&str>,
) -> Result<DataFrame, AnalysisError> {
    let speed_column = resolve_speed_column(df, speed_column)?;
    require_time_index(df)?;
    if df.height() == 0 {
        return Err(AnalysisError::EmptyData);
    }
    debug!(
        "Computing diurnal statistics of '{}' over {} rows",
        speed_column,
        df.height()
    );

    let speed = || col(SPEED);
    let stats = df
        .clone()
        .lazy()
        .select([
            col(TIME_INDEX_COLUMN)
                .dt()
                .hour()
                .cast(DataType::Int32)
                .alias(HOUR_COLUMN),
            col(speed_column.as_str())
                .cast(DataType::Float64)
                .alias(SPEED),
        ])
        .group_by([col(HOUR_COLUMN)])
        .agg([
            speed().mean().alias(DIURNAL_STAT_COLUMNS[0]),
            (speed().mean() + speed().std(1)).alias(DIURNAL_STAT_COLUMNS[1]),
            (speed().mean() - speed().std(1)).alias(DIURNAL_STAT_COLUMNS[2]),
            speed()
                .quantile(lit(0.1), QuantileMethod::Linear)
                .alias(DIURNAL_STAT_COLUMNS[3]),
            speed().median().alias(DIURNAL_STAT_COLUMNS[4]),
            speed()
                .quantile(lit(0.9), QuantileMethod::Linear)
                .alias(DIURNAL_STAT_COLUMNS[5]),
        ]);

    // Left join onto all 24 hours so the table shape never depends on coverage
    let hours = df!(HOUR_COLUMN => (0..24).collect::<Vec<i32>>())?;
    let table = hours
        .lazy()
        .left_join(stats, col(HOUR_COLUMN), col(HOUR_COLUMN))
        .sort([HOUR_COLUMN], SortMultipleOptions::default())
        .collect()?;

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2012, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// Two days of hourly data; hour `h` of day `d` has speed `h + 10 * d`.
    fn two_day_frame() -> DataFrame {
        let times: Vec<NaiveDateTime> = (0..48).map(|i| start() + Duration::hours(i)).collect();
        let speeds: Vec<f64> = (0..48).map(|i| (i % 24 + 10 * (i / 24)) as f64).collect();
        df!(
            "time_index" => times,
            "windspeed_100m" => speeds
        )
        .unwrap()
    }

    fn value(df: &DataFrame, column: &str, row: usize) -> Option<f64> {
        df.column(column).unwrap().f64().unwrap().get(row)
    }

    #[test]
    fn test_diurnal_stats_shape() -> Result<(), Box<dyn std::error::Error>> {
        let stats = get_diurnal_stats(&two_day_frame(), None)?;

        assert_eq!(stats.height(), 24);
        let names: Vec<String> = stats
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();
        let mut expected = vec![HOUR_COLUMN.to_string()];
        expected.extend(DIURNAL_STAT_COLUMNS.iter().map(|c| c.to_string()));
        assert_eq!(names, expected);

        let hours: Vec<i32> = stats
            .column(HOUR_COLUMN)?
            .i32()?
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(hours, (0..24).collect::<Vec<i32>>());
        Ok(())
    }

    #[test]
    fn test_diurnal_stats_values() -> Result<(), Box<dyn std::error::Error>> {
        let stats = get_diurnal_stats(&two_day_frame(), Some("windspeed_100m"))?;
        let std = 50f64.sqrt();

        for hour in [0usize, 7, 23] {
            let h = hour as f64;
            let close = |column: &str, expected: f64| {
                let actual = value(&stats, column, hour).unwrap();
                assert!(
                    (actual - expected).abs() < 1e-9,
                    "{} at hour {}: {} != {}",
                    column,
                    hour,
                    actual,
                    expected
                );
            };
            close("Mean", h + 5.0);
            close("Mean+Std", h + 5.0 + std);
            close("Mean-Std", h + 5.0 - std);
            close("10th Percentile", h + 1.0);
            close("Median", h + 5.0);
            close("90th Percentile", h + 9.0);
        }
        Ok(())
    }

    #[test]
    fn test_diurnal_stats_partial_day() -> Result<(), Box<dyn std::error::Error>> {
        let times: Vec<NaiveDateTime> = (0..6).map(|i| start() + Duration::hours(i)).collect();
        let df = df!(
            "time_index" => times,
            "windspeed_10m" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        )?;

        let stats = get_diurnal_stats(&df, None)?;
        assert_eq!(stats.height(), 24);
        assert_eq!(value(&stats, "Mean", 2), Some(3.0));
        assert_eq!(value(&stats, "Mean", 12), None);
        Ok(())
    }

    #[test]
    fn test_diurnal_stats_errors() {
        let df = df!("windspeed_100m" => [1.0, 2.0]).unwrap();
        assert!(matches!(
            get_diurnal_stats(&df, None),
            Err(AnalysisError::ColumnNotFound(c)) if c == "time_index"
        ));

        let df = df!("time_index" => [start()], "pressure_0m" => [1.0]).unwrap();
        assert!(matches!(
            get_diurnal_stats(&df, None),
            Err(AnalysisError::NoMatchingColumn(_))
        ));

        let empty = two_day_frame().head(Some(0));
        assert!(matches!(
            get_diurnal_stats(&empty, None),
            Err(AnalysisError::EmptyData)
        ));
    }
}

//! Column lookup helpers shared by the analysis routines.

use crate::analysis::error::AnalysisError;
use polars::prelude::*;

/// Name of the timestamp column of WTK point data.
pub const TIME_INDEX_COLUMN: &str = "time_index";

/// Substring identifying wind speed columns, e.g. `windspeed_100m`.
pub const WIND_SPEED_TAG: &str = "windspeed";

/// Resolves the wind speed column of `df`.
///
/// An explicit `speed_column` must exist. Otherwise the first column whose
/// name contains `windspeed` is used; later matches are ignored.
pub fn resolve_speed_column(
    df: &DataFrame,
    speed_column: Option<&str>,
) -> Result<String, AnalysisError> {
    match speed_column {
        Some(name) => {
            if df.get_column_names().iter().any(|c| c.as_str() == name) {
                Ok(name.to_string())
            } else {
                Err(AnalysisError::ColumnNotFound(name.to_string()))
            }
        }
        None => df
            .get_column_names()
            .into_iter()
            .find(|c| c.as_str().contains(WIND_SPEED_TAG))
            .map(|c| c.to_string())
            .ok_or_else(|| AnalysisError::NoMatchingColumn(WIND_SPEED_TAG.to_string())),
    }
}

/// Checks that `df` carries a `time_index` column.
pub(crate) fn require_time_index(df: &DataFrame) -> Result<(), AnalysisError> {
    if df
        .get_column_names()
        .iter()
        .any(|c| c.as_str() == TIME_INDEX_COLUMN)
    {
        Ok(())
    } else {
        Err(AnalysisError::ColumnNotFound(TIME_INDEX_COLUMN.to_string()))
    }
}

/// Reads a numeric column as `f64` values, skipping nulls.
pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, AnalysisError> {
    let column = df
        .column(name)
        .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))?;
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().flatten().collect())
}

/// A labelled list of values ready to be drawn as one box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxplotSeries {
    pub label: String,
    pub values: Vec<f64>,
}

/// Collects the series of a wind speed boxplot.
///
/// With neither `fields` nor `labels`, every column containing `windspeed` is
/// used and labelled by the part after its first `_` (`windspeed_90m` → `90m`).
/// Explicit `fields` without `labels` are labelled by their own names.
pub fn boxplot_series(
    df: &DataFrame,
    fields: Option<&[&str]>,
    labels: Option<&[&str]>,
) -> Result<Vec<BoxplotSeries>, AnalysisError> {
    let inferred = fields.is_none();
    let fields: Vec<String> = match fields {
        Some(fields) => fields.iter().map(|f| f.to_string()).collect(),
        None => df
            .get_column_names()
            .into_iter()
            .filter(|c| c.as_str().contains(WIND_SPEED_TAG))
            .map(|c| c.to_string())
            .collect(),
    };

    let labels: Vec<String> = match (labels, inferred) {
        (Some(labels), _) => labels.iter().map(|l| l.to_string()).collect(),
        (None, true) => fields
            .iter()
            .map(|field| match field.split_once('_') {
                Some((_, suffix)) => suffix.to_string(),
                None => field.clone(),
            })
            .collect(),
        (None, false) => fields.clone(),
    };

    if labels.len() != fields.len() {
        return Err(AnalysisError::LabelMismatch {
            fields: fields.len(),
            labels: labels.len(),
        });
    }

    fields
        .iter()
        .zip(labels)
        .map(|(field, label)| {
            Ok(BoxplotSeries {
                label,
                values: column_values(df, field)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        df!(
            "winddirection_100m" => [180.0, 190.0, 200.0],
            "windspeed_100m" => [Some(5.0), None, Some(7.0)],
            "windspeed_10m" => [2.0, 3.0, 4.0]
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_speed_column_first_match() {
        let df = sample_frame();
        assert_eq!(resolve_speed_column(&df, None).unwrap(), "windspeed_100m");
        assert_eq!(
            resolve_speed_column(&df, Some("windspeed_10m")).unwrap(),
            "windspeed_10m"
        );
    }

    #[test]
    fn test_resolve_speed_column_missing() {
        let df = df!("temperature_2m" => [1.0, 2.0]).unwrap();
        assert!(matches!(
            resolve_speed_column(&df, None),
            Err(AnalysisError::NoMatchingColumn(_))
        ));
        let err = resolve_speed_column(&df, Some("windspeed_80m")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Required column 'windspeed_80m' not found in DataFrame"
        );
    }

    #[test]
    fn test_column_values_skips_nulls() {
        let df = sample_frame();
        assert_eq!(column_values(&df, "windspeed_100m").unwrap(), vec![5.0, 7.0]);
    }

    #[test]
    fn test_boxplot_series_inferred() {
        let df = sample_frame();
        let series = boxplot_series(&df, None, None).unwrap();
        let labels: Vec<&str> = series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["100m", "10m"]);
        assert_eq!(series[1].values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_boxplot_series_explicit() {
        let df = sample_frame();
        let series = boxplot_series(&df, Some(&["windspeed_10m"][..]), None).unwrap();
        assert_eq!(series[0].label, "windspeed_10m");

        let series = boxplot_series(&df, None, Some(&["a", "b"][..])).unwrap();
        assert_eq!(series[1].label, "b");

        let series =
            boxplot_series(&df, Some(&["windspeed_10m"][..]), Some(&["Ten metres"][..])).unwrap();
        assert_eq!(series[0].label, "Ten metres");

        assert!(matches!(
            boxplot_series(&df, Some(&["windspeed_10m"][..]), Some(&["a", "b"][..])),
            Err(AnalysisError::LabelMismatch { .. })
        ));
        assert!(matches!(
            boxplot_series(&df, Some(&["windspeed_40m"][..]), None),
            Err(AnalysisError::ColumnNotFound(_))
        ));
    }
}

//! Wind speed probability density: histogram plus a fitted Weibull curve.

use crate::analysis::columns::{column_values, resolve_speed_column};
use crate::analysis::error::AnalysisError;
use log::{debug, info};
use ordered_float::OrderedFloat;
use polars::prelude::*;

const MIN_SAMPLES: usize = 2;
const MAX_ITERATIONS: usize = 200;
const TOLERANCE: f64 = 1e-12;
/// Bins added on top of `round(max)`.
const EXTRA_BINS: usize = 5;

/// Parameters of an exponentiated Weibull distribution.
///
/// The density is `a c / scale · (1 - e^(-z^c))^(a-1) · e^(-z^c) · z^(c-1)`
/// with `z = (x - loc) / scale`. With `a = 1` and `loc = 0` this is the
/// two-parameter Weibull distribution with shape `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponWeibParams {
    pub a: f64,
    pub c: f64,
    pub loc: f64,
    pub scale: f64,
}

impl ExponWeibParams {
    /// `[a, c, loc, scale]`
    pub fn as_array(&self) -> [f64; 4] {
        [self.a, self.c, self.loc, self.scale]
    }

    pub fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.loc) / self.scale;
        if z <= 0.0 {
            return 0.0;
        }
        let zc = z.powf(self.c);
        let tail = (-zc).exp();
        self.a * self.c / self.scale
            * (1.0 - tail).powf(self.a - 1.0)
            * tail
            * z.powf(self.c - 1.0)
    }
}

/// Maximum-likelihood fit of a Weibull distribution with `a = 1` and `loc = 0` fixed.
///
/// Only finite, strictly positive values take part in the likelihood.
///
/// # Errors
///
/// * [`AnalysisError::InsufficientSamples`] with fewer than two positive values.
/// * [`AnalysisError::DegenerateSample`] when all positive values are equal.
/// * [`AnalysisError::FitDidNotConverge`] if the shape iteration fails to settle.
pub fn fit_weibull(sample: &[f64]) -> Result<ExponWeibParams, AnalysisError> {
    let positive: Vec<f64> = sample
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    if positive.len() < MIN_SAMPLES {
        return Err(AnalysisError::InsufficientSamples {
            required: MIN_SAMPLES,
            found: positive.len(),
        });
    }

    // Work with logs relative to the maximum so x^k never overflows
    let x_max = positive
        .iter()
        .copied()
        .map(OrderedFloat)
        .max()
        .map(|v| v.0)
        .unwrap_or(1.0);
    let logs: Vec<f64> = positive.iter().map(|v| (v / x_max).ln()).collect();
    let n = logs.len() as f64;
    let mean_log = logs.iter().sum::<f64>() / n;
    if mean_log.abs() < TOLERANCE {
        return Err(AnalysisError::DegenerateSample);
    }

    let shape = solve_shape(&logs, mean_log)?;
    let mean_weight = logs.iter().map(|l| (shape * l).exp()).sum::<f64>() / n;
    let scale = x_max * mean_weight.powf(1.0 / shape);

    debug!(
        "Weibull fit over {} samples: shape {:.4}, scale {:.4}",
        positive.len(),
        shape,
        scale
    );
    Ok(ExponWeibParams {
        a: 1.0,
        c: shape,
        loc: 0.0,
        scale,
    })
}

/// Profile likelihood equation for the shape `k` and its derivative:
/// `g(k) = Σ w·l / Σ w - 1/k - mean(l)` with `w = e^(k·l)`.
fn shape_equation(k: f64, logs: &[f64], mean_log: f64) -> (f64, f64) {
    let (mut sw, mut swl, mut swll) = (0.0, 0.0, 0.0);
    for &l in logs {
        let w = (k * l).exp();
        sw += w;
        swl += w * l;
        swll += w * l * l;
    }
    let weighted_mean = swl / sw;
    let g = weighted_mean - 1.0 / k - mean_log;
    let dg = swll / sw - weighted_mean * weighted_mean + 1.0 / (k * k);
    (g, dg)
}

/// Newton iteration safeguarded by bisection. `g` is increasing in `k`, negative
/// near zero and positive for large `k` whenever the sample has any spread.
fn solve_shape(logs: &[f64], mean_log: f64) -> Result<f64, AnalysisError> {
    let mut lo = 1e-6;
    let mut hi = 1.0;
    while shape_equation(hi, logs, mean_log).0 < 0.0 {
        lo = hi;
        hi *= 2.0;
        if hi > 1e6 {
            return Err(AnalysisError::FitDidNotConverge(MAX_ITERATIONS));
        }
    }

    let mut k = 0.5 * (lo + hi);
    for _ in 0..MAX_ITERATIONS {
        let (g, dg) = shape_equation(k, logs, mean_log);
        if g < 0.0 {
            lo = k;
        } else {
            hi = k;
        }

        let newton = k - g / dg;
        let next = if newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        if (next - k).abs() <= TOLERANCE * k.max(1.0) {
            return Ok(next);
        }
        k = next;
    }
    Err(AnalysisError::FitDidNotConverge(MAX_ITERATIONS))
}

/// A density-normalised wind speed histogram with a fitted Weibull curve.
#[derive(Debug, Clone, PartialEq)]
pub struct WindSpeedPdf {
    pub params: ExponWeibParams,
    /// `bins + 1` bin edges.
    pub edges: Vec<f64>,
    /// Histogram density per bin; integrates to one over the edges.
    pub density: Vec<f64>,
    pub centers: Vec<f64>,
    /// Fitted density evaluated at `centers`.
    pub fitted: Vec<f64>,
}

impl WindSpeedPdf {
    /// Columns `bin_center`, `density` and `fitted_pdf`, one row per bin.
    pub fn to_frame(&self) -> Result<DataFrame, AnalysisError> {
        Ok(df!(
            "bin_center" => self.centers.clone(),
            "density" => self.density.clone(),
            "fitted_pdf" => self.fitted.clone()
        )?)
    }
}

/// Builds a density histogram of the wind speed column and fits a Weibull
/// distribution to it.
///
/// The histogram spans `[min, max]` of the sample with `round(max) + 5`
/// equal-width bins, rounding half-way maxima to the even integer.
///
/// # Errors
///
/// Returns [`AnalysisError`] if the speed column cannot be resolved or the
/// sample cannot be fitted (see [`fit_weibull`]).
pub fn pdf(df: &DataFrame, speed_column: Option<&str>) -> Result<WindSpeedPdf, AnalysisError> {
    let speed_column = resolve_speed_column(df, speed_column)?;
    let sample: Vec<f64> = column_values(df, &speed_column)?
        .into_iter()
        .filter(|v| v.is_finite())
        .collect();

    let params = fit_weibull(&sample)?;
    let (edges, density) = histogram(&sample);
    let centers: Vec<f64> = edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
    let fitted = centers.iter().map(|x| params.pdf(*x)).collect();

    info!(
        "Fitted '{}' ({} samples): {:?}",
        speed_column,
        sample.len(),
        params.as_array()
    );
    Ok(WindSpeedPdf {
        params,
        edges,
        density,
        centers,
        fitted,
    })
}

/// Equal-width histogram over `[min, max]`, last bin closed on the right.
fn histogram(sample: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let min = sample
        .iter()
        .copied()
        .map(OrderedFloat)
        .min()
        .map_or(0.0, |v| v.0);
    let max = sample
        .iter()
        .copied()
        .map(OrderedFloat)
        .max()
        .map_or(0.0, |v| v.0);
    // Half-way maxima round to even
    let bins = max.round_ties_even().max(0.0) as usize + EXTRA_BINS;

    let (lo, hi) = if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    };
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for &v in sample {
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    let norm = sample.len() as f64 * width;
    let density = counts.into_iter().map(|c| c as f64 / norm).collect();
    (edges, density)
}

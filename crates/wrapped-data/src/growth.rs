//! Membership growth series and trend forecasting.
//!
//! Join events become a cumulative count per distinct date. The most recent
//! part of that series is fitted with `y = a·e^(b·x) + c` by Levenberg–Marquardt
//! least squares; when that fit does not converge the fitter falls back to an
//! ordinary least-squares line. The fitted model is then extrapolated in
//! 30-day steps.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use wrapped_core::error::{Result, WrappedError};
use wrapped_core::models::{GrowthReport, GrowthSeries, JoinEvent, TrendModel};
use wrapped_core::settings::Settings;

/// Number of most recent points the model is fitted on.
pub const DEFAULT_WINDOW: usize = 90;
/// Forecast horizon in 30-day steps.
pub const DEFAULT_MONTHS_AHEAD: u32 = 6;
/// Residual evaluations allowed for the exponential fit.
pub const DEFAULT_MAX_EVALUATIONS: usize = 2000;
/// Spacing between forecast points.
pub const FORECAST_STEP_DAYS: i64 = 30;

const MIN_LAMBDA: f64 = 1e-12;
const MAX_LAMBDA: f64 = 1e16;
/// Largest exponent before `e^(b·x)` is treated as a blow-up.
const MAX_EXPONENT: f64 = 700.0;

// ── Series ────────────────────────────────────────────────────────────────────

/// Cumulative member count at every distinct join date.
///
/// Single pass over the sorted dates; the count at a date includes every
/// event on that date.
pub fn cumulative_series(events: &[JoinEvent]) -> GrowthSeries {
    let mut dates: Vec<NaiveDate> = events.iter().map(|e| e.date).collect();
    dates.sort_unstable();

    let mut series = GrowthSeries::default();
    for (i, date) in dates.iter().enumerate() {
        if dates.get(i + 1) != Some(date) {
            series.dates.push(*date);
            series.cumulative_counts.push(i as u64 + 1);
        }
    }
    series
}

// ── FitConfig ─────────────────────────────────────────────────────────────────

/// Tuning knobs for [`TrendFitter`].
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub window: usize,
    pub months_ahead: u32,
    pub max_evaluations: usize,
    /// Relative cost reduction below which the fit counts as converged.
    pub ftol: f64,
    /// Relative step size below which the fit counts as converged.
    pub xtol: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            months_ahead: DEFAULT_MONTHS_AHEAD,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
        }
    }
}

impl FitConfig {
    /// Window, horizon and budget from the command line; tolerances default.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            window: settings.window as usize,
            months_ahead: settings.months_ahead,
            max_evaluations: settings.max_evaluations as usize,
            ..Default::default()
        }
    }
}

// ── TrendFitter ───────────────────────────────────────────────────────────────

/// Result of fitting a growth window.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendFit {
    pub model: TrendModel,
    /// Date that corresponds to `x = 0`.
    pub window_start: NaiveDate,
    /// Number of points the model was fitted on.
    pub window_len: usize,
}

impl TrendFit {
    /// Model prediction for a calendar date.
    pub fn predict(&self, date: NaiveDate) -> f64 {
        self.model
            .evaluate((date - self.window_start).num_days() as f64)
    }
}

/// Fits and extrapolates membership growth.
pub struct TrendFitter {
    config: FitConfig,
}

impl TrendFitter {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FitConfig::default())
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Fit the most recent window of `series`.
    ///
    /// Errors only on an empty series; a failed exponential fit yields
    /// [`TrendModel::Linear`].
    pub fn fit(&self, series: &GrowthSeries) -> Result<TrendFit> {
        let window = series.tail(self.config.window);
        let Some(&window_start) = window.dates.first() else {
            return Err(WrappedError::EmptySeries);
        };

        let xs: Vec<f64> = window
            .dates
            .iter()
            .map(|d| (*d - window_start).num_days() as f64)
            .collect();
        let ys: Vec<f64> = window.cumulative_counts.iter().map(|&c| c as f64).collect();

        let model = match fit_exponential(&xs, &ys, &self.config) {
            Some(model) => model,
            None => {
                debug!(
                    "Exponential fit did not converge on {} points, using linear fit",
                    xs.len()
                );
                fit_linear(&xs, &ys)
            }
        };

        Ok(TrendFit {
            model,
            window_start,
            window_len: window.len(),
        })
    }

    /// Predicted cumulative counts every 30 days after the last observed date.
    pub fn forecast(&self, series: &GrowthSeries, fit: &TrendFit) -> Vec<(NaiveDate, f64)> {
        let Some(&last) = series.dates.last() else {
            return Vec::new();
        };
        (1..=i64::from(self.config.months_ahead))
            .map(|step| {
                let date = last + Duration::days(FORECAST_STEP_DAYS * step);
                (date, fit.predict(date))
            })
            .collect()
    }

    /// Fit and forecast in one go.
    pub fn report(&self, series: &GrowthSeries) -> Result<GrowthReport> {
        let fit = self.fit(series)?;
        let forecast = self.forecast(series, &fit);
        Ok(GrowthReport {
            observed: series.points(),
            forecast,
            model: fit.model,
            window_start: fit.window_start,
        })
    }
}

// ── Linear fit ────────────────────────────────────────────────────────────────

/// Ordinary least-squares line through `(xs, ys)`.
///
/// With no spread in `x` the slope is zero and the intercept is the mean.
pub fn fit_linear(xs: &[f64], ys: &[f64]) -> TrendModel {
    let n = xs.len() as f64;
    if xs.is_empty() {
        return TrendModel::Linear { m: 0.0, k: 0.0 };
    }
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let (sxy, sxx) = xs
        .iter()
        .zip(ys)
        .fold((0.0, 0.0), |(sxy, sxx), (&x, &y)| {
            let dx = x - x_mean;
            (sxy + dx * (y - y_mean), sxx + dx * dx)
        });

    let m = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    TrendModel::Linear {
        m,
        k: y_mean - m * x_mean,
    }
}

// ── Exponential fit ───────────────────────────────────────────────────────────

/// Fewer than three points, or no spread in either coordinate, leaves the
/// three exponential parameters undetermined.
fn is_degenerate(xs: &[f64], ys: &[f64]) -> bool {
    let spread = |v: &[f64]| {
        let (lo, hi) = v
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        hi - lo
    };
    xs.len() < 3 || spread(xs) <= 0.0 || spread(ys) <= 0.0
}

fn residual_cost(xs: &[f64], ys: &[f64], p: &[f64; 3]) -> f64 {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let r = p[0] * (p[1] * x).exp() + p[2] - y;
            r * r
        })
        .sum()
}

/// `JᵀJ` and `Jᵀr` for the residuals `a·e^(b·x) + c - y`.
fn normal_equations(xs: &[f64], ys: &[f64], p: &[f64; 3]) -> ([[f64; 3]; 3], [f64; 3]) {
    let mut jtj = [[0.0; 3]; 3];
    let mut jtr = [0.0; 3];
    for (&x, &y) in xs.iter().zip(ys) {
        let e = (p[1] * x).exp();
        let r = p[0] * e + p[2] - y;
        let j = [e, p[0] * x * e, 1.0];
        for row in 0..3 {
            jtr[row] += j[row] * r;
            for col in 0..3 {
                jtj[row][col] += j[row] * j[col];
            }
        }
    }
    (jtj, jtr)
}

/// Gaussian elimination with partial pivoting; `None` if singular.
fn solve3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-300 || !a[pivot][col].is_finite() {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = [0.0; 3];
    for row in (0..3).rev() {
        let tail: f64 = (row + 1..3).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}

fn norm(v: &[f64; 3]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Levenberg–Marquardt fit of `y = a·e^(b·x) + c` from `a = 1, b = 0.01,
/// c = min(y)`.
///
/// Returns `None` on degenerate input, when the evaluation budget runs out,
/// when damping grows without bound, or when the parameters stop being finite.
pub fn fit_exponential(xs: &[f64], ys: &[f64], config: &FitConfig) -> Option<TrendModel> {
    if is_degenerate(xs, ys) {
        return None;
    }
    let y_min = ys.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let cost_floor = f64::EPSILON * ys.iter().map(|y| y * y).sum::<f64>();

    let mut p = [1.0, 0.01, y_min];
    let mut cost = residual_cost(xs, ys, &p);
    let mut evaluations = 1usize;
    let mut lambda = 1e-3;

    let converged = 'outer: loop {
        let (jtj, jtr) = normal_equations(xs, ys, &p);

        loop {
            if evaluations >= config.max_evaluations {
                break 'outer false;
            }

            let mut damped = jtj;
            for (i, row) in damped.iter_mut().enumerate() {
                row[i] += lambda * jtj[i][i].max(1e-12);
            }
            let Some(delta) = solve3(damped, [-jtr[0], -jtr[1], -jtr[2]]) else {
                lambda *= 10.0;
                if lambda > MAX_LAMBDA {
                    break 'outer false;
                }
                continue;
            };

            let candidate = [p[0] + delta[0], p[1] + delta[1], p[2] + delta[2]];
            let step_small = norm(&delta) <= config.xtol * (norm(&p) + config.xtol);
            let new_cost = residual_cost(xs, ys, &candidate);
            evaluations += 1;

            if new_cost.is_finite() && new_cost < cost {
                let reduction = (cost - new_cost) / cost;
                p = candidate;
                cost = new_cost;
                lambda = (lambda / 10.0).max(MIN_LAMBDA);
                if reduction <= config.ftol || step_small || cost <= cost_floor {
                    break 'outer true;
                }
                break;
            }

            if step_small {
                break 'outer true;
            }
            lambda *= 10.0;
            if lambda > MAX_LAMBDA {
                break 'outer false;
            }
        }
    };

    let [a, b, c] = p;
    let finite = p.iter().all(|v| v.is_finite()) && (b * x_max).abs() < MAX_EXPONENT;
    debug!(
        "Exponential fit: converged={} evaluations={} a={} b={} c={}",
        converged, evaluations, a, b, c
    );
    (converged && finite).then_some(TrendModel::Exponential { a, b, c })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

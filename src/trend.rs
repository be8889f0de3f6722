//! Trend analyzer (SPEC_FULL.md §4.14).
//!
//! Samples commits at configured intervals, scores each via a caller-
//! supplied closure (decoupling this module from the pipeline driver so it
//! stays testable against a bare `git2::Repository`), then fits a
//! closed-form least-squares regression per component over the resulting
//! time series. No regression crate: this is an O(n) sum-of-products over
//! a commit-count-sized series, not a file-count-sized one.

use crate::cancel::CancellationToken;
use crate::config::{TrendConfig, TrendPeriod};
use crate::error::{HistoryError, OmenError};
use crate::model::score::ComponentScores;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    pub commit: String,
    pub score: i32,
    pub component_scores: ComponentScores,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub pearson_r: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentTrends {
    pub composite: Regression,
    pub complexity: Regression,
    pub duplication: Regression,
    pub satd: Regression,
    pub tdg: Regression,
    pub coupling: Regression,
    pub smells: Regression,
    pub cohesion: Regression,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub points: Vec<TrendPoint>,
    pub trends: ComponentTrends,
}

/// Closed-form least-squares regression of `ys` against index `0..n`.
fn linear_regression(ys: &[f64]) -> Regression {
    let n = ys.len() as f64;
    if ys.len() < 2 {
        return Regression {
            slope: 0.0,
            intercept: ys.first().copied().unwrap_or(0.0),
            r_squared: 0.0,
            pearson_r: 0.0,
        };
    }

    let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let slope = if var_x == 0.0 { 0.0 } else { cov / var_x };
    let intercept = y_mean - slope * x_mean;

    let pearson_r = if var_x == 0.0 || var_y == 0.0 { 0.0 } else { cov / (var_x.sqrt() * var_y.sqrt()) };
    let r_squared = pearson_r * pearson_r;

    Regression {
        slope,
        intercept,
        r_squared,
        pearson_r,
    }
}

fn regress_component(points: &[TrendPoint], pick: impl Fn(&TrendPoint) -> f64) -> Regression {
    let ys: Vec<f64> = points.iter().map(pick).collect();
    linear_regression(&ys)
}

fn compute_trends(points: &[TrendPoint]) -> ComponentTrends {
    ComponentTrends {
        composite: regress_component(points, |p| p.score as f64),
        complexity: regress_component(points, |p| p.component_scores.complexity as f64),
        duplication: regress_component(points, |p| p.component_scores.duplication as f64),
        satd: regress_component(points, |p| p.component_scores.satd as f64),
        tdg: regress_component(points, |p| p.component_scores.tdg as f64),
        coupling: regress_component(points, |p| p.component_scores.coupling as f64),
        smells: regress_component(points, |p| p.component_scores.smells as f64),
        cohesion: regress_component(points, |p| p.component_scores.cohesion as f64),
    }
}

/// SPEC_FULL.md §4.14 step 4: fatal, early pre-flight checks. Both
/// checkout-mode and tree-mode runs share this one gate, so dirtiness and
/// detachment are never re-litigated per sampled commit.
pub fn preflight_checks(repo: &git2::Repository) -> Result<(), HistoryError> {
    if repo.head_detached().unwrap_or(true) {
        return Err(HistoryError::DetachedHead);
    }
    let mut status_opts = git2::StatusOptions::new();
    status_opts.include_untracked(false).include_ignored(false);
    let statuses = repo.statuses(Some(&mut status_opts))?;
    if !statuses.is_empty() {
        return Err(HistoryError::DirtyWorkingTree);
    }
    Ok(())
}

fn period_seconds(period: TrendPeriod) -> i64 {
    match period {
        TrendPeriod::Daily => 86_400,
        TrendPeriod::Weekly => 7 * 86_400,
        TrendPeriod::Monthly => 30 * 86_400,
    }
}

fn snap_to_boundary(period: TrendPeriod, date: DateTime<Utc>) -> DateTime<Utc> {
    match period {
        TrendPeriod::Daily => Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), 0, 0, 0).single().unwrap_or(date),
        TrendPeriod::Weekly => {
            let days_since_monday = date.weekday().num_days_from_monday() as i64;
            let midnight = Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), 0, 0, 0).single().unwrap_or(date);
            midnight - chrono::Duration::days(days_since_monday)
        }
        TrendPeriod::Monthly => Utc.with_ymd_and_hms(date.year(), date.month(), 1, 0, 0, 0).single().unwrap_or(date),
    }
}

/// One sampled point: the commit closest to (at or before) each interval
/// boundary, oldest-first.
pub fn sample_commits(repo: &git2::Repository, config: &TrendConfig) -> Result<Vec<(DateTime<Utc>, git2::Oid)>, HistoryError> {
    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;
    revwalk.set_sorting(git2::Sort::TIME)?;

    let cutoff = Utc::now() - chrono::Duration::days(config.since_days as i64);
    let mut history: Vec<(DateTime<Utc>, git2::Oid)> = Vec::new();
    for oid in revwalk {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        let ts = Utc.timestamp_opt(commit.time().seconds(), 0).single().unwrap_or_else(Utc::now);
        if ts < cutoff {
            break;
        }
        history.push((ts, oid));
    }
    history.reverse();

    if history.is_empty() {
        return Ok(Vec::new());
    }

    let step = period_seconds(config.period);
    let mut samples = Vec::new();
    let mut next_boundary = if config.snap {
        snap_to_boundary(config.period, history[0].0)
    } else {
        history[0].0
    };

    let mut idx = 0;
    while idx < history.len() {
        while idx < history.len() && history[idx].0 < next_boundary {
            idx += 1;
        }
        if idx >= history.len() {
            break;
        }
        samples.push(history[idx]);
        next_boundary = next_boundary + chrono::Duration::seconds(step);
        idx += 1;
    }

    if samples.is_empty() {
        samples.push(*history.last().unwrap());
    }

    Ok(samples)
}

/// Run the trend analysis. `score_commit` scores one commit (via a tree-
/// backed content source built by the caller) into `(composite,
/// component_scores)`.
pub fn run<F>(repo: &git2::Repository, config: &TrendConfig, cancel: &CancellationToken, mut score_commit: F) -> Result<TrendReport, OmenError>
where
    F: FnMut(git2::Oid) -> Result<(i32, ComponentScores), OmenError>,
{
    preflight_checks(repo)?;

    let samples = sample_commits(repo, config)?;
    let mut points = Vec::with_capacity(samples.len());

    for (date, oid) in samples {
        cancel.check()?;
        let (score, component_scores) = score_commit(oid)?;
        points.push(TrendPoint {
            date,
            commit: oid.to_string(),
            score,
            component_scores,
        });
    }

    let trends = compute_trends(&points);
    Ok(TrendReport { points, trends })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_component_scores(v: i32) -> ComponentScores {
        ComponentScores {
            complexity: v,
            duplication: v,
            satd: v,
            tdg: v,
            coupling: v,
            smells: v,
            cohesion: v,
        }
    }

    #[test]
    fn perfectly_linear_series_has_r_squared_of_one() {
        let points: Vec<TrendPoint> = (0..5)
            .map(|i| TrendPoint {
                date: Utc::now(),
                commit: format!("c{i}"),
                score: 10 * i,
                component_scores: flat_component_scores(10 * i),
            })
            .collect();
        let trends = compute_trends(&points);
        assert!((trends.composite.r_squared - 1.0).abs() < 1e-9);
        assert!((trends.composite.slope - 10.0).abs() < 1e-9);
    }

    #[test]
    fn constant_series_has_zero_slope() {
        let points: Vec<TrendPoint> = (0..4)
            .map(|i| TrendPoint {
                date: Utc::now(),
                commit: format!("c{i}"),
                score: 50,
                component_scores: flat_component_scores(50),
            })
            .collect();
        let trends = compute_trends(&points);
        assert_eq!(trends.composite.slope, 0.0);
    }

    #[test]
    fn single_point_series_has_zero_slope_and_intercept_equal_to_value() {
        let points = vec![TrendPoint {
            date: Utc::now(),
            commit: "c0".to_string(),
            score: 42,
            component_scores: flat_component_scores(42),
        }];
        let trends = compute_trends(&points);
        assert_eq!(trends.composite.slope, 0.0);
        assert_eq!(trends.composite.intercept, 42.0);
    }
}

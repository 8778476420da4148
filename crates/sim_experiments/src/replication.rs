//! Replication study: independent seeded runs of one scenario and a
//! confidence interval for the mean paid-passenger fraction.

use serde::Serialize;
use sim_core::scenario::ScenarioParams;
use tracing::info;

use crate::error::ExperimentError;
use crate::metrics::SimulationResult;
use crate::parameters::{ParameterSet, ParameterSpace};
use crate::runner::run_parallel_experiments_with_progress;

/// Paid fraction a run has to reach to count as meeting the service goal.
pub const DEFAULT_TARGET_PAID_FRACTION: f64 = 0.90;

/// Two-sided confidence level of the interval around the mean.
pub const DEFAULT_CONFIDENCE: f64 = 0.90;

/// Summary over the paid fractions of a set of replications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationSummary {
    pub runs: usize,
    pub mean_paid_fraction: f64,
    /// Sample standard deviation (n − 1); zero for a single run.
    pub std_dev: f64,
    pub runs_reaching_target: usize,
    pub target_paid_fraction: f64,
    pub confidence: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

impl ReplicationSummary {
    /// Returns `None` for an empty sample or a confidence outside `(0, 1)`.
    pub fn from_paid_fractions(samples: &[f64], target: f64, confidence: f64) -> Option<Self> {
        if samples.is_empty() || !(confidence > 0.0 && confidence < 1.0) {
            return None;
        }
        let n = samples.len();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let ss: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };
        let half_width = if n > 1 {
            let p = 1.0 - (1.0 - confidence) / 2.0;
            student_t_quantile(p, (n - 1) as u32) * std_dev / (n as f64).sqrt()
        } else {
            0.0
        };

        Some(Self {
            runs: n,
            mean_paid_fraction: mean,
            std_dev,
            runs_reaching_target: samples.iter().filter(|x| **x >= target).count(),
            target_paid_fraction: target,
            confidence,
            ci_low: mean - half_width,
            ci_high: mean + half_width,
        })
    }

    pub fn from_results(results: &[SimulationResult], target: f64, confidence: f64) -> Option<Self> {
        let samples: Vec<f64> = results.iter().map(|r| r.paid_fraction).collect();
        Self::from_paid_fractions(&samples, target, confidence)
    }
}

/// Every run of a replication study, plus its summary.
#[derive(Debug, Clone)]
pub struct ReplicationReport {
    pub parameter_sets: Vec<ParameterSet>,
    pub results: Vec<SimulationResult>,
    pub summary: Option<ReplicationSummary>,
}

/// Run `runs` seeded replications of `base` in parallel and summarize them.
pub fn run_replications(
    base: &ScenarioParams,
    runs: usize,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<ReplicationReport, ExperimentError> {
    let parameter_sets = ParameterSpace::grid()
        .with_base(base.clone())
        .replications(runs)
        .generate();
    let results = run_parallel_experiments_with_progress(&parameter_sets, num_threads, show_progress)?;
    let summary = ReplicationSummary::from_results(
        &results,
        DEFAULT_TARGET_PAID_FRACTION,
        DEFAULT_CONFIDENCE,
    );
    if let Some(summary) = &summary {
        info!(
            runs = summary.runs,
            mean = summary.mean_paid_fraction,
            ci_low = summary.ci_low,
            ci_high = summary.ci_high,
            reaching_target = summary.runs_reaching_target,
            "replications summarized"
        );
    }
    Ok(ReplicationReport {
        parameter_sets,
        results,
        summary,
    })
}

/// `P(|T| <= t)` for Student's t with `df` degrees of freedom, `t >= 0`.
///
/// Closed-form finite series for integer `df` (Abramowitz & Stegun 26.7.3 and
/// 26.7.4), in powers of `cos θ` with `θ = atan(t / √df)`.
fn central_t_probability(t: f64, df: u32) -> f64 {
    let theta = (t / f64::from(df).sqrt()).atan();
    let (sin, cos) = theta.sin_cos();
    let cos2 = cos * cos;

    if df % 2 == 1 {
        let mut sum = 0.0;
        if df > 1 {
            let mut term = cos;
            sum = cos;
            let mut k = 3;
            while k + 2 <= df {
                term *= cos2 * f64::from(k - 1) / f64::from(k);
                sum += term;
                k += 2;
            }
        }
        2.0 / std::f64::consts::PI * (theta + sin * sum)
    } else {
        let mut term = 1.0;
        let mut sum = 1.0;
        let mut k = 2;
        while k + 2 <= df {
            term *= cos2 * f64::from(k - 1) / f64::from(k);
            sum += term;
            k += 2;
        }
        sin * sum
    }
}

/// Quantile of Student's t with `df >= 1` degrees of freedom.
///
/// Bisection on the exact CDF; converges to full `f64` precision.
pub fn student_t_quantile(p: f64, df: u32) -> f64 {
    if !(p > 0.0 && p < 1.0) || df == 0 {
        return f64::NAN;
    }
    if p == 0.5 {
        return 0.0;
    }
    if p < 0.5 {
        return -student_t_quantile(1.0 - p, df);
    }
    let target = 2.0 * p - 1.0;

    let mut lo = 0.0;
    let mut hi = 1.0;
    while central_t_probability(hi, df) < target {
        lo = hi;
        hi *= 2.0;
        if !hi.is_finite() {
            return f64::INFINITY;
        }
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if central_t_probability(mid, df) < target {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= f64::EPSILON * hi {
            break;
        }
    }
    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn t_quantile_matches_table() {
        assert!(close(student_t_quantile(0.95, 1), 6.313_752, 1e-5));
        assert!(close(student_t_quantile(0.95, 2), 2.919_986, 1e-5));
        assert!(close(student_t_quantile(0.95, 3), 2.353_363, 1e-5));
        assert!(close(student_t_quantile(0.95, 4), 2.131_847, 1e-5));
        assert!(close(student_t_quantile(0.95, 9), 1.833_113, 1e-5));
        assert!(close(student_t_quantile(0.975, 9), 2.262_157, 1e-5));
        assert!(close(student_t_quantile(0.95, 29), 1.699_127, 1e-5));
        assert!(close(student_t_quantile(0.95, 1000), 1.646_379, 1e-5));
    }

    #[test]
    fn t_quantile_is_symmetric() {
        assert_eq!(student_t_quantile(0.5, 7), 0.0);
        assert!(close(
            student_t_quantile(0.05, 5),
            -student_t_quantile(0.95, 5),
            1e-12
        ));
        assert!(student_t_quantile(1.0, 5).is_nan());
    }

    #[test]
    fn two_runs_use_the_one_degree_of_freedom_interval() {
        let summary =
            ReplicationSummary::from_paid_fractions(&[0.8, 1.0], 0.9, 0.9).expect("summary");
        let std_dev = 0.2f64 / 2f64.sqrt();
        let half = 6.313_752 * std_dev / 2f64.sqrt();
        assert!(close(summary.std_dev, std_dev, 1e-12));
        assert!(close(summary.ci_low, 0.9 - half, 1e-5));
        assert!(close(summary.ci_high, 0.9 + half, 1e-5));
    }

    #[test]
    fn summary_of_known_sample() {
        let samples = [0.8, 0.9, 1.0, 0.9, 0.95, 0.85, 0.9, 1.0, 0.75, 0.95];
        let summary =
            ReplicationSummary::from_paid_fractions(&samples, 0.9, 0.9).expect("summary");
        assert_eq!(summary.runs, 10);
        assert!(close(summary.mean_paid_fraction, 0.9, 1e-12));
        assert_eq!(summary.runs_reaching_target, 7);
        assert!(summary.ci_low < 0.9 && summary.ci_high > 0.9);
        assert!(close(
            summary.ci_high - summary.mean_paid_fraction,
            summary.mean_paid_fraction - summary.ci_low,
            1e-12
        ));
        let expected_half = 1.833_113 * summary.std_dev / 10f64.sqrt();
        assert!(close(summary.ci_high - 0.9, expected_half, 1e-3));
    }

    #[test]
    fn single_run_has_degenerate_interval() {
        let summary = ReplicationSummary::from_paid_fractions(&[0.7], 0.9, 0.9).expect("summary");
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!((summary.ci_low, summary.ci_high), (0.7, 0.7));
        assert_eq!(summary.runs_reaching_target, 0);
    }

    #[test]
    fn rejects_empty_sample_and_bad_confidence() {
        assert!(ReplicationSummary::from_paid_fractions(&[], 0.9, 0.9).is_none());
        assert!(ReplicationSummary::from_paid_fractions(&[0.5, 0.6], 0.9, 1.0).is_none());
    }

    #[test]
    fn replications_use_distinct_seeds() {
        let base = ScenarioParams::default().with_seed(5).with_reservations(20);
        let report = run_replications(&base, 4, Some(2), false).expect("report");
        assert_eq!(report.results.len(), 4);
        assert_eq!(report.summary.as_ref().map(|s| s.runs), Some(4));
        let seeds: std::collections::HashSet<_> =
            report.parameter_sets.iter().map(|set| set.seed).collect();
        assert_eq!(seeds.len(), 4);
        assert!(report
            .parameter_sets
            .iter()
            .all(|set| set.experiment_id == "exp_0"));
    }
}

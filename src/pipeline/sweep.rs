use anyhow::{anyhow, Result};
use nalgebra::DVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::metrics::{evaluate, EvaluationReport};
use crate::reconstruction::{MethodParameter, ReconstructionEngine, ReconstructionMethod};
use crate::spectral::SpectralDecomposition;

/// Regularization grids driven through the engine. Lambda values are swept in
/// ascending grid order, truncation ranks in the order given.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub lambda_grid: Vec<f64>,
    pub truncation_grid: Vec<usize>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            lambda_grid: log_space(1e-6, 1e-1, 30),
            truncation_grid: (10..120).step_by(10).collect(),
        }
    }
}

/// Logarithmically spaced grid from `lo` to `hi` inclusive. Endpoints must be
/// positive and ordered.
pub fn log_space(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![lo];
    }
    let ratio = hi / lo;
    (0..count)
        .map(|i| lo * ratio.powf(i as f64 / (count - 1) as f64))
        .collect()
}

/// One scored (method, parameter) reconstruction candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepCandidate {
    pub method: ReconstructionMethod,
    pub parameter: MethodParameter,
    pub grid_index: usize,
    pub report: EvaluationReport,
}

/// Outcome of a full sweep: the unregularized baseline, the arg-min-MSE
/// candidate per method, and every candidate in grid order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub baseline: SweepCandidate,
    pub best_tikhonov: Option<SweepCandidate>,
    pub best_tsvd: Option<SweepCandidate>,
    pub candidates: Vec<SweepCandidate>,
}

#[derive(Debug, Clone, Copy)]
enum CandidateJob {
    Lambda { grid_index: usize, lambda: f64 },
    Rank { grid_index: usize, k: usize },
}

/// Drives the regularization grids through the engine and metrics, tracking
/// the best candidate per method with a pure min-by-MSE fold. Candidates are
/// independent given the frozen decomposition, so they are scored in parallel;
/// ordering and tie-breaking stay deterministic.
#[derive(Debug, Default)]
pub struct SweepController;

impl SweepController {
    pub fn sweep(
        decomposition: &SpectralDecomposition,
        x_true: &DVector<f64>,
        y: &DVector<f64>,
        config: &SweepConfig,
    ) -> Result<SweepOutcome> {
        validate_grids(decomposition, config)?;

        let baseline_reconstruction = ReconstructionEngine::pseudoinverse(decomposition, y)?;
        let baseline = SweepCandidate {
            method: ReconstructionMethod::Pseudoinverse,
            parameter: MethodParameter::None,
            grid_index: 0,
            report: evaluate(x_true, &baseline_reconstruction.solution)?,
        };

        let jobs: Vec<CandidateJob> = config
            .lambda_grid
            .iter()
            .enumerate()
            .map(|(grid_index, &lambda)| CandidateJob::Lambda { grid_index, lambda })
            .chain(
                config
                    .truncation_grid
                    .iter()
                    .enumerate()
                    .map(|(grid_index, &k)| CandidateJob::Rank { grid_index, k }),
            )
            .collect();

        let candidates: Vec<SweepCandidate> = jobs
            .into_par_iter()
            .map(|job| score_candidate(decomposition, x_true, y, job))
            .collect::<Result<Vec<_>>>()?;

        let best_tikhonov = best_for_method(&candidates, ReconstructionMethod::Tikhonov);
        let best_tsvd = best_for_method(&candidates, ReconstructionMethod::Tsvd);

        Ok(SweepOutcome {
            baseline,
            best_tikhonov,
            best_tsvd,
            candidates,
        })
    }
}

fn score_candidate(
    decomposition: &SpectralDecomposition,
    x_true: &DVector<f64>,
    y: &DVector<f64>,
    job: CandidateJob,
) -> Result<SweepCandidate> {
    let (reconstruction, grid_index) = match job {
        CandidateJob::Lambda { grid_index, lambda } => (
            ReconstructionEngine::tikhonov(decomposition, y, lambda)?,
            grid_index,
        ),
        CandidateJob::Rank { grid_index, k } => {
            (ReconstructionEngine::tsvd(decomposition, y, k)?, grid_index)
        }
    };
    Ok(SweepCandidate {
        method: reconstruction.method,
        parameter: reconstruction.parameter,
        grid_index,
        report: evaluate(x_true, &reconstruction.solution)?,
    })
}

/// Min-by-MSE fold over one method's candidates. Ties on equal MSE resolve to
/// the lowest grid index; NaN always loses to a comparable value.
fn best_for_method(
    candidates: &[SweepCandidate],
    method: ReconstructionMethod,
) -> Option<SweepCandidate> {
    candidates
        .iter()
        .filter(|candidate| candidate.method == method)
        .fold(None, |best: Option<&SweepCandidate>, candidate| match best {
            None => Some(candidate),
            Some(current) => {
                if improves(candidate, current) {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        })
        .cloned()
}

fn improves(challenger: &SweepCandidate, incumbent: &SweepCandidate) -> bool {
    let a = challenger.report.mse;
    let b = incumbent.report.mse;
    if a.is_nan() {
        return false;
    }
    if b.is_nan() {
        return true;
    }
    a < b || (a == b && challenger.grid_index < incumbent.grid_index)
}

fn validate_grids(decomposition: &SpectralDecomposition, config: &SweepConfig) -> Result<()> {
    for (index, &lambda) in config.lambda_grid.iter().enumerate() {
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(anyhow!(
                "Lambda grid entry {} is invalid: {lambda}",
                index
            ));
        }
    }
    let rank_bound = decomposition.rank_bound();
    for (index, &k) in config.truncation_grid.iter().enumerate() {
        if k > rank_bound {
            return Err(anyhow!(
                "Truncation grid entry {} ({}) exceeds rank bound {}",
                index,
                k,
                rank_bound
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_matches_endpoints() {
        let grid = log_space(1e-6, 1e-1, 30);
        assert_eq!(grid.len(), 30);
        assert!((grid[0] - 1e-6).abs() < 1e-18);
        assert!((grid[29] - 1e-1).abs() < 1e-12);
        for window in grid.windows(2) {
            assert!(window[1] > window[0]);
        }
    }

    #[test]
    fn log_space_degenerate_counts() {
        assert!(log_space(1e-3, 1.0, 0).is_empty());
        assert_eq!(log_space(1e-3, 1.0, 1), vec![1e-3]);
    }
}

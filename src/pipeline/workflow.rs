use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use log::info;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::config::ExperimentConfig;
use crate::diagnostics::{l_curve, picard_analysis, LCurve, PicardAnalysis};
use crate::noise::{add_gaussian_noise, seeded_rng};
use crate::pipeline::prepare::PreparedOperator;
use crate::pipeline::sweep::{SweepCandidate, SweepConfig, SweepController};
use crate::spectral::condition_number;

/// Structured record of one noise trial, handed to external persistence,
/// plotting, or narrative layers. Those layers impose no obligations back on
/// the core; the summary is plain data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub noise_level: String,
    pub sigma: f64,
    pub condition_number: f64,
    pub singular_values: Vec<f64>,
    pub picard: PicardAnalysis,
    pub l_curve: LCurve,
    pub baseline: SweepCandidate,
    pub best_tikhonov: Option<SweepCandidate>,
    pub best_tsvd: Option<SweepCandidate>,
    pub candidates: Vec<SweepCandidate>,
    pub decompose_duration: Duration,
    pub sweep_duration: Duration,
}

/// Runs the full per-noise-level trial: inject noise, derive diagnostics from
/// the shared decomposition, sweep both regularization grids, and assemble the
/// summary. Ground truth feeds evaluation only, never reconstruction.
pub struct ExperimentWorkflow {
    config: ExperimentConfig,
    sweep: SweepConfig,
    operator: PreparedOperator,
    x_true: DVector<f64>,
}

impl ExperimentWorkflow {
    pub fn new(
        config: ExperimentConfig,
        sweep: SweepConfig,
        operator: PreparedOperator,
        x_true: DVector<f64>,
    ) -> Self {
        Self {
            config,
            sweep,
            operator,
            x_true,
        }
    }

    pub fn run_level(&self, level: &str) -> Result<ExperimentSummary> {
        let sigma = self
            .config
            .sigma_for(level)
            .ok_or_else(|| anyhow!("Unknown noise level '{level}'"))?;
        let seed = self
            .config
            .level_seed(level)
            .ok_or_else(|| anyhow!("Unknown noise level '{level}'"))?;

        let decompose_start = Instant::now();
        let decomposition = self
            .operator
            .decomposition()
            .with_context(|| "prepare spectral decomposition")?;
        let decompose_duration = decompose_start.elapsed();

        let y_clean = self.operator.operator().apply(&self.x_true)?;
        let mut rng = seeded_rng(seed);
        let y_noisy = add_gaussian_noise(&y_clean, sigma, &mut rng)?;

        let cond = condition_number(&decomposition);
        let picard = picard_analysis(&decomposition, &y_noisy)?;
        let curve = l_curve(&decomposition, &y_noisy, &self.sweep.lambda_grid)?;

        let sweep_start = Instant::now();
        let outcome = SweepController::sweep(&decomposition, &self.x_true, &y_noisy, &self.sweep)?;
        let sweep_duration = sweep_start.elapsed();

        info!(
            "Level {}: condition {:.3e}, baseline mse {:.3e}, candidates {}",
            level,
            cond,
            outcome.baseline.report.mse,
            outcome.candidates.len()
        );
        if let Some(best) = &outcome.best_tikhonov {
            info!(
                "Level {}: best tikhonov {:?} mse {:.3e}",
                level, best.parameter, best.report.mse
            );
        }
        if let Some(best) = &outcome.best_tsvd {
            info!(
                "Level {}: best tsvd {:?} mse {:.3e}",
                level, best.parameter, best.report.mse
            );
        }

        Ok(ExperimentSummary {
            noise_level: level.to_string(),
            sigma,
            condition_number: cond,
            singular_values: decomposition.singular_values.iter().copied().collect(),
            picard,
            l_curve: curve,
            baseline: outcome.baseline,
            best_tikhonov: outcome.best_tikhonov,
            best_tsvd: outcome.best_tsvd,
            candidates: outcome.candidates,
            decompose_duration,
            sweep_duration,
        })
    }

    pub fn run_all(&self) -> Result<Vec<ExperimentSummary>> {
        let mut summaries = Vec::with_capacity(self.config.noise_levels.len());
        for level in self.config.level_names() {
            summaries.push(self.run_level(&level)?);
        }
        Ok(summaries)
    }
}

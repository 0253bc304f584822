use anyhow::{anyhow, Result};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::spectral::{
    apply_filter, pseudoinverse_filter, tikhonov_filter, tsvd_filter, SpectralDecomposition,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionMethod {
    Pseudoinverse,
    Tikhonov,
    Tsvd,
}

impl std::fmt::Display for ReconstructionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconstructionMethod::Pseudoinverse => write!(f, "pseudoinverse"),
            ReconstructionMethod::Tikhonov => write!(f, "tikhonov"),
            ReconstructionMethod::Tsvd => write!(f, "tsvd"),
        }
    }
}

/// The regularization parameter that produced a reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodParameter {
    None,
    Lambda(f64),
    Rank(usize),
}

#[derive(Debug, Clone)]
pub struct ReconstructionResult {
    pub solution: DVector<f64>,
    pub method: ReconstructionMethod,
    pub parameter: MethodParameter,
}

/// Three interchangeable reconstruction strategies over a shared, frozen
/// decomposition. Each call is O(m * n); the decomposition cost is paid once
/// by the caller, not per reconstruction.
#[derive(Debug, Default)]
pub struct ReconstructionEngine;

impl ReconstructionEngine {
    /// Unregularized inversion, the intentionally unstable baseline that the
    /// filtered methods must beat.
    pub fn pseudoinverse(
        decomposition: &SpectralDecomposition,
        y: &DVector<f64>,
    ) -> Result<ReconstructionResult> {
        check_measurement(decomposition, y)?;
        let filter = pseudoinverse_filter(&decomposition.singular_values);
        Ok(ReconstructionResult {
            solution: apply_filter(decomposition, &filter, y),
            method: ReconstructionMethod::Pseudoinverse,
            parameter: MethodParameter::None,
        })
    }

    /// Tikhonov-filtered inversion. lambda = 0 coincides with the
    /// pseudoinverse; large lambda drives the solution toward zero.
    pub fn tikhonov(
        decomposition: &SpectralDecomposition,
        y: &DVector<f64>,
        lambda: f64,
    ) -> Result<ReconstructionResult> {
        check_measurement(decomposition, y)?;
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(anyhow!(
                "Tikhonov lambda must be finite and non-negative, got {lambda}"
            ));
        }
        let filter = tikhonov_filter(&decomposition.singular_values, lambda);
        Ok(ReconstructionResult {
            solution: apply_filter(decomposition, &filter, y),
            method: ReconstructionMethod::Tikhonov,
            parameter: MethodParameter::Lambda(lambda),
        })
    }

    /// Truncated-SVD inversion with hard rank cutoff k in [0, r]. k = 0 yields
    /// the exact zero vector; k = r matches the pseudoinverse.
    pub fn tsvd(
        decomposition: &SpectralDecomposition,
        y: &DVector<f64>,
        k: usize,
    ) -> Result<ReconstructionResult> {
        check_measurement(decomposition, y)?;
        let rank_bound = decomposition.rank_bound();
        if k > rank_bound {
            return Err(anyhow!(
                "Truncation rank {} exceeds decomposition rank bound {}",
                k,
                rank_bound
            ));
        }
        let filter = tsvd_filter(&decomposition.singular_values, k);
        Ok(ReconstructionResult {
            solution: apply_filter(decomposition, &filter, y),
            method: ReconstructionMethod::Tsvd,
            parameter: MethodParameter::Rank(k),
        })
    }
}

fn check_measurement(decomposition: &SpectralDecomposition, y: &DVector<f64>) -> Result<()> {
    if y.len() != decomposition.output_dim() {
        return Err(anyhow!(
            "Measurement length {} does not match operator output dimension {}",
            y.len(),
            decomposition.output_dim()
        ));
    }
    Ok(())
}

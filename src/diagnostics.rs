use anyhow::{anyhow, Result};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::reconstruction::ReconstructionEngine;
use crate::spectral::SpectralDecomposition;

/// Index-aligned pairs (s_i, |u_i^T y|) in descending-s order. The point at
/// which the data coefficients stop decaying as fast as the singular values
/// marks the onset of noise domination; the caller reads that off the trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PicardAnalysis {
    pub singular_values: Vec<f64>,
    pub coefficients: Vec<f64>,
}

pub fn picard_analysis(
    decomposition: &SpectralDecomposition,
    y: &DVector<f64>,
) -> Result<PicardAnalysis> {
    if y.len() != decomposition.output_dim() {
        return Err(anyhow!(
            "Measurement length {} does not match operator output dimension {}",
            y.len(),
            decomposition.output_dim()
        ));
    }
    let projected = decomposition.u.transpose() * y;
    Ok(PicardAnalysis {
        singular_values: decomposition.singular_values.iter().copied().collect(),
        coefficients: projected.iter().map(|value| value.abs()).collect(),
    })
}

/// Residual norm versus solution norm across an ascending lambda grid,
/// index-aligned with the grid. Locating the curve's knee is left to the
/// consumer; this only produces the trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LCurve {
    pub lambdas: Vec<f64>,
    pub residual_norms: Vec<f64>,
    pub solution_norms: Vec<f64>,
}

pub fn l_curve(
    decomposition: &SpectralDecomposition,
    y: &DVector<f64>,
    lambdas: &[f64],
) -> Result<LCurve> {
    let mut residual_norms = Vec::with_capacity(lambdas.len());
    let mut solution_norms = Vec::with_capacity(lambdas.len());
    for &lambda in lambdas {
        let reconstruction = ReconstructionEngine::tikhonov(decomposition, y, lambda)?;
        let predicted = decomposition.forward(&reconstruction.solution);
        residual_norms.push((predicted - y).norm());
        solution_norms.push(reconstruction.solution.norm());
    }
    Ok(LCurve {
        lambdas: lambdas.to_vec(),
        residual_norms,
        solution_norms,
    })
}

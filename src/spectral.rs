use anyhow::{anyhow, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::operator::ForwardOperator;

/// Relative threshold below which a singular value is treated as zero.
pub const RANK_TOLERANCE: f64 = 1e-10;

/// Economy-size singular value decomposition A = U diag(s) V^T, computed once
/// per operator and shared read-only by every reconstruction and diagnostic
/// call. Singular values are non-negative and sorted in descending order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralDecomposition {
    pub u: DMatrix<f64>,
    pub singular_values: DVector<f64>,
    pub v_t: DMatrix<f64>,
}

impl SpectralDecomposition {
    /// r = min(m, n), the length of the singular-value sequence.
    pub fn rank_bound(&self) -> usize {
        self.singular_values.len()
    }

    pub fn output_dim(&self) -> usize {
        self.u.nrows()
    }

    pub fn input_dim(&self) -> usize {
        self.v_t.ncols()
    }

    /// Number of singular values above `RANK_TOLERANCE` relative to the
    /// largest one.
    pub fn numerical_rank(&self) -> usize {
        let s = &self.singular_values;
        if s.is_empty() {
            return 0;
        }
        let cutoff = RANK_TOLERANCE * s[0];
        s.iter().filter(|value| **value > cutoff).count()
    }

    /// Apply the forward map through the decomposition: A x = U diag(s) V^T x.
    pub fn forward(&self, x: &DVector<f64>) -> DVector<f64> {
        let coefficients = &self.v_t * x;
        &self.u * coefficients.component_mul(&self.singular_values)
    }
}

/// Computes the shared decomposition consumed by every downstream component.
#[derive(Debug, Default)]
pub struct SpectralDecomposer;

impl SpectralDecomposer {
    /// Economy-size decomposition. Zero and near-zero singular values are
    /// valid, expected data; the only failure mode is the underlying routine
    /// not converging, which is surfaced to the caller unmodified.
    pub fn decompose(operator: &ForwardOperator) -> Result<SpectralDecomposition> {
        let svd = operator
            .matrix()
            .clone()
            .try_svd(true, true, f64::EPSILON, 0)
            .ok_or_else(|| anyhow!("Singular value decomposition did not converge"))?;
        let u = svd
            .u
            .ok_or_else(|| anyhow!("Decomposition did not produce the left basis"))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| anyhow!("Decomposition did not produce the right basis"))?;
        Ok(SpectralDecomposition {
            u,
            singular_values: svd.singular_values,
            v_t,
        })
    }
}

/// s[0] / s[last], with infinity (never an error) when the smallest singular
/// value is zero within `RANK_TOLERANCE` relative to the largest.
pub fn condition_number(decomposition: &SpectralDecomposition) -> f64 {
    let s = &decomposition.singular_values;
    if s.is_empty() {
        return f64::INFINITY;
    }
    let largest = s[0];
    let smallest = s[s.len() - 1];
    if largest <= 0.0 || smallest <= RANK_TOLERANCE * largest {
        return f64::INFINITY;
    }
    largest / smallest
}

/// Unfiltered inversion 1 / s_i for every nonzero s_i, including arbitrarily
/// small ones. Exact zeros invert to zero, matching the pseudoinverse
/// convention; everything else is kept and amplifies noise freely.
pub fn pseudoinverse_filter(s: &DVector<f64>) -> DVector<f64> {
    s.map(|value| if value > 0.0 { 1.0 / value } else { 0.0 })
}

/// Tikhonov spectral filter f_i = s_i / (s_i^2 + lambda^2). At lambda = 0 this
/// coincides with the unfiltered inversion.
pub fn tikhonov_filter(s: &DVector<f64>, lambda: f64) -> DVector<f64> {
    s.map(|value| {
        let denominator = value * value + lambda * lambda;
        if denominator > 0.0 {
            value / denominator
        } else {
            0.0
        }
    })
}

/// Hard rank cutoff f_i = 1 / s_i for i < k, zero beyond. k = 0 yields the
/// zero filter; k = r matches the unfiltered inversion.
pub fn tsvd_filter(s: &DVector<f64>, k: usize) -> DVector<f64> {
    DVector::from_fn(s.len(), |i, _| {
        if i < k && s[i] > 0.0 {
            1.0 / s[i]
        } else {
            0.0
        }
    })
}

/// Shared filtered-inversion step: x = V diag(f) U^T y.
pub fn apply_filter(
    decomposition: &SpectralDecomposition,
    filter: &DVector<f64>,
    y: &DVector<f64>,
) -> DVector<f64> {
    let coefficients = decomposition.u.transpose() * y;
    decomposition.v_t.transpose() * coefficients.component_mul(filter)
}

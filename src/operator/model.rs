use anyhow::{anyhow, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Parameters that fully determine a forward operator. Serves as the
/// content-addressable key for the decomposition cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperatorSpec {
    Blur { n: usize, sigma: f64, radius: usize },
    Downsample { n: usize, factor: usize },
    RankDeficient { n: usize, rank: usize, seed: u64 },
}

impl OperatorSpec {
    pub fn output_dim(&self) -> usize {
        match self {
            OperatorSpec::Blur { n, .. } => *n,
            OperatorSpec::Downsample { n, factor } => n / factor.max(&1),
            OperatorSpec::RankDeficient { n, .. } => *n,
        }
    }

    pub fn input_dim(&self) -> usize {
        match self {
            OperatorSpec::Blur { n, .. }
            | OperatorSpec::Downsample { n, .. }
            | OperatorSpec::RankDeficient { n, .. } => *n,
        }
    }
}

/// Immutable dense measurement map A (m by n). Created once per experiment
/// configuration and shared read-only by every downstream component.
#[derive(Debug, Clone)]
pub struct ForwardOperator {
    matrix: DMatrix<f64>,
    spec: OperatorSpec,
}

impl ForwardOperator {
    pub(crate) fn new(matrix: DMatrix<f64>, spec: OperatorSpec) -> Self {
        Self { matrix, spec }
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn spec(&self) -> &OperatorSpec {
        &self.spec
    }

    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Forward-map a signal: y = A x.
    pub fn apply(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        if x.len() != self.ncols() {
            return Err(anyhow!(
                "Signal length {} does not match operator input dimension {}",
                x.len(),
                self.ncols()
            ));
        }
        Ok(&self.matrix * x)
    }
}

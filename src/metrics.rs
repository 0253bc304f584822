use anyhow::{anyhow, Result};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Scores for one reconstruction against ground truth. Degenerate numeric
/// cases resolve to infinity sentinels rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub mse: f64,
    pub psnr: f64,
    pub relative_error: f64,
}

/// Mean squared error; finite for finite inputs.
pub fn mse(x_true: &DVector<f64>, x_est: &DVector<f64>) -> Result<f64> {
    check_lengths(x_true, x_est)?;
    Ok((x_true - x_est).norm_squared() / x_true.len() as f64)
}

/// 20 log10(max|x_true|) - 10 log10(mse), with infinity when mse is zero.
pub fn psnr(x_true: &DVector<f64>, x_est: &DVector<f64>) -> Result<f64> {
    let error = mse(x_true, x_est)?;
    Ok(psnr_from_mse(x_true, error))
}

/// ||x_true - x_est|| / ||x_true||. A zero-norm ground truth has no meaningful
/// scale, so the ratio degenerates to the infinity sentinel.
pub fn relative_error(x_true: &DVector<f64>, x_est: &DVector<f64>) -> Result<f64> {
    check_lengths(x_true, x_est)?;
    let denominator = x_true.norm();
    if denominator == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok((x_true - x_est).norm() / denominator)
}

pub fn evaluate(x_true: &DVector<f64>, x_est: &DVector<f64>) -> Result<EvaluationReport> {
    let error = mse(x_true, x_est)?;
    Ok(EvaluationReport {
        mse: error,
        psnr: psnr_from_mse(x_true, error),
        relative_error: relative_error(x_true, x_est)?,
    })
}

fn psnr_from_mse(x_true: &DVector<f64>, mse: f64) -> f64 {
    if mse == 0.0 {
        return f64::INFINITY;
    }
    let peak = x_true.iter().fold(0.0f64, |acc, value| acc.max(value.abs()));
    20.0 * peak.log10() - 10.0 * mse.log10()
}

fn check_lengths(x_true: &DVector<f64>, x_est: &DVector<f64>) -> Result<()> {
    if x_true.is_empty() {
        return Err(anyhow!("Metrics require non-empty signals"));
    }
    if x_true.len() != x_est.len() {
        return Err(anyhow!(
            "Signal lengths differ: ground truth {}, estimate {}",
            x_true.len(),
            x_est.len()
        ));
    }
    Ok(())
}

use anyhow::{anyhow, Result};
use nalgebra::{DMatrix, QR};
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

use crate::operator::model::{ForwardOperator, OperatorSpec};

/// Builds the dense test operators: circulant Gaussian blur, selection-based
/// downsampling, and exactly rank-deficient random compositions.
#[derive(Debug, Default)]
pub struct OperatorBuilder;

impl OperatorBuilder {
    /// Circulant blur operator from a normalized Gaussian kernel of size
    /// 2 * radius + 1. Kernel indices wrap modulo n; entries outside the
    /// kernel's circular support are zero, so every row sums to one.
    pub fn blur(n: usize, sigma: f64, radius: usize) -> Result<ForwardOperator> {
        if n == 0 {
            return Err(anyhow!("Blur operator size must be greater than zero"));
        }
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(anyhow!("Blur sigma must be finite and positive, got {sigma}"));
        }
        let ksize = 2 * radius + 1;
        if ksize > n {
            return Err(anyhow!(
                "Blur kernel size {} exceeds operator size {}",
                ksize,
                n
            ));
        }

        let kernel = gaussian_kernel(radius, sigma);
        let mut entries = vec![0.0f64; n * n];
        entries.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            for (offset_index, weight) in kernel.iter().enumerate() {
                let offset = offset_index as isize - radius as isize;
                let j = (i as isize + offset).rem_euclid(n as isize) as usize;
                row[j] = *weight;
            }
        });

        Ok(ForwardOperator::new(
            DMatrix::from_row_slice(n, n, &entries),
            OperatorSpec::Blur { n, sigma, radius },
        ))
    }

    /// Selection matrix keeping every `factor`-th sample: one unit entry per
    /// row at column i * factor. The factor must divide n cleanly.
    pub fn downsample(n: usize, factor: usize) -> Result<ForwardOperator> {
        if n == 0 {
            return Err(anyhow!("Downsample operator size must be greater than zero"));
        }
        if factor == 0 {
            return Err(anyhow!("Downsample factor must be greater than zero"));
        }
        if n % factor != 0 {
            return Err(anyhow!(
                "Downsample factor {} does not divide signal length {}",
                factor,
                n
            ));
        }

        let m = n / factor;
        let mut matrix = DMatrix::zeros(m, n);
        for i in 0..m {
            matrix[(i, i * factor)] = 1.0;
        }

        Ok(ForwardOperator::new(
            matrix,
            OperatorSpec::Downsample { n, factor },
        ))
    }

    /// Random n by n matrix with exact numerical rank `rank`: two seeded
    /// orthonormal bases composed with singular values linearly spaced from
    /// 1.0 down to 0.1 over the first `rank` entries and exactly zero beyond.
    pub fn rank_deficient(n: usize, rank: usize, seed: u64) -> Result<ForwardOperator> {
        if n == 0 {
            return Err(anyhow!("Rank-deficient operator size must be greater than zero"));
        }
        if rank > n {
            return Err(anyhow!("Requested rank {} exceeds operator size {}", rank, n));
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let left = random_orthonormal(n, &mut rng);
        let right = random_orthonormal(n, &mut rng);

        let mut scaled = left;
        for col in 0..n {
            let value = singular_profile(col, rank);
            scaled.column_mut(col).scale_mut(value);
        }
        let matrix = scaled * right.transpose();

        Ok(ForwardOperator::new(
            matrix,
            OperatorSpec::RankDeficient { n, rank, seed },
        ))
    }
}

fn singular_profile(index: usize, rank: usize) -> f64 {
    if index >= rank {
        return 0.0;
    }
    if rank == 1 {
        return 1.0;
    }
    1.0 - 0.9 * index as f64 / (rank - 1) as f64
}

fn gaussian_kernel(radius: usize, sigma: f64) -> Vec<f64> {
    let ksize = 2 * radius + 1;
    let mut kernel: Vec<f64> = (0..ksize)
        .map(|i| {
            let offset = i as f64 - radius as f64;
            (-0.5 * (offset / sigma).powi(2)).exp()
        })
        .collect();
    let total: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|v| *v /= total);
    kernel
}

fn random_orthonormal(n: usize, rng: &mut Xoshiro256PlusPlus) -> DMatrix<f64> {
    let gaussian = DMatrix::from_fn(n, n, |_, _| StandardNormal.sample(rng));
    QR::new(gaussian).q()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_kernel_is_normalized() {
        let kernel = gaussian_kernel(10, 2.5);
        assert_eq!(kernel.len(), 21);
        let total: f64 = kernel.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn gaussian_kernel_is_symmetric_and_peaked() {
        let kernel = gaussian_kernel(4, 1.5);
        for i in 0..4 {
            assert!((kernel[i] - kernel[8 - i]).abs() < 1e-15);
            assert!(kernel[i] < kernel[4]);
        }
    }

    #[test]
    fn singular_profile_ends_at_one_tenth() {
        assert!((singular_profile(0, 5) - 1.0).abs() < 1e-15);
        assert!((singular_profile(4, 5) - 0.1).abs() < 1e-15);
        assert_eq!(singular_profile(5, 5), 0.0);
    }

    #[test]
    fn random_orthonormal_has_unit_columns() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let q = random_orthonormal(8, &mut rng);
        let gram = q.transpose() * &q;
        for i in 0..8 {
            for j in 0..8 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((gram[(i, j)] - expected).abs() < 1e-10);
            }
        }
    }
}

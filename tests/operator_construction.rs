use specreg::{OperatorBuilder, OperatorSpec, SpectralDecomposer};

#[test]
fn blur_rows_sum_to_one() {
    let cases = [(64usize, 2.0f64, 5usize), (200, 2.5, 10), (50, 1.0, 3)];
    for (n, sigma, radius) in cases {
        let operator = OperatorBuilder::blur(n, sigma, radius).expect("blur operator");
        let matrix = operator.matrix();
        for i in 0..n {
            let row_sum: f64 = matrix.row(i).iter().sum();
            assert!(
                (row_sum - 1.0).abs() < 1e-9,
                "row {} of blur({}, {}, {}) sums to {}",
                i,
                n,
                sigma,
                radius,
                row_sum
            );
        }
    }
}

#[test]
fn blur_zero_radius_is_identity() {
    let operator = OperatorBuilder::blur(16, 1.0, 0).expect("blur operator");
    let matrix = operator.matrix();
    for i in 0..16 {
        for j in 0..16 {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((matrix[(i, j)] - expected).abs() < 1e-15);
        }
    }
}

#[test]
fn blur_is_circulant() {
    let operator = OperatorBuilder::blur(32, 1.5, 4).expect("blur operator");
    let matrix = operator.matrix();
    // Every row is the previous row shifted by one position (mod n).
    for i in 1..32 {
        for j in 0..32 {
            let wrapped = (j + 31) % 32;
            assert!((matrix[(i, j)] - matrix[(i - 1, wrapped)]).abs() < 1e-15);
        }
    }
}

#[test]
fn blur_rejects_invalid_arguments() {
    assert!(OperatorBuilder::blur(0, 1.0, 2).is_err());
    assert!(OperatorBuilder::blur(32, 0.0, 2).is_err());
    assert!(OperatorBuilder::blur(32, -1.5, 2).is_err());
    assert!(OperatorBuilder::blur(32, f64::NAN, 2).is_err());
    // Kernel wider than the signal.
    assert!(OperatorBuilder::blur(8, 1.0, 4).is_err());
}

#[test]
fn downsample_selects_every_factor_th_column() {
    let operator = OperatorBuilder::downsample(12, 3).expect("downsample operator");
    let matrix = operator.matrix();
    assert_eq!(matrix.nrows(), 4);
    assert_eq!(matrix.ncols(), 12);
    for i in 0..4 {
        for j in 0..12 {
            let expected = if j == i * 3 { 1.0 } else { 0.0 };
            assert_eq!(matrix[(i, j)], expected);
        }
    }
}

#[test]
fn downsample_rejects_invalid_arguments() {
    assert!(OperatorBuilder::downsample(0, 2).is_err());
    assert!(OperatorBuilder::downsample(12, 0).is_err());
    assert!(OperatorBuilder::downsample(10, 3).is_err());
}

#[test]
fn rank_deficient_has_exact_numerical_rank() {
    for rank in [1usize, 60, 120] {
        let operator = OperatorBuilder::rank_deficient(150, rank, 42).expect("operator");
        let decomposition = SpectralDecomposer::decompose(&operator).expect("decompose");
        let above: usize = decomposition
            .singular_values
            .iter()
            .filter(|s| **s > 1e-10)
            .count();
        assert_eq!(above, rank, "expected exactly {} nonzero singular values", rank);
    }
}

#[test]
fn rank_deficient_singular_profile_spans_one_to_tenth() {
    let operator = OperatorBuilder::rank_deficient(40, 20, 7).expect("operator");
    let decomposition = SpectralDecomposer::decompose(&operator).expect("decompose");
    let s = &decomposition.singular_values;
    assert!((s[0] - 1.0).abs() < 1e-8);
    assert!((s[19] - 0.1).abs() < 1e-8);
    assert!(s[20] < 1e-10);
}

#[test]
fn rank_deficient_is_deterministic_in_seed() {
    let a = OperatorBuilder::rank_deficient(24, 12, 9).expect("operator");
    let b = OperatorBuilder::rank_deficient(24, 12, 9).expect("operator");
    let c = OperatorBuilder::rank_deficient(24, 12, 10).expect("operator");
    assert_eq!(a.matrix(), b.matrix());
    assert_ne!(a.matrix(), c.matrix());
}

#[test]
fn rank_deficient_rejects_invalid_arguments() {
    assert!(OperatorBuilder::rank_deficient(0, 0, 1).is_err());
    assert!(OperatorBuilder::rank_deficient(10, 11, 1).is_err());
}

#[test]
fn operator_spec_reports_dimensions() {
    let blur = OperatorSpec::Blur {
        n: 64,
        sigma: 2.0,
        radius: 5,
    };
    assert_eq!(blur.output_dim(), 64);
    assert_eq!(blur.input_dim(), 64);

    let down = OperatorSpec::Downsample { n: 64, factor: 4 };
    assert_eq!(down.output_dim(), 16);
    assert_eq!(down.input_dim(), 64);
}

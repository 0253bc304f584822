use nalgebra::DVector;
use specreg::{noise, signals, OperatorBuilder, ReconstructionEngine, SpectralDecomposer};

fn relative_gap(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    let scale = a.norm().max(1e-30);
    (a - b).norm() / scale
}

#[test]
fn tikhonov_zero_matches_pseudoinverse() {
    let operator = OperatorBuilder::blur(48, 1.0, 4).expect("blur operator");
    let decomposition = SpectralDecomposer::decompose(&operator).expect("decompose");
    let t = signals::sample_times(48);
    let x_true = signals::sinusoid(&t);
    let y_clean = operator.apply(&x_true).expect("forward map");
    let y = noise::add_gaussian_noise(&y_clean, 0.01, &mut noise::seeded_rng(11)).expect("noise");

    let naive = ReconstructionEngine::pseudoinverse(&decomposition, &y).expect("pseudoinverse");
    let tikhonov = ReconstructionEngine::tikhonov(&decomposition, &y, 0.0).expect("tikhonov");
    assert!(
        relative_gap(&naive.solution, &tikhonov.solution) < 1e-6,
        "lambda = 0 should coincide with the naive pseudoinverse"
    );
}

#[test]
fn tsvd_full_rank_matches_pseudoinverse() {
    let operator = OperatorBuilder::blur(48, 1.0, 4).expect("blur operator");
    let decomposition = SpectralDecomposer::decompose(&operator).expect("decompose");
    let t = signals::sample_times(48);
    let x_true = signals::sinusoid(&t);
    let y_clean = operator.apply(&x_true).expect("forward map");
    let y = noise::add_gaussian_noise(&y_clean, 0.01, &mut noise::seeded_rng(12)).expect("noise");

    let naive = ReconstructionEngine::pseudoinverse(&decomposition, &y).expect("pseudoinverse");
    let full = ReconstructionEngine::tsvd(&decomposition, &y, decomposition.rank_bound())
        .expect("tsvd at full rank");
    assert!(relative_gap(&naive.solution, &full.solution) < 1e-6);
}

#[test]
fn tsvd_rank_zero_is_exactly_zero() {
    let operator = OperatorBuilder::blur(32, 1.5, 3).expect("blur operator");
    let decomposition = SpectralDecomposer::decompose(&operator).expect("decompose");
    let y = DVector::from_element(32, 1.0);
    let reconstruction = ReconstructionEngine::tsvd(&decomposition, &y, 0).expect("tsvd");
    assert!(reconstruction.solution.iter().all(|v| *v == 0.0));
}

#[test]
fn large_lambda_drives_solution_toward_zero() {
    let operator = OperatorBuilder::blur(32, 1.5, 3).expect("blur operator");
    let decomposition = SpectralDecomposer::decompose(&operator).expect("decompose");
    let y = DVector::from_element(32, 1.0);
    let reconstruction = ReconstructionEngine::tikhonov(&decomposition, &y, 1e6).expect("tikhonov");
    assert!(reconstruction.solution.norm() < 1e-9);
}

#[test]
fn pseudoinverse_inverts_clean_well_posed_measurements() {
    let operator = OperatorBuilder::blur(48, 1.0, 4).expect("blur operator");
    let decomposition = SpectralDecomposer::decompose(&operator).expect("decompose");
    let t = signals::sample_times(48);
    let x_true = signals::piecewise(&t);
    let y_clean = operator.apply(&x_true).expect("forward map");

    let naive =
        ReconstructionEngine::pseudoinverse(&decomposition, &y_clean).expect("pseudoinverse");
    assert!(
        relative_gap(&x_true, &naive.solution) < 1e-6,
        "noise-free inversion of a full-rank operator should recover the signal"
    );
}

#[test]
fn pseudoinverse_handles_exactly_rank_deficient_operators() {
    let operator = OperatorBuilder::rank_deficient(30, 10, 5).expect("operator");
    let decomposition = SpectralDecomposer::decompose(&operator).expect("decompose");
    let y = DVector::from_element(30, 1.0);
    let naive = ReconstructionEngine::pseudoinverse(&decomposition, &y).expect("pseudoinverse");
    assert!(
        naive.solution.iter().all(|v| v.is_finite()),
        "zero singular values must not poison the solution"
    );
}

#[test]
fn negative_lambda_rejected() {
    let operator = OperatorBuilder::blur(16, 1.0, 2).expect("blur operator");
    let decomposition = SpectralDecomposer::decompose(&operator).expect("decompose");
    let y = DVector::from_element(16, 1.0);
    assert!(ReconstructionEngine::tikhonov(&decomposition, &y, -0.1).is_err());
    assert!(ReconstructionEngine::tikhonov(&decomposition, &y, f64::NAN).is_err());
}

#[test]
fn truncation_rank_above_bound_rejected() {
    let operator = OperatorBuilder::blur(16, 1.0, 2).expect("blur operator");
    let decomposition = SpectralDecomposer::decompose(&operator).expect("decompose");
    let y = DVector::from_element(16, 1.0);
    assert!(ReconstructionEngine::tsvd(&decomposition, &y, 17).is_err());
}

#[test]
fn mismatched_measurement_length_rejected() {
    let operator = OperatorBuilder::blur(16, 1.0, 2).expect("blur operator");
    let decomposition = SpectralDecomposer::decompose(&operator).expect("decompose");
    let y = DVector::from_element(15, 1.0);
    assert!(ReconstructionEngine::pseudoinverse(&decomposition, &y).is_err());
    assert!(ReconstructionEngine::tikhonov(&decomposition, &y, 0.1).is_err());
    assert!(ReconstructionEngine::tsvd(&decomposition, &y, 4).is_err());
}

use nalgebra::DVector;

/// Sample times in [0, 1), excluding the right endpoint.
pub fn sample_times(n: usize) -> DVector<f64> {
    DVector::from_fn(n, |i, _| i as f64 / n as f64)
}

/// Two-component sinusoid used as the default ground-truth signal.
pub fn sinusoid(t: &DVector<f64>) -> DVector<f64> {
    t.map(|v| (2.0 * std::f64::consts::PI * v).sin() + 0.5 * (6.0 * std::f64::consts::PI * v).sin())
}

pub fn multisine(t: &DVector<f64>, components: &[(f64, f64)]) -> DVector<f64> {
    t.map(|v| {
        components
            .iter()
            .map(|(freq, amp)| amp * (2.0 * std::f64::consts::PI * freq * v).sin())
            .sum::<f64>()
    })
}

/// Piecewise-constant signal over three equal thirds of the sample window.
pub fn piecewise(t: &DVector<f64>) -> DVector<f64> {
    let n = t.len();
    let third = n / 3;
    DVector::from_fn(n, |i, _| {
        if i < third {
            1.0
        } else if i < 2 * third {
            -0.5
        } else {
            0.7
        }
    })
}

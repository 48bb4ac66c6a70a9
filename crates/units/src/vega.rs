//! Vega reference spectrum, sampled at the Johnson-Cousins-Bessell band
//! centres (f_λ in erg s⁻¹ cm⁻² Å⁻¹ for a zero-magnitude star).

const SAMPLES: &[(f64, f64)] = &[
    (3600.0, 4.175e-9),
    (4380.0, 6.320e-9),
    (5450.0, 3.631e-9),
    (6410.0, 2.177e-9),
    (7980.0, 1.126e-9),
    (12200.0, 3.147e-10),
    (16300.0, 1.138e-10),
    (21900.0, 3.961e-11),
];

/// Log-log interpolation, clamped to the end samples outside the table.
pub(crate) fn flam_at(wavelength_aa: f64) -> f64 {
    let (first, last) = (SAMPLES[0], SAMPLES[SAMPLES.len() - 1]);
    if wavelength_aa <= first.0 {
        return first.1;
    }
    if wavelength_aa >= last.0 {
        return last.1;
    }
    for pair in SAMPLES.windows(2) {
        let ((w0, f0), (w1, f1)) = (pair[0], pair[1]);
        if wavelength_aa <= w1 {
            let t = (wavelength_aa.ln() - w0.ln()) / (w1.ln() - w0.ln());
            return (f0.ln() + t * (f1.ln() - f0.ln())).exp();
        }
    }
    last.1
}

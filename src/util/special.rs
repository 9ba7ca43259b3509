//! Special functions used by closed-form distribution statistics

/// Euler-Mascheroni constant
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

/// Lanczos approximation parameters (g = 7, n = 9)
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Gamma function
///
/// Returns NaN at the poles (zero and the negative integers).
pub fn gamma(x: f64) -> f64 {
    if x <= 0.0 && x == x.floor() {
        return f64::NAN;
    }
    if x < 0.5 {
        // Reflection: Γ(x) = π / (sin(πx) Γ(1 - x))
        let sin_pi_x = (std::f64::consts::PI * x).sin();
        return std::f64::consts::PI / (sin_pi_x * gamma(1.0 - x));
    }
    ln_gamma_positive(x).exp()
}

fn ln_gamma_positive(x: f64) -> f64 {
    let x = x - 1.0;
    let mut sum = LANCZOS_COEFFICIENTS[0];
    for (i, c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    LN_SQRT_2PI + (x + 0.5) * t.ln() - t + sum.ln()
}

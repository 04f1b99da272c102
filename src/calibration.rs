// src/calibration.rs
// Wavelength calibration polynomials and origin shifting

/// Number of calibration coefficients stored in an SPE header (degree-5 polynomial).
pub const WAVE_COEF_COUNT: usize = 6;

/// Evaluate `Σ coefs[k] * x^k` using Horner's scheme.
pub fn evaluate(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Wavelength of every channel index in `0..count`.
pub fn wave_lengths_from_coefs(coefs: &[f64], count: usize) -> Vec<f64> {
    (0..count).map(|i| evaluate(coefs, i as f64)).collect()
}

/// Binomial coefficients built row by row with the additive recurrence
/// `C(n, k) = C(n-1, k-1) + C(n-1, k)`.
#[derive(Clone, Debug)]
pub struct PascalTriangle {
    rows: Vec<Vec<f64>>,
}

impl PascalTriangle {
    /// Rows `0..rows`, so `binomial(n, k)` is defined for `n < rows`.
    pub fn new(rows: usize) -> Self {
        let mut table: Vec<Vec<f64>> = Vec::with_capacity(rows);
        for n in 0..rows {
            let mut row = vec![1.0; n + 1];
            if let Some(prev) = table.last() {
                for k in 1..n {
                    row[k] = prev[k - 1] + prev[k];
                }
            }
            table.push(row);
        }
        PascalTriangle { rows: table }
    }

    /// `n` choose `k`; zero outside the triangle.
    pub fn binomial(&self, n: usize, k: usize) -> f64 {
        self.rows
            .get(n)
            .and_then(|row| row.get(k))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Re-express the calibration for a channel origin moved by `displacement`.
///
/// Returns `q` such that `evaluate(q, j) == evaluate(coefs, j + displacement)`:
///
/// `q[t] = Σ_{j=t}^{n} coefs[j] * C(j, t) * displacement^(j - t)`
///
/// Works for any coefficient count; the result has the same length as `coefs`.
pub fn displaced_wave_coefs(coefs: &[f64], displacement: f64) -> Vec<f64> {
    let triangle = PascalTriangle::new(coefs.len());

    (0..coefs.len())
        .map(|t| {
            coefs[t..]
                .iter()
                .enumerate()
                .map(|(offset, &p)| {
                    let j = t + offset;
                    p * triangle.binomial(j, t) * displacement.powi(offset as i32)
                })
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Upper bound on the size of the terms summed when evaluating at |x| <= x_max.
    fn magnitude(coefs: &[f64], x_max: f64) -> f64 {
        let abs: Vec<f64> = coefs.iter().map(|c| c.abs()).collect();
        evaluate(&abs, 1.0 + x_max)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn test_evaluate() {
        let coefs = [400.0, 10.0, 0.5, 0.0, 0.0, 0.0];
        assert_eq!(evaluate(&coefs, 0.0), 400.0);
        assert_eq!(evaluate(&coefs, 2.0), 422.0);
        assert_eq!(evaluate(&[], 3.0), 0.0);
    }

    #[test]
    fn test_wave_lengths() {
        let waves = wave_lengths_from_coefs(&[400.0, 10.0, 0.0, 0.0, 0.0, 0.0], 3);
        assert_eq!(waves, vec![400.0, 410.0, 420.0]);
    }

    #[test]
    fn test_pascal_triangle() {
        let triangle = PascalTriangle::new(6);
        assert_eq!(triangle.binomial(0, 0), 1.0);
        assert_eq!(triangle.binomial(4, 2), 6.0);
        assert_eq!(triangle.binomial(5, 1), 5.0);
        assert_eq!(triangle.binomial(5, 3), 10.0);
        assert_eq!(triangle.binomial(5, 5), 1.0);
        assert_eq!(triangle.binomial(3, 4), 0.0);
        assert_eq!(triangle.binomial(6, 0), 0.0);
    }

    #[test]
    fn test_zero_displacement_is_identity() {
        let coefs = vec![546.1, 0.21, -3.2e-5, 1.1e-8, 0.0, 2.0e-15];
        assert_eq!(displaced_wave_coefs(&coefs, 0.0), coefs);
    }

    #[test]
    fn test_linear_shift() {
        let shifted = displaced_wave_coefs(&[400.0, 10.0, 0.0, 0.0, 0.0, 0.0], 1.0);
        assert_eq!(shifted, vec![410.0, 10.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_quadratic_shift() {
        // (j + 2)^2 = j^2 + 4j + 4
        let shifted = displaced_wave_coefs(&[0.0, 0.0, 1.0], 2.0);
        assert_eq!(shifted, vec![4.0, 4.0, 1.0]);
    }

    #[test]
    fn test_any_length() {
        assert!(displaced_wave_coefs(&[], 5.0).is_empty());
        assert_eq!(displaced_wave_coefs(&[7.0], -3.0), vec![7.0]);
        assert_eq!(displaced_wave_coefs(&[1.0; 9], 1.0).len(), 9);
    }

    proptest! {
        #[test]
        fn prop_shift_matches_evaluation(
            coefs in prop::collection::vec(-10.0f64..10.0, WAVE_COEF_COUNT),
            displacement in -50i32..50,
            j in 0u32..64,
        ) {
            let d = displacement as f64;
            let shifted = displaced_wave_coefs(&coefs, d);
            let expected = evaluate(&coefs, j as f64 + d);
            let actual = evaluate(&shifted, j as f64);
            let scale = magnitude(&coefs, j as f64 + d.abs());
            prop_assert!(
                (actual - expected).abs() <= 1e-9 * (1.0 + scale),
                "{} != {}", actual, expected
            );
        }

        #[test]
        fn prop_shift_composes(
            coefs in prop::collection::vec(-10.0f64..10.0, WAVE_COEF_COUNT),
            a in -20i32..20,
            b in -20i32..20,
        ) {
            let twice = displaced_wave_coefs(&displaced_wave_coefs(&coefs, a as f64), b as f64);
            let once = displaced_wave_coefs(&coefs, (a + b) as f64);
            let scale = magnitude(&coefs, (a.abs() + b.abs()) as f64);
            for (x, y) in twice.iter().zip(once.iter()) {
                prop_assert!((x - y).abs() <= 1e-9 * (1.0 + scale), "{} != {}", x, y);
            }
        }
    }

    #[test]
    fn test_fractional_displacement() {
        let coefs = [1.0, -2.0, 0.5, 0.25, 0.0, 0.01];
        let shifted = displaced_wave_coefs(&coefs, 0.5);
        for j in 0..10 {
            let j = j as f64;
            assert!(close(evaluate(&shifted, j), evaluate(&coefs, j + 0.5)));
        }
    }
}

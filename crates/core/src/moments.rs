//! Central moments of a reciprocal-distance row.

/// Sign-preserving cube root.
///
/// `f64::cbrt` is defined on the whole real line, so `signed_cbrt(-8.0)` is
/// `-2.0`. `x.powf(1.0 / 3.0)` returns NaN for negative `x` and must not be
/// used here.
#[inline]
pub fn signed_cbrt(x: f64) -> f64 {
    x.cbrt()
}

/// The three DRID moments of one atom's row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation (divisor `n`).
    pub std: f64,
    /// Signed cube root of the third central moment.
    pub third: f64,
}

impl Moments {
    /// Descriptor emitted for an atom whose row is empty.
    pub const NAN: Moments = Moments {
        mean: f64::NAN,
        std: f64::NAN,
        third: f64::NAN,
    };

    /// Compute the moments of `values`. Returns `None` for an empty row.
    ///
    /// Two passes: the mean first, then the second and third central moments
    /// around it.
    pub fn from_values(values: &[f64]) -> Option<Moments> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let mut m2 = 0.0;
        let mut m3 = 0.0;
        for &v in values {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
        }

        Some(Moments {
            mean,
            std: (m2 / n).sqrt(),
            third: signed_cbrt(m3 / n),
        })
    }

    /// `[mean, std, third]`, the descriptor component order.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.mean, self.std, self.third]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_cbrt() {
        assert!((signed_cbrt(27.0) - 3.0).abs() < 1e-12);
        assert!((signed_cbrt(-8.0) + 2.0).abs() < 1e-12);
        assert_eq!(signed_cbrt(0.0), 0.0);
        // powf is undefined for negative bases with fractional exponents
        assert!((-8.0f64).powf(1.0 / 3.0).is_nan());
    }

    #[test]
    fn test_empty_row() {
        assert!(Moments::from_values(&[]).is_none());
    }

    #[test]
    fn test_single_value() {
        let m = Moments::from_values(&[0.5]).unwrap();
        assert_eq!(m.mean, 0.5);
        assert_eq!(m.std, 0.0);
        assert_eq!(m.third, 0.0);
    }

    #[test]
    fn test_population_std() {
        // mean 5, squared deviations sum to 32 over 8 values -> variance 4
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = Moments::from_values(&values).unwrap();
        assert!((m.mean - 5.0).abs() < 1e-12);
        assert!((m.std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_third_moment_sign() {
        // long tail to the right -> positive skew
        let right = Moments::from_values(&[1.0, 1.0, 1.0, 10.0]).unwrap();
        assert!(right.third > 0.0);

        // mirrored -> negative, same magnitude
        let left = Moments::from_values(&[-1.0, -1.0, -1.0, -10.0]).unwrap();
        assert!(left.third < 0.0);
        assert!((left.third + right.third).abs() < 1e-12);
    }

    #[test]
    fn test_third_moment_value() {
        // mean 2, deviations -1, -1, 2 -> m3 = (-1 - 1 + 8) / 3 = 2
        let m = Moments::from_values(&[1.0, 1.0, 4.0]).unwrap();
        assert!((m.third - 2.0f64.cbrt()).abs() < 1e-12);
        assert_eq!(m.to_array(), [m.mean, m.std, m.third]);
    }

    #[test]
    fn test_nan_descriptor() {
        assert!(Moments::NAN.to_array().iter().all(|v| v.is_nan()));
    }
}

/// Default zero-snapping threshold, `2^-40`.
pub const DEFAULT_EPS: f64 = 1.0 / (1u64 << 40) as f64;

/// Numeric tolerance below which a value is treated as exactly zero.
///
/// The tolerance governs both the zero-snapping applied to every matrix entry and the
/// singularity test of the factorizations. Every [`crate::Matrix`] carries its own copy,
/// so solvers running on different threads never share it.
///
/// # Example
///
/// ```
/// use warpgrid_linalg::Tolerance;
///
/// let mut tol = Tolerance::default();
/// assert_eq!(tol.eps(), 2f64.powi(-40));
///
/// tol.set_eps(1e-9);
/// assert_eq!(tol.snap(5e-10), 0.0);
/// assert_eq!(tol.snap(2e-9), 2e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    eps: f64,
}

impl Tolerance {
    /// Create a tolerance with the given threshold.
    ///
    /// Zero, negative or non-finite values fall back to [`DEFAULT_EPS`]. A zero threshold
    /// would never report a zero pivot as singular.
    pub fn new(eps: f64) -> Self {
        if eps.is_finite() && eps > 0.0 {
            Self { eps }
        } else {
            log::debug!("ignoring invalid tolerance {eps}, using the default");
            Self::default()
        }
    }

    /// The current threshold.
    #[inline]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Change the threshold in place.
    pub fn set_eps(&mut self, eps: f64) {
        *self = Self::new(eps);
    }

    /// Builder-style variant of [`Tolerance::set_eps`].
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.set_eps(eps);
        self
    }

    /// Replace values whose magnitude is below the threshold by exactly zero.
    #[inline]
    pub fn snap(&self, x: f64) -> f64 {
        if x.abs() < self.eps {
            0.0
        } else {
            x
        }
    }

    /// Whether the value is indistinguishable from zero.
    #[inline]
    pub fn is_zero(&self, x: f64) -> bool {
        x.abs() < self.eps
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { eps: DEFAULT_EPS }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_two_to_minus_forty() {
        assert_eq!(Tolerance::default().eps(), 2f64.powi(-40));
        assert_eq!(DEFAULT_EPS, 2f64.powi(-40));
    }

    #[test]
    fn invalid_values_fall_back() {
        assert_eq!(Tolerance::new(-1.0), Tolerance::default());
        assert_eq!(Tolerance::new(f64::NAN), Tolerance::default());
        assert_eq!(Tolerance::new(0.0), Tolerance::default());
        assert_eq!(Tolerance::new(-0.0), Tolerance::default());
        assert_eq!(Tolerance::default().with_eps(0.0), Tolerance::default());
    }

    #[test]
    fn snap_keeps_sign_of_large_values() {
        let tol = Tolerance::new(1e-6);
        assert_eq!(tol.snap(-1e-7), 0.0);
        assert_eq!(tol.snap(-1e-5), -1e-5);
        assert!(tol.is_zero(1e-7));
        assert!(!tol.is_zero(1e-6));
    }

    #[test]
    fn smallest_threshold_still_detects_zero() {
        let tol = Tolerance::new(f64::MIN_POSITIVE);
        assert_eq!(tol.eps(), f64::MIN_POSITIVE);
        assert!(tol.is_zero(0.0));
        assert!(tol.is_zero(-0.0));
        assert!(!tol.is_zero(f64::MIN_POSITIVE));
    }
}

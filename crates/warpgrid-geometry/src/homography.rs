use warpgrid_linalg::{LinalgError, Matrix, Tolerance};

use crate::{convexity, error::GeometryError, point::Point2, Quad};

/// A planar projective transform with its bottom-right entry fixed to one.
///
/// A point `(x, y)` maps to
///
/// ```text
/// x' = (h00 x + h01 y + h02) / (h20 x + h21 y + 1)
/// y' = (h10 x + h11 y + h12) / (h20 x + h21 y + 1)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Homography {
    m: [[f64; 3]; 3],
}

impl Homography {
    /// The identity transform.
    pub const IDENTITY: Homography = Homography {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Build a homography from its eight free parameters `h0..h7` in row-major order.
    pub fn from_params(h: [f64; 8]) -> Self {
        Self {
            m: [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]],
        }
    }

    /// The eight free parameters in row-major order.
    pub fn params(&self) -> [f64; 8] {
        let m = &self.m;
        [
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1],
        ]
    }

    /// The 3x3 matrix in row-major order.
    pub fn as_array(&self) -> &[[f64; 3]; 3] {
        &self.m
    }

    /// Copy into a dense [`Matrix`].
    pub fn to_matrix(&self, tol: Tolerance) -> Result<Matrix, LinalgError> {
        Matrix::from_rows_with(&self.m, tol)
    }

    /// Determinant computed by cofactor expansion.
    #[rustfmt::skip]
    pub fn det(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1]) -
        m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0]) +
        m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Map a point through the homography.
    ///
    /// Points on the vanishing line (`w == 0`) map to infinite or NaN coordinates.
    pub fn apply(&self, p: Point2) -> Point2 {
        let m = &self.m;
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        let x = (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w;
        let y = (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w;
        Point2::new(x, y)
    }

    /// The inverse transform, renormalized so that its bottom-right entry is one.
    ///
    /// # Errors
    ///
    /// Fails with a singular [`GeometryError::Linalg`] if the homography is not invertible
    /// or its inverse maps the origin to infinity.
    pub fn inverse(&self, tol: Tolerance) -> Result<Homography, GeometryError> {
        let inv = self.to_matrix(tol)?.inverse()?;
        let w = inv[(2, 2)];
        if tol.is_zero(w) {
            return Err(LinalgError::Singular.into());
        }
        let m = std::array::from_fn(|r| std::array::from_fn(|c| inv[(r, c)] / w));
        Ok(Homography { m })
    }

    /// Whether every entry is within `eps` of the identity.
    pub fn is_identity(&self, eps: f64) -> bool {
        self.m.iter().enumerate().all(|(r, row)| {
            row.iter().enumerate().all(|(c, &v)| {
                let expected = if r == c { 1.0 } else { 0.0 };
                (v - expected).abs() <= eps
            })
        })
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Estimates the homography mapping four source corners onto four destination corners.
///
/// The bottom-right entry of the homography is fixed to one, which leaves eight unknowns
/// `h0..h7`. Every correspondence `src[i] -> dst[i]` contributes the two linear equations
///
/// ```text
/// h0 x + h1 y + h2 - h6 x X - h7 y X = X
/// h3 x + h4 y + h5 - h6 x Y - h7 y Y = Y
/// ```
///
/// with `(x, y) = src[i]` and `(X, Y) = dst[i]`. The `X` equations fill rows `0..4` of the
/// 8x8 system and the `Y` equations rows `4..8`, which is then solved through a pivoted LU
/// factorization.
///
/// # Example
///
/// ```
/// use warpgrid_geometry::{HomographyEstimator, Point2};
///
/// let src = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)].map(Point2::from);
/// let dst = [(10.0, 10.0), (90.0, 5.0), (95.0, 95.0), (5.0, 90.0)].map(Point2::from);
///
/// let homography = HomographyEstimator::default().estimate(&src, &dst)?;
/// let mapped = homography.apply(src[1]);
/// assert!((mapped.x - 90.0).abs() < 1e-6 && (mapped.y - 5.0).abs() < 1e-6);
/// # Ok::<(), warpgrid_geometry::GeometryError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HomographyEstimator {
    tol: Tolerance,
}

impl HomographyEstimator {
    /// Create an estimator using `tol` for zero-snapping and singularity checks.
    pub fn new(tol: Tolerance) -> Self {
        Self { tol }
    }

    /// The tolerance used by this estimator.
    pub fn tolerance(&self) -> Tolerance {
        self.tol
    }

    /// Assemble the 8x8 coefficient matrix and the 8x1 right-hand side.
    pub fn linear_system(&self, src: &Quad, dst: &Quad) -> Result<(Matrix, Matrix), GeometryError> {
        let mut a = [[0.0; 8]; 8];
        let mut b = [[0.0; 1]; 8];

        for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
            a[i] = [s.x, s.y, 1.0, 0.0, 0.0, 0.0, -s.x * d.x, -s.y * d.x];
            a[i + 4] = [0.0, 0.0, 0.0, s.x, s.y, 1.0, -s.x * d.y, -s.y * d.y];
            b[i] = [d.x];
            b[i + 4] = [d.y];
        }

        let a = Matrix::from_rows_with(&a, self.tol)?;
        let b = Matrix::from_rows_with(&b, self.tol)?;
        Ok((a, b))
    }

    /// Estimate the homography mapping `src[i]` to `dst[i]`.
    ///
    /// Both quadrilaterals must list their corners in the same winding order.
    ///
    /// # Errors
    ///
    /// * [`GeometryError::NonFinite`] if a coordinate is NaN or infinite.
    /// * [`GeometryError::NonConvexDestination`] or
    ///   [`GeometryError::CollinearDestination`] if `dst` is not a proper convex
    ///   quadrilateral. No numeric work is done in that case.
    /// * A singular [`GeometryError::Linalg`] if the correspondences do not determine an
    ///   invertible homography.
    pub fn estimate(&self, src: &Quad, dst: &Quad) -> Result<Homography, GeometryError> {
        if !src.iter().all(Point2::is_finite) {
            return Err(GeometryError::NonFinite);
        }
        convexity::check_convex(dst, self.tol)?;

        let (a, b) = self.linear_system(src, dst)?;
        let h = a.solve(&b)?;

        let params: [f64; 8] = std::array::from_fn(|i| h[(i, 0)]);
        let homography = Homography::from_params(params);

        let det = homography.to_matrix(self.tol)?.det()?;
        if det == 0.0 {
            log::debug!("estimated homography is singular: {params:?}");
            return Err(LinalgError::Singular.into());
        }

        Ok(homography)
    }
}

/// Estimate the homography mapping `src[i]` to `dst[i]` with the default tolerance.
///
/// See [`HomographyEstimator::estimate`].
pub fn homography_4pt(src: &Quad, dst: &Quad) -> Result<Homography, GeometryError> {
    HomographyEstimator::default().estimate(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use warpgrid_linalg::ops;

    fn quad(points: [(f64, f64); 4]) -> Quad {
        points.map(Point2::from)
    }

    fn square(side: f64) -> Quad {
        quad([(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)])
    }

    fn assert_maps(h: &Homography, src: &Quad, dst: &Quad, epsilon: f64) {
        for (s, d) in src.iter().zip(dst.iter()) {
            let p = h.apply(*s);
            assert_relative_eq!(p.x, d.x, epsilon = epsilon);
            assert_relative_eq!(p.y, d.y, epsilon = epsilon);
        }
    }

    #[test]
    fn identity() -> Result<(), GeometryError> {
        let src = square(100.0);
        let h = homography_4pt(&src, &src)?;
        assert!(h.is_identity(1e-12));
        Ok(())
    }

    #[test]
    fn translation() -> Result<(), GeometryError> {
        let src = square(1.0);
        let expected = Homography::from_params([1.0, 0.0, 3.0, 0.0, 1.0, -2.0, 0.0, 0.0]);
        let dst = src.map(|p| expected.apply(p));
        let h = homography_4pt(&src, &dst)?;
        for (a, b) in h.params().iter().zip(expected.params().iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn concrete_perspective_warp() -> Result<(), GeometryError> {
        let src = square(100.0);
        let dst = quad([(10.0, 10.0), (90.0, 5.0), (95.0, 95.0), (5.0, 90.0)]);
        let h = homography_4pt(&src, &dst)?;

        assert!(!h.is_identity(1e-3));
        assert!(h.det().abs() > 1e-6);
        // perspective terms are active
        assert!(h.params()[6] != 0.0 || h.params()[7] != 0.0);
        assert_maps(&h, &src, &dst, 1e-6);
        Ok(())
    }

    #[test]
    fn linear_system_layout() -> Result<(), GeometryError> {
        let src = square(2.0);
        let dst = quad([(1.0, 1.0), (3.0, 1.0), (3.0, 4.0), (1.0, 4.0)]);
        let (a, b) = HomographyEstimator::default().linear_system(&src, &dst)?;

        assert_eq!(a.row(2), Some(&[2.0, 2.0, 1.0, 0.0, 0.0, 0.0, -6.0, -6.0][..]));
        assert_eq!(a.row(6), Some(&[0.0, 0.0, 0.0, 2.0, 2.0, 1.0, -8.0, -8.0][..]));
        assert_eq!(b.as_slice(), &[1.0, 3.0, 3.0, 1.0, 1.0, 1.0, 4.0, 4.0]);

        // the solution satisfies every equation
        let h = a.solve(&b)?;
        let residual = ops::sub(&ops::matmul(&a, &h)?, &b)?;
        assert!(residual.max_abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn random_convex_round_trip() -> Result<(), GeometryError> {
        let mut rng = StdRng::seed_from_u64(7);
        let src = square(200.0);
        for _ in 0..100 {
            // jitter each corner inside its own quadrant, which keeps the quad convex
            let dst = quad([
                (rng.random_range(0.0..40.0), rng.random_range(0.0..40.0)),
                (rng.random_range(160.0..200.0), rng.random_range(0.0..40.0)),
                (rng.random_range(160.0..200.0), rng.random_range(160.0..200.0)),
                (rng.random_range(0.0..40.0), rng.random_range(160.0..200.0)),
            ]);
            let h = homography_4pt(&src, &dst)?;
            assert_maps(&h, &src, &dst, 1e-6);
        }
        Ok(())
    }

    #[test]
    fn concave_destination_fails_before_solving() {
        let src = square(100.0);
        let dst = quad([(0.0, 0.0), (100.0, 0.0), (30.0, 30.0), (0.0, 100.0)]);
        let err = homography_4pt(&src, &dst).unwrap_err();
        assert_eq!(err, GeometryError::NonConvexDestination);
        assert!(err.is_degenerate());
    }

    #[test]
    fn collinear_destination_never_yields_a_homography() {
        let src = square(100.0);
        let dst = quad([(50.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 0.0)]);
        let err = homography_4pt(&src, &dst).unwrap_err();
        assert!(err.is_degenerate() || err.is_singular(), "unexpected {err:?}");
    }

    #[test]
    fn non_finite_source() {
        let mut src = square(1.0);
        src[2].x = f64::INFINITY;
        assert_eq!(
            homography_4pt(&src, &square(1.0)),
            Err(GeometryError::NonFinite)
        );
    }

    #[test]
    fn inverse_maps_back() -> Result<(), GeometryError> {
        let src = square(100.0);
        let dst = quad([(10.0, 10.0), (90.0, 5.0), (95.0, 95.0), (5.0, 90.0)]);
        let tol = Tolerance::default();
        let h = HomographyEstimator::new(tol).estimate(&src, &dst)?;
        let h_inv = h.inverse(tol)?;
        assert_maps(&h_inv, &dst, &src, 1e-6);
        assert_eq!(h_inv.as_array()[2][2], 1.0);
        Ok(())
    }

    #[test]
    fn estimator_uses_its_tolerance() {
        let tol = Tolerance::new(1e-3);
        let estimator = HomographyEstimator::new(tol);
        assert_eq!(estimator.tolerance(), tol);
        assert_eq!(HomographyEstimator::default().tolerance(), Tolerance::default());
    }
}

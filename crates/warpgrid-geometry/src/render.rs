use crate::{homography::Homography, point::Point2};

/// A 4x4 transform in column-major order, as consumed by `matrix3d(...)` in CSS or by
/// OpenGL style uniforms.
///
/// A planar homography embeds as
///
/// ```text
/// | h00 h01 0 h02 |
/// | h10 h11 0 h12 |
/// |  0   0  1  0  |
/// | h20 h21 0  1  |
/// ```
///
/// which acts on `(x, y, 0, 1)` exactly as the homography acts on `(x, y, 1)`. The z axis
/// passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderMatrix {
    /// `cols[c][r]` is the entry at row `r` and column `c`.
    cols: [[f64; 4]; 4],
}

impl RenderMatrix {
    /// The identity transform.
    pub const IDENTITY: RenderMatrix = RenderMatrix {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Embed a planar homography.
    pub fn from_homography(h: &Homography) -> Self {
        let m = h.as_array();
        Self {
            cols: [
                [m[0][0], m[1][0], 0.0, m[2][0]],
                [m[0][1], m[1][1], 0.0, m[2][1]],
                [0.0, 0.0, 1.0, 0.0],
                [m[0][2], m[1][2], 0.0, m[2][2]],
            ],
        }
    }

    /// Entry at `row`, `col`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cols.get(col).and_then(|c| c.get(row)).copied()
    }

    /// The 16 entries in column-major order.
    pub fn to_cols_array(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for (chunk, col) in out.chunks_exact_mut(4).zip(self.cols.iter()) {
            chunk.copy_from_slice(col);
        }
        out
    }

    /// The columns.
    pub fn to_cols_array_2d(&self) -> [[f64; 4]; 4] {
        self.cols
    }

    /// The rows.
    pub fn to_rows_array_2d(&self) -> [[f64; 4]; 4] {
        std::array::from_fn(|r| std::array::from_fn(|c| self.cols[c][r]))
    }

    /// Map a point lying on the `z = 0` plane, dividing by the homogeneous coordinate.
    pub fn transform_point(&self, p: Point2) -> Point2 {
        let v = [p.x, p.y, 0.0, 1.0];
        let mut out = [0.0; 4];
        for (c, col) in self.cols.iter().enumerate() {
            for (r, o) in out.iter_mut().enumerate() {
                *o += col[r] * v[c];
            }
        }
        Point2::new(out[0] / out[3], out[1] / out[3])
    }

    /// Format as a CSS `matrix3d(...)` value.
    ///
    /// ```
    /// use warpgrid_geometry::RenderMatrix;
    ///
    /// assert_eq!(
    ///     RenderMatrix::IDENTITY.to_css(),
    ///     "matrix3d(1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1)"
    /// );
    /// ```
    pub fn to_css(&self) -> String {
        let values: Vec<String> = self.to_cols_array().iter().map(f64::to_string).collect();
        format!("matrix3d({})", values.join(", "))
    }
}

impl Default for RenderMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<&Homography> for RenderMatrix {
    fn from(h: &Homography) -> Self {
        Self::from_homography(h)
    }
}

impl From<Homography> for RenderMatrix {
    fn from(h: Homography) -> Self {
        Self::from_homography(&h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn layout() {
        let h = Homography::from_params([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let m = RenderMatrix::from_homography(&h);

        assert_eq!(
            m.to_cols_array(),
            [1.0, 4.0, 0.0, 7.0, 2.0, 5.0, 0.0, 8.0, 0.0, 0.0, 1.0, 0.0, 3.0, 6.0, 0.0, 1.0]
        );
        assert_eq!(
            m.to_rows_array_2d(),
            [
                [1.0, 2.0, 0.0, 3.0],
                [4.0, 5.0, 0.0, 6.0],
                [0.0, 0.0, 1.0, 0.0],
                [7.0, 8.0, 0.0, 1.0],
            ]
        );
        assert_eq!(m.get(3, 1), Some(8.0));
        assert_eq!(m.get(0, 3), Some(3.0));
        assert_eq!(m.get(4, 0), None);
    }

    #[test]
    fn identity_embeds_identity() {
        assert_eq!(RenderMatrix::from(Homography::IDENTITY), RenderMatrix::IDENTITY);
        assert_eq!(RenderMatrix::default(), RenderMatrix::IDENTITY);
    }

    #[test]
    fn agrees_with_homography() {
        let h = Homography::from_params([0.9, -0.1, 10.0, 0.05, 1.1, 5.0, 0.001, -0.002]);
        let m = RenderMatrix::from(&h);
        for p in [(0.0, 0.0), (100.0, 0.0), (37.5, 81.0)].map(Point2::from) {
            let a = h.apply(p);
            let b = m.transform_point(p);
            assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
            assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
        }
    }
}

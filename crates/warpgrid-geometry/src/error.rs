use warpgrid_linalg::LinalgError;

/// Errors raised while estimating or packaging a perspective transform.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The destination quadrilateral has a reflex vertex.
    #[error("destination quadrilateral is not convex")]
    NonConvexDestination,

    /// Three consecutive destination corners are collinear, or two corners coincide.
    #[error("destination quadrilateral is degenerate at vertex {vertex}")]
    CollinearDestination {
        /// Index of the corner where the quadrilateral does not turn.
        vertex: usize,
    },

    /// A corner coordinate is NaN or infinite.
    #[error("corner coordinates must be finite")]
    NonFinite,

    /// The linear system or the estimated homography is singular, or a matrix operation
    /// failed.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

impl GeometryError {
    /// Whether the error comes from the shape of the destination quadrilateral rather than
    /// from the numerics.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            GeometryError::NonConvexDestination | GeometryError::CollinearDestination { .. }
        )
    }

    /// Whether the error is a singular linear system or homography.
    pub fn is_singular(&self) -> bool {
        matches!(self, GeometryError::Linalg(LinalgError::Singular))
    }
}

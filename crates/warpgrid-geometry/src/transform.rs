use warpgrid_linalg::Tolerance;

use crate::{error::GeometryError, homography::HomographyEstimator, render::RenderMatrix, Quad};

/// Compute the render matrix that warps the `src` quadrilateral onto `dst`.
///
/// This is [`HomographyEstimator::estimate`] followed by [`RenderMatrix::from_homography`].
pub fn perspective_transform(src: &Quad, dst: &Quad) -> Result<RenderMatrix, GeometryError> {
    perspective_transform_with(src, dst, Tolerance::default())
}

/// Same as [`perspective_transform`] with an explicit tolerance.
pub fn perspective_transform_with(
    src: &Quad,
    dst: &Quad,
    tol: Tolerance,
) -> Result<RenderMatrix, GeometryError> {
    let homography = HomographyEstimator::new(tol).estimate(src, dst)?;
    Ok(RenderMatrix::from_homography(&homography))
}

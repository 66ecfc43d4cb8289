#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! ```
//! use warpgrid_geometry::{perspective_transform, Point2};
//!
//! let src = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)].map(Point2::from);
//! let dst = [(10.0, 10.0), (90.0, 5.0), (95.0, 95.0), (5.0, 90.0)].map(Point2::from);
//!
//! let matrix = perspective_transform(&src, &dst)?;
//! assert!(matrix.to_css().starts_with("matrix3d("));
//! # Ok::<(), warpgrid_geometry::GeometryError>(())
//! ```

/// Convexity checks for destination quadrilaterals.
pub mod convexity;

/// Error types for the geometry module.
pub mod error;

/// Four-point homography estimation.
pub mod homography;

/// Points and displacements in the plane.
pub mod point;

/// 4x4 column-major render matrices.
pub mod render;

mod transform;

/// Four corners listed in a consistent winding order.
pub type Quad = [point::Point2; 4];

pub use crate::convexity::{check_convex, corner_turns, is_convex};
pub use crate::error::GeometryError;
pub use crate::homography::{homography_4pt, Homography, HomographyEstimator};
pub use crate::point::{Displacement, Point2};
pub use crate::render::RenderMatrix;
pub use crate::transform::{perspective_transform, perspective_transform_with};

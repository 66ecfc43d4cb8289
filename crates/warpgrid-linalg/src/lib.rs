#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Every [`Matrix`] carries a [`Tolerance`]: entries whose magnitude falls below it are
//! stored as exactly zero, and the factorizations use it to decide singularity.
//!
//! ```
//! use warpgrid_linalg::{ops, Matrix};
//!
//! let a = Matrix::from_rows(&[[2.0, 1.0], [1.0, 3.0]])?;
//! let b = Matrix::from_rows(&[[3.0], [5.0]])?;
//! let x = a.solve(&b)?;
//! assert!(ops::sub(&ops::matmul(&a, &x)?, &b)?.max_abs() < 1e-12);
//! # Ok::<(), warpgrid_linalg::LinalgError>(())
//! ```

/// Error types for the linear algebra routines.
pub mod error;

/// Pivoted LU factorization.
pub mod lu;

/// Dense matrix type.
pub mod matrix;

pub mod ops;

/// Householder QR factorization for least-squares solves.
pub mod qr;

/// Zero-snapping tolerance.
pub mod tolerance;

pub use crate::error::LinalgError;
pub use crate::lu::LuDecomposition;
pub use crate::matrix::{Matrix, MatrixDisplay, Shape};
pub use crate::qr::QrDecomposition;
pub use crate::tolerance::{Tolerance, DEFAULT_EPS};

use crate::Shape;

/// Errors raised by matrix construction, arithmetic and the factorizations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// The operands of a binary operation have incompatible shapes.
    #[error("{op}: dimension mismatch, expected {expected} but got {actual}")]
    DimensionMismatch {
        /// Name of the failing operation.
        op: &'static str,
        /// Shape the operation required.
        expected: Shape,
        /// Shape it was given.
        actual: Shape,
    },

    /// The operation requires a square matrix.
    #[error("matrix must be square, got {0}")]
    NotSquare(Shape),

    /// A pivot of the LU factorization fell below the tolerance.
    #[error("matrix is singular")]
    Singular,

    /// A submatrix request reaches outside the source matrix.
    #[error("{op}: block of {block} at ({row}, {col}) is out of range for a {shape} matrix")]
    IndexOutOfRange {
        /// Name of the failing operation.
        op: &'static str,
        /// First row of the requested block.
        row: usize,
        /// First column of the requested block.
        col: usize,
        /// Size of the requested block.
        block: Shape,
        /// Shape of the source matrix.
        shape: Shape,
    },

    /// A matrix needs at least one row and one column.
    #[error("matrix must have at least one row and one column")]
    EmptyMatrix,

    /// The system has fewer equations than unknowns.
    #[error("system is underdetermined, coefficient matrix is {0}")]
    Underdetermined(Shape),

    /// The least-squares system does not have full column rank.
    #[error("matrix is rank deficient")]
    RankDeficient,

    /// The operation requires an m x 1 matrix.
    #[error("expected a column vector, got {0}")]
    NotColumnVector(Shape),
}

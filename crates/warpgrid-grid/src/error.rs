use warpgrid_geometry::GeometryError;

/// Errors raised while laying out or animating a warped grid.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Element width or height is not a finite positive number.
    #[error("element size must be finite and positive, got {width}x{height}")]
    InvalidElementSize {
        /// Requested element width.
        width: f64,
        /// Requested element height.
        height: f64,
    },

    /// Container width is not a finite positive number.
    #[error("container width must be finite and positive, got {0}")]
    InvalidContainerWidth(f64),

    /// The container is so much wider than an element, or there are so many items, that
    /// the lattice cannot be allocated.
    #[error(
        "lattice for {item_count} items of width {element_width} in a container of width \
         {container_width} is too large"
    )]
    LatticeTooLarge {
        /// Requested container width.
        container_width: f64,
        /// Requested element width.
        element_width: f64,
        /// Requested number of items.
        item_count: usize,
    },

    /// Item index past the end of the grid.
    #[error("item index {index} out of range for {len} items")]
    ItemOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of items.
        len: usize,
    },

    /// Lattice point index past the end of the grid.
    #[error("point index {index} out of range for {len} points")]
    PointOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of lattice points.
        len: usize,
    },

    /// The perspective transform of an item could not be computed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

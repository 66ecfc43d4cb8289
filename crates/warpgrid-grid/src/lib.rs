#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Repulsion settings.
pub mod config;

/// Error types for the grid.
pub mod error;

mod grid;

/// Lattice points and grid items.
pub mod item;

/// Grid layout arithmetic.
pub mod layout;

pub use crate::config::{GridConfig, WarpMode};
pub use crate::error::GridError;
pub use crate::grid::WarpedGrid;
pub use crate::item::{GridPoint, WarpedItem};
pub use crate::layout::GridLayout;

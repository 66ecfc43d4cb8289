#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use warpgrid_linalg as linalg;

#[doc(inline)]
pub use warpgrid_geometry as geometry;

#[doc(inline)]
pub use warpgrid_grid as grid;

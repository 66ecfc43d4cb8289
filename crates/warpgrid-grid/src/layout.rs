use warpgrid_geometry::Point2;

use crate::{error::GridError, item::GridPoint};

/// Dimensions of the container and its equally sized items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Width of the container the items flow in.
    pub container_width: f64,
    /// Width of a single item.
    pub element_width: f64,
    /// Height of a single item.
    pub element_height: f64,
    /// Number of items.
    pub item_count: usize,
}

impl GridLayout {
    /// Create a new layout description.
    pub fn new(
        container_width: f64,
        element_width: f64,
        element_height: f64,
        item_count: usize,
    ) -> Self {
        Self {
            container_width,
            element_width,
            element_height,
            item_count,
        }
    }

    /// Check that every dimension is finite and positive and that the lattice fits in memory.
    pub fn validate(&self) -> Result<(), GridError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.element_width) || !valid(self.element_height) {
            return Err(GridError::InvalidElementSize {
                width: self.element_width,
                height: self.element_height,
            });
        }
        if !valid(self.container_width) {
            return Err(GridError::InvalidContainerWidth(self.container_width));
        }

        let fits = self
            .lattice_len()
            .and_then(|n| n.checked_mul(std::mem::size_of::<GridPoint>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !fits {
            return Err(GridError::LatticeTooLarge {
                container_width: self.container_width,
                element_width: self.element_width,
                item_count: self.item_count,
            });
        }
        Ok(())
    }

    /// Items per row. A partially visible trailing column still counts, and a row always
    /// holds at least one item.
    pub fn elements_per_row(&self) -> usize {
        (self.container_width / self.element_width).ceil().max(1.0) as usize
    }

    /// Number of lattice points, or `None` if it does not fit in a `usize`.
    pub fn lattice_len(&self) -> Option<usize> {
        let ratio = (self.container_width / self.element_width).ceil().max(1.0);
        // NaN fails the comparison too
        if !(ratio < usize::MAX as f64) {
            return None;
        }
        let per_row = ratio as usize;
        let full = (self.item_count / per_row)
            .checked_add(1)?
            .checked_mul(per_row.checked_add(1)?)?;
        match self.item_count % per_row {
            0 => Some(full),
            remainder => full.checked_add(remainder + 1),
        }
    }

    /// Number of completely filled rows.
    pub fn full_rows(&self) -> usize {
        self.item_count / self.elements_per_row()
    }

    /// Number of items in the trailing partial row.
    pub fn remainder(&self) -> usize {
        self.item_count % self.elements_per_row()
    }

    /// Rest positions of the lattice points, row by row.
    ///
    /// Rows `0..=full_rows` hold `elements_per_row + 1` points. When the last row is partial
    /// one more row of `remainder + 1` points closes it.
    pub fn lattice_points(&self) -> Vec<Point2> {
        let per_row = self.elements_per_row();
        let full_rows = self.full_rows();
        let remainder = self.remainder();

        let mut points = Vec::with_capacity(self.lattice_len().unwrap_or(0));
        for row in 0..=full_rows + 1 {
            let cols = if row <= full_rows {
                per_row + 1
            } else if remainder > 0 {
                remainder + 1
            } else {
                break;
            };
            let y = row as f64 * self.element_height;
            points.extend((0..cols).map(|col| Point2::new(col as f64 * self.element_width, y)));
        }
        points
    }

    /// Lattice indices of an item's corners as `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn corner_indices(&self, item: usize) -> [usize; 4] {
        let per_row = self.elements_per_row();
        let (row, col) = (item / per_row, item % per_row);
        let top_left = row * (per_row + 1) + col;
        let bottom_left = (row + 1) * (per_row + 1) + col;
        [top_left, top_left + 1, bottom_left + 1, bottom_left]
    }
}

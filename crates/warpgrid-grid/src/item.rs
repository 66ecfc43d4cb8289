use warpgrid_geometry::{perspective_transform_with, GeometryError, Point2, Quad, RenderMatrix};
use warpgrid_linalg::Tolerance;

/// A lattice point shared by up to four neighbouring items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// Current position.
    pub position: Point2,
    /// Rest position the point relaxes back to.
    pub origin: Point2,
}

impl GridPoint {
    /// A point at rest at `origin`.
    pub fn new(origin: Point2) -> Self {
        Self {
            position: origin,
            origin,
        }
    }

    /// Whether the point sits exactly at its rest position.
    pub fn is_at_rest(&self) -> bool {
        self.position == self.origin
    }

    /// Offset of the current position from the rest position.
    pub fn offset(&self) -> Point2 {
        self.position - self.origin
    }
}

/// One rectangular element of the grid, warped by the lattice points at its corners.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpedItem {
    index: usize,
    corners: [usize; 4],
    width: f64,
    height: f64,
    rest: Quad,
    center: Point2,
}

impl WarpedItem {
    /// `corners` indexes the lattice as `[top_left, top_right, bottom_right, bottom_left]`
    /// and `points` must be at rest.
    pub(crate) fn new(
        index: usize,
        corners: [usize; 4],
        width: f64,
        height: f64,
        points: &[GridPoint],
    ) -> Self {
        let rest = corners.map(|c| points[c].origin);
        let center = rest[0] + Point2::new(width * 0.5, height * 0.5);
        Self {
            index,
            corners,
            width,
            height,
            rest,
            center,
        }
    }

    /// Position of the item in the grid.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Lattice indices of the corners as `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn corner_indices(&self) -> [usize; 4] {
        self.corners
    }

    /// Width and height of the element.
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Centre of the element at rest, used as the pointer position in rollover mode.
    pub fn center(&self) -> Point2 {
        self.center
    }

    /// Rest position of the top-left corner in container coordinates.
    pub fn rest_offset(&self) -> Point2 {
        self.rest[0]
    }

    /// The element's own rectangle, `{(0,0), (w,0), (w,h), (0,h)}`.
    pub fn source_quad(&self) -> Quad {
        let (w, h) = (self.width, self.height);
        [
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ]
    }

    /// Current corners relative to the element's rest top-left corner.
    pub(crate) fn destination_quad(&self, points: &[GridPoint]) -> Quad {
        let offset = self.rest_offset();
        self.corners.map(|c| points[c].position - offset)
    }

    /// Whether any corner left its rest position.
    pub(crate) fn has_moved(&self, points: &[GridPoint]) -> bool {
        self.corners
            .iter()
            .zip(self.rest.iter())
            .any(|(&c, rest)| points[c].position != *rest)
    }

    /// Render matrix for the current corners, or `None` if no corner has moved.
    pub(crate) fn transform(
        &self,
        points: &[GridPoint],
        tol: Tolerance,
    ) -> Result<Option<RenderMatrix>, GeometryError> {
        if !self.has_moved(points) {
            return Ok(None);
        }
        let dst = self.destination_quad(points);
        perspective_transform_with(&self.source_quad(), &dst, tol).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice() -> Vec<GridPoint> {
        [(100.0, 50.0), (200.0, 50.0), (200.0, 100.0), (100.0, 100.0)]
            .map(|p| GridPoint::new(Point2::from(p)))
            .to_vec()
    }

    #[test]
    fn geometry_at_rest() {
        let points = lattice();
        let item = WarpedItem::new(3, [0, 1, 2, 3], 100.0, 50.0, &points);

        assert_eq!(item.center(), Point2::new(150.0, 75.0));
        assert_eq!(item.rest_offset(), Point2::new(100.0, 50.0));
        assert_eq!(item.source_quad(), item.destination_quad(&points));
        assert!(!item.has_moved(&points));
        assert_eq!(item.transform(&points, Tolerance::default()), Ok(None));
    }

    #[test]
    fn moved_corner_produces_transform() -> Result<(), GeometryError> {
        let mut points = lattice();
        let item = WarpedItem::new(0, [0, 1, 2, 3], 100.0, 50.0, &points);
        points[2].position = Point2::new(210.0, 110.0);

        assert!(item.has_moved(&points));
        assert_eq!(item.destination_quad(&points)[2], Point2::new(110.0, 60.0));

        let matrix = item
            .transform(&points, Tolerance::default())?
            .expect("moved item has a transform");
        let corner = matrix.transform_point(Point2::new(100.0, 50.0));
        assert!((corner.x - 110.0).abs() < 1e-6 && (corner.y - 60.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn crossed_corners_fail() {
        let mut points = lattice();
        let item = WarpedItem::new(0, [0, 1, 2, 3], 100.0, 50.0, &points);
        // swap the right-hand corners so the outline crosses itself
        points[1].position = Point2::new(200.0, 100.0);
        points[2].position = Point2::new(200.0, 50.0);
        assert_eq!(
            item.transform(&points, Tolerance::default()),
            Err(GeometryError::NonConvexDestination)
        );
    }
}

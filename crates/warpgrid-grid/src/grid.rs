use rayon::prelude::*;
use warpgrid_geometry::{Point2, Quad, RenderMatrix};
use warpgrid_linalg::Tolerance;

use crate::{
    config::{GridConfig, WarpMode},
    error::GridError,
    item::{GridPoint, WarpedItem},
    layout::GridLayout,
};

/// A grid of equally sized items whose shared corners are pushed away by a pointer.
///
/// Neighbouring items share lattice points, so the warped items always tile without gaps.
/// The grid only does the bookkeeping: the caller feeds pointer events, calls
/// [`WarpedGrid::step`] once per animation frame and applies the matrices returned by
/// [`WarpedGrid::render_frame`].
///
/// # Example
///
/// ```
/// use warpgrid_grid::{GridConfig, GridLayout, WarpedGrid};
///
/// let layout = GridLayout::new(300.0, 100.0, 100.0, 6);
/// let mut grid = WarpedGrid::new(layout, GridConfig::default())?;
///
/// grid.hover_item(4)?;
/// grid.step();
///
/// let frame = grid.render_frame();
/// assert!(frame[4].as_ref().is_ok_and(|m| m.is_some()));
/// # Ok::<(), warpgrid_grid::GridError>(())
/// ```
#[derive(Debug, Clone)]
pub struct WarpedGrid {
    layout: GridLayout,
    config: GridConfig,
    tol: Tolerance,
    points: Vec<GridPoint>,
    items: Vec<WarpedItem>,
    pointer: Option<Point2>,
    hovered: Option<usize>,
    active: bool,
}

impl WarpedGrid {
    /// Lay out a new grid with every point at rest.
    ///
    /// # Errors
    ///
    /// Fails if the layout has a non-positive or non-finite dimension, or describes a
    /// lattice too large to allocate.
    pub fn new(layout: GridLayout, config: GridConfig) -> Result<Self, GridError> {
        let mut grid = Self {
            layout,
            config,
            tol: Tolerance::default(),
            points: Vec::new(),
            items: Vec::new(),
            pointer: None,
            hovered: None,
            active: true,
        };
        grid.relayout(layout)?;
        Ok(grid)
    }

    /// Use `tol` for the homography estimation of every item.
    pub fn with_tolerance(mut self, tol: Tolerance) -> Self {
        self.tol = tol;
        self
    }

    /// The current layout.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// The repulsion settings.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The lattice points.
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// The items in layout order.
    pub fn items(&self) -> &[WarpedItem] {
        &self.items
    }

    /// The item at `index`.
    pub fn item(&self, index: usize) -> Result<&WarpedItem, GridError> {
        self.items.get(index).ok_or(GridError::ItemOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    /// Whether [`WarpedGrid::step`] moves points.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Freeze or resume the animation. Point positions are kept while frozen.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// The pointer position the points are pushed away from, if any.
    pub fn pointer(&self) -> Option<Point2> {
        self.pointer
    }

    /// The item whose corners react in [`WarpMode::Rollover`], if any.
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Rebuild the lattice for a new layout. Every point returns to rest and the hovered
    /// item is cleared.
    pub fn relayout(&mut self, layout: GridLayout) -> Result<(), GridError> {
        layout.validate()?;

        let points: Vec<GridPoint> = layout
            .lattice_points()
            .into_iter()
            .map(GridPoint::new)
            .collect();
        let items = (0..layout.item_count)
            .map(|i| {
                WarpedItem::new(
                    i,
                    layout.corner_indices(i),
                    layout.element_width,
                    layout.element_height,
                    &points,
                )
            })
            .collect();

        log::debug!(
            "grid layout: {} items, {} per row, {} lattice points",
            layout.item_count,
            layout.elements_per_row(),
            points.len()
        );

        self.layout = layout;
        self.points = points;
        self.items = items;
        self.hovered = None;
        Ok(())
    }

    /// Rebuild the lattice for a new container width.
    pub fn resize(&mut self, container_width: f64) -> Result<(), GridError> {
        let layout = GridLayout {
            container_width,
            ..self.layout
        };
        self.relayout(layout)
    }

    /// Record a pointer position in container coordinates.
    ///
    /// Only used in [`WarpMode::PointerMove`]; in rollover mode the pointer is derived from
    /// the hovered item.
    pub fn pointer_moved(&mut self, pointer: Point2) {
        if self.config.mode == WarpMode::PointerMove {
            self.pointer = Some(pointer);
        }
    }

    /// Mark the item at `index` as hovered.
    ///
    /// In [`WarpMode::Rollover`] its four corners start reacting to a pointer fixed at the
    /// item's centre. Has no effect in [`WarpMode::PointerMove`].
    pub fn hover_item(&mut self, index: usize) -> Result<(), GridError> {
        let center = self.item(index)?.center();
        if self.config.mode == WarpMode::Rollover {
            self.hovered = Some(index);
            self.pointer = Some(center);
        }
        Ok(())
    }

    /// Move a lattice point directly, for example from an external tween.
    pub fn move_point(&mut self, index: usize, position: Point2) -> Result<(), GridError> {
        let len = self.points.len();
        let point = self
            .points
            .get_mut(index)
            .ok_or(GridError::PointOutOfRange { index, len })?;
        point.position = position;
        Ok(())
    }

    /// Advance the repulsion by one frame.
    ///
    /// Every reacting point `p` becomes
    /// `p - (d / |d|) * (range / |d|) * speed * multiplier - (p - origin) / 2`
    /// with `d = pointer - p`. A point exactly under the pointer only relaxes.
    ///
    /// Does nothing while inactive or before a pointer is known.
    pub fn step(&mut self) {
        if !self.active {
            return;
        }
        let Some(pointer) = self.pointer else {
            return;
        };

        let range = self.config.range(self.layout.element_width);
        let strength = self.config.speed * self.config.speed_multiplier;
        let repel = |point: &mut GridPoint| {
            let d = pointer.displacement_from(&point.position);
            let relax = point.offset() * 0.5;
            let push = if d.distance > 0.0 {
                let scale = (range / d.distance) * strength / d.distance;
                Point2::new(d.dx * scale, d.dy * scale)
            } else {
                Point2::ORIGIN
            };
            point.position = point.position - push - relax;
        };

        match self.config.mode {
            WarpMode::PointerMove => self.points.iter_mut().for_each(repel),
            WarpMode::Rollover => {
                let Some(item) = self.hovered.and_then(|i| self.items.get(i)) else {
                    return;
                };
                for c in item.corner_indices() {
                    if let Some(point) = self.points.get_mut(c) {
                        repel(point);
                    }
                }
            }
        }
    }

    /// Current destination corners of an item, relative to its rest top-left corner.
    pub fn destination_quad(&self, index: usize) -> Result<Quad, GridError> {
        Ok(self.item(index)?.destination_quad(&self.points))
    }

    /// Render matrix of a single item, or `None` if none of its corners moved.
    pub fn render_item(&self, index: usize) -> Result<Option<RenderMatrix>, GridError> {
        let item = self.item(index)?;
        Ok(item.transform(&self.points, self.tol)?)
    }

    /// Render matrices of every item, computed in parallel.
    ///
    /// Slot `i` holds the result for item `i`. A failed item does not affect the others and
    /// the caller should keep its previous transform.
    pub fn render_frame(&self) -> Vec<Result<Option<RenderMatrix>, GridError>> {
        self.items
            .par_iter()
            .map(|item| {
                item.transform(&self.points, self.tol).map_err(|err| {
                    log::warn!("skipping item {}: {err}", item.index());
                    GridError::from(err)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use warpgrid_geometry::GeometryError;

    fn grid(mode: WarpMode) -> Result<WarpedGrid, GridError> {
        let config = GridConfig {
            mode,
            ..Default::default()
        };
        WarpedGrid::new(GridLayout::new(300.0, 100.0, 50.0, 7), config)
    }

    #[test]
    fn new_grid_is_at_rest() -> Result<(), GridError> {
        let grid = grid(WarpMode::Rollover)?;
        assert_eq!(grid.points().len(), 14);
        assert_eq!(grid.items().len(), 7);
        assert!(grid.points().iter().all(GridPoint::is_at_rest));
        assert!(grid.render_frame().iter().all(|r| matches!(r, Ok(None))));
        assert_eq!(grid.item(6)?.rest_offset(), Point2::new(0.0, 100.0));
        Ok(())
    }

    #[test]
    fn rollover_pushes_hovered_corners() -> Result<(), GridError> {
        let mut grid = grid(WarpMode::Rollover)?;
        // nothing hovered yet
        grid.step();
        assert!(grid.points().iter().all(GridPoint::is_at_rest));

        grid.hover_item(0)?;
        assert_eq!(grid.pointer(), Some(Point2::new(50.0, 25.0)));
        grid.step();

        // range 50 at distance^2 3125 scales the offset to the centre by 0.8
        let expected = [(-40.0, -20.0), (140.0, -20.0), (140.0, 70.0), (-40.0, 70.0)];
        for (c, (x, y)) in grid.item(0)?.corner_indices().into_iter().zip(expected) {
            let p = grid.points()[c].position;
            assert_relative_eq!(p.x, x, epsilon = 1e-9);
            assert_relative_eq!(p.y, y, epsilon = 1e-9);
        }
        // only the hovered item's corners moved
        let moved = grid.points().iter().filter(|p| !p.is_at_rest()).count();
        assert_eq!(moved, 4);

        let frame = grid.render_frame();
        let matrix = frame[0].clone()?.expect("hovered item is warped");
        let tl = matrix.transform_point(Point2::ORIGIN);
        assert_relative_eq!(tl.x, -40.0, epsilon = 1e-6);
        assert_relative_eq!(tl.y, -20.0, epsilon = 1e-6);

        // the right-hand neighbour shares two corners, the item below shares two more
        assert!(matches!(frame[1], Ok(Some(_))));
        assert!(matches!(frame[3], Ok(Some(_))));
        assert!(matches!(frame[2], Ok(None)));
        Ok(())
    }

    #[test]
    fn relaxation_pulls_back_towards_origin() -> Result<(), GridError> {
        let mut grid = grid(WarpMode::Rollover)?;
        grid.hover_item(0)?;
        grid.step();
        grid.step();

        // d = (90, 45), |d|^2 = 10125, push = d * 2500 / 10125, relax = (-20, -10)
        let p = grid.points()[0].position;
        assert_relative_eq!(p.x, -40.0 - 90.0 * 2500.0 / 10125.0 + 20.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, -20.0 - 45.0 * 2500.0 / 10125.0 + 10.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn pointer_move_pushes_every_point() -> Result<(), GridError> {
        let mut grid = grid(WarpMode::PointerMove)?;
        grid.step();
        assert!(grid.points().iter().all(GridPoint::is_at_rest));

        // a lattice point sits exactly under the pointer
        grid.pointer_moved(Point2::new(100.0, 50.0));
        grid.step();

        let under = grid.points()[5];
        assert!(under.is_at_rest());
        assert!(grid
            .points()
            .iter()
            .enumerate()
            .all(|(i, p)| i == 5 || !p.is_at_rest()));

        // hovering is ignored in this mode
        grid.hover_item(2)?;
        assert_eq!(grid.hovered(), None);
        Ok(())
    }

    #[test]
    fn inactive_grid_is_frozen() -> Result<(), GridError> {
        let mut grid = grid(WarpMode::Rollover)?;
        grid.hover_item(3)?;
        grid.set_active(false);
        grid.step();
        assert!(!grid.is_active());
        assert!(grid.points().iter().all(GridPoint::is_at_rest));

        grid.set_active(true);
        grid.step();
        assert!(grid.points().iter().any(|p| !p.is_at_rest()));
        Ok(())
    }

    #[test]
    fn failed_item_does_not_affect_others() -> Result<(), GridError> {
        let mut grid = grid(WarpMode::Rollover)?;
        // pull the top-right corner of item 0 inwards far enough to make it reflex
        let tr = grid.item(0)?.corner_indices()[1];
        grid.move_point(tr, Point2::new(50.0, 40.0))?;

        let frame = grid.render_frame();
        assert!(matches!(frame[0], Err(GridError::Geometry(_))));
        assert!(matches!(frame[1], Ok(Some(_))));
        assert!(matches!(frame[4], Ok(None)));

        let err = grid.render_item(0).unwrap_err();
        assert!(matches!(err, GridError::Geometry(g) if g.is_degenerate()));
        Ok(())
    }

    #[test]
    fn resize_rebuilds_lattice() -> Result<(), GridError> {
        let mut grid = grid(WarpMode::Rollover)?;
        grid.hover_item(0)?;
        grid.step();

        grid.resize(200.0)?;
        assert_eq!(grid.layout().elements_per_row(), 2);
        assert_eq!(grid.hovered(), None);
        // 3 full rows of 2, one partial row of 1
        assert_eq!(grid.points().len(), 4 * 3 + 2);
        assert!(grid.points().iter().all(GridPoint::is_at_rest));

        assert_eq!(grid.resize(0.0), Err(GridError::InvalidContainerWidth(0.0)));
        Ok(())
    }

    #[test]
    fn oversized_layout_fails_without_panicking() -> Result<(), GridError> {
        let layout = GridLayout::new(1e20, 1.0, 1.0, 1);
        assert!(matches!(
            WarpedGrid::new(layout, GridConfig::default()),
            Err(GridError::LatticeTooLarge { .. })
        ));

        // a rejected resize leaves the current lattice in place
        let mut grid = grid(WarpMode::Rollover)?;
        assert!(matches!(
            grid.resize(1e20),
            Err(GridError::LatticeTooLarge { .. })
        ));
        assert_eq!(grid.layout().container_width, 300.0);
        assert_eq!(grid.points().len(), 14);
        Ok(())
    }

    #[test]
    fn out_of_range() -> Result<(), GridError> {
        let mut grid = grid(WarpMode::Rollover)?;
        assert_eq!(
            grid.hover_item(7),
            Err(GridError::ItemOutOfRange { index: 7, len: 7 })
        );
        assert_eq!(
            grid.move_point(14, Point2::ORIGIN),
            Err(GridError::PointOutOfRange { index: 14, len: 14 })
        );
        assert!(grid.render_item(9).is_err());
        Ok(())
    }

    #[test]
    fn errors_convert() {
        let err = GridError::from(GeometryError::NonFinite);
        assert_eq!(err.to_string(), "corner coordinates must be finite");
    }
}

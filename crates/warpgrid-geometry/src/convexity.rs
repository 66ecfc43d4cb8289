use warpgrid_linalg::Tolerance;

use crate::{error::GeometryError, point::Point2, Quad};

/// Signed turn at every corner of the quadrilateral.
///
/// Entry `i` is the cross product of the edge arriving at corner `i` with the edge leaving
/// it, so its sign tells whether the outline turns left or right there.
pub fn corner_turns(quad: &Quad) -> [f64; 4] {
    std::array::from_fn(|i| {
        let prev = quad[(i + 3) % 4];
        let next = quad[(i + 1) % 4];
        let incoming = quad[i] - prev;
        let outgoing = next - quad[i];
        incoming.cross(&outgoing)
    })
}

/// Whether the quadrilateral turns the same way at every corner.
///
/// The turn at the first corner sets the reference direction; the quadrilateral is rejected
/// as soon as another corner turns the opposite way. Zero turns never cause a rejection, so
/// use [`check_convex`] to also reject collinear corners.
///
/// Works for both windings.
///
/// ```
/// use warpgrid_geometry::{is_convex, Point2};
///
/// let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)].map(Point2::from);
/// assert!(is_convex(&square));
///
/// let dart = [(0.0, 0.0), (1.0, 0.0), (0.25, 0.25), (0.0, 1.0)].map(Point2::from);
/// assert!(!is_convex(&dart));
/// ```
pub fn is_convex(quad: &Quad) -> bool {
    let turns = corner_turns(quad);
    let reference = turns[0];
    turns[1..].iter().all(|&turn| turn * reference >= 0.0)
}

/// Validate that `quad` is a proper convex quadrilateral.
///
/// # Errors
///
/// * [`GeometryError::NonFinite`] if a coordinate is NaN or infinite.
/// * [`GeometryError::NonConvexDestination`] if [`is_convex`] is false.
/// * [`GeometryError::CollinearDestination`] if the outline does not turn at some corner,
///   i.e. the sine of the turning angle is below the tolerance, or two consecutive corners
///   coincide.
pub fn check_convex(quad: &Quad, tol: Tolerance) -> Result<(), GeometryError> {
    if !quad.iter().all(Point2::is_finite) {
        return Err(GeometryError::NonFinite);
    }

    if !is_convex(quad) {
        log::debug!("rejecting reflex quadrilateral {quad:?}");
        return Err(GeometryError::NonConvexDestination);
    }

    for (vertex, turn) in corner_turns(quad).into_iter().enumerate() {
        let incoming = quad[vertex] - quad[(vertex + 3) % 4];
        let outgoing = quad[(vertex + 1) % 4] - quad[vertex];
        let scale = incoming.norm() * outgoing.norm();
        if scale == 0.0 || tol.is_zero(turn / scale) {
            log::debug!("rejecting quadrilateral degenerate at vertex {vertex}: {quad:?}");
            return Err(GeometryError::CollinearDestination { vertex });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(points: [(f64, f64); 4]) -> Quad {
        points.map(Point2::from)
    }

    #[test]
    fn square_is_convex_in_both_windings() -> Result<(), GeometryError> {
        let ccw = quad([(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        let cw = quad([(0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0)]);
        assert!(is_convex(&ccw));
        assert!(is_convex(&cw));
        check_convex(&ccw, Tolerance::default())?;
        check_convex(&cw, Tolerance::default())?;
        assert!(corner_turns(&ccw).iter().all(|&t| t > 0.0));
        assert!(corner_turns(&cw).iter().all(|&t| t < 0.0));
        Ok(())
    }

    #[test]
    fn reflex_vertex_is_rejected() {
        // the third corner lies inside the triangle formed by the other three
        let dart = quad([(0.0, 0.0), (100.0, 0.0), (30.0, 30.0), (0.0, 100.0)]);
        assert!(!is_convex(&dart));
        assert_eq!(
            check_convex(&dart, Tolerance::default()),
            Err(GeometryError::NonConvexDestination)
        );
    }

    #[test]
    fn self_intersecting_is_rejected() {
        let bowtie = quad([(0.0, 0.0), (100.0, 100.0), (100.0, 0.0), (0.0, 100.0)]);
        assert!(!is_convex(&bowtie));
    }

    #[test]
    fn collinear_corner_is_rejected() {
        // the first corner sits on the segment between its neighbours
        let flat = quad([(50.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 0.0)]);
        assert!(is_convex(&flat));
        assert_eq!(
            check_convex(&flat, Tolerance::default()),
            Err(GeometryError::CollinearDestination { vertex: 0 })
        );
    }

    #[test]
    fn repeated_corner_is_rejected() {
        let pinched = quad([(0.0, 0.0), (100.0, 0.0), (100.0, 0.0), (0.0, 100.0)]);
        assert!(matches!(
            check_convex(&pinched, Tolerance::default()),
            Err(GeometryError::CollinearDestination { .. })
        ));
    }

    #[test]
    fn non_finite_is_rejected() {
        let bad = quad([(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert_eq!(
            check_convex(&bad, Tolerance::default()),
            Err(GeometryError::NonFinite)
        );
    }
}

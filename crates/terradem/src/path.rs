//! Polyline densification: evenly spaced coordinates along a path.

use crate::geo::Coordinate;
use crate::{DemError, Result};

const ARCSECONDS_PER_DEGREE: f64 = 3600.0;

/// Generate interpolated coordinates along a path at a fixed interval.
///
/// For every consecutive pair of points the segment is split into
/// `floor(distance / interval)` steps and each step endpoint is emitted,
/// including both segment ends. Distance is planar Euclidean in coordinate
/// degrees; the interval is given in arcseconds. Interior vertices are shared
/// by two segments and therefore appear twice, matching the per-segment
/// emission order.
///
/// A segment shorter than one interval (including coincident points) emits
/// just its start point.
///
/// Fails with `InsufficientPoints` when fewer than two points are given.
pub fn coordinates_along_path(
    points: &[Coordinate],
    interval_arcseconds: f64,
) -> Result<Vec<Coordinate>> {
    if points.len() < 2 {
        return Err(DemError::InsufficientPoints {
            found: points.len(),
        });
    }

    let step_degrees = interval_arcseconds / ARCSECONDS_PER_DEGREE;
    let mut path = Vec::new();

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let d_lat = b.latitude() - a.latitude();
        let d_lon = b.longitude() - a.longitude();
        let distance = (d_lat * d_lat + d_lon * d_lon).sqrt();

        // Cancellation in the coordinate deltas can leave a segment that is
        // exactly N intervals long a hair under N; nudge before flooring.
        let steps = (distance / step_degrees + 1e-9).floor();
        if !steps.is_finite() || steps < 1.0 {
            // Degenerate segment: too short for one interval, or a
            // non-positive interval. Emit the start point alone.
            path.push(a);
            continue;
        }

        let steps = steps as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            // Interpolants between two in-range coordinates stay in range.
            path.push(Coordinate::new_unchecked(
                a.latitude() + t * d_lat,
                a.longitude() + t * d_lon,
            ));
        }
    }

    Ok(path)
}

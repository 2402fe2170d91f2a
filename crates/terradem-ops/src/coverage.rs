//! Bounding-box coverage scan over a raster catalog.

use std::path::{Path, PathBuf};

use tracing::warn;

use terradem_raster::Raster;

/// Return the subset of `paths` whose raster footprint intersects the query
/// box, given by its top-left and bottom-right corners in the rasters'
/// coordinate space.
///
/// The overlap test is inclusive on all four edges: rasters that merely touch
/// the box are reported. Files that cannot be opened are skipped with a log
/// line; a coverage scan over a large, partially broken catalog is
/// best-effort by design and never fails as a whole.
pub fn coverage<P: AsRef<Path>>(
    paths: &[P],
    top_left_x: f64,
    top_left_y: f64,
    bottom_right_x: f64,
    bottom_right_y: f64,
) -> Vec<PathBuf> {
    let query_x_lo = top_left_x.min(bottom_right_x);
    let query_x_hi = top_left_x.max(bottom_right_x);
    let query_y_lo = top_left_y.min(bottom_right_y);
    let query_y_hi = top_left_y.max(bottom_right_y);

    let mut covered = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let raster = match Raster::open(path) {
            Ok(raster) => raster,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable raster");
                continue;
            }
        };

        let t = raster.transform();
        let (far_x, far_y) = t.far_corner(raster.rows(), raster.columns());
        let x_lo = t.origin_x.min(far_x);
        let x_hi = t.origin_x.max(far_x);
        let y_lo = t.origin_y.min(far_y);
        let y_hi = t.origin_y.max(far_y);

        if x_lo <= query_x_hi && x_hi >= query_x_lo && y_lo <= query_y_hi && y_hi >= query_y_lo {
            covered.push(path.to_path_buf());
        }
    }

    covered
}

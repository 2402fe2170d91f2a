//! Pixel-window extraction from a bounding box.

use std::path::Path;

use tracing::debug;

use terradem_raster::{Raster, RasterSource};

use crate::{OpsError, Result};

/// Cut the pixel window covering a bounding box out of a raster and write it
/// as a new GeoTIFF at `destination`.
///
/// The box corners are given in the source's own coordinate space (degrees
/// for geographic rasters, projected units otherwise). Each window edge is
/// computed by truncating `(coordinate - origin) / pixel_size` toward zero,
/// then clamped independently into the source grid, so a box partially
/// outside the raster shrinks to the overlapping area. A box entirely outside
/// (or inverted) fails with `InvalidClipRegion`.
///
/// Only band 1 is copied; pixel sizes are unchanged and the output origin is
/// the window's top-left corner.
pub fn clip<P: AsRef<Path>>(
    source: RasterSource<'_>,
    destination: P,
    top_left_x: f64,
    top_left_y: f64,
    bottom_right_x: f64,
    bottom_right_y: f64,
) -> Result<()> {
    let raster = source.load()?;
    let t = raster.transform();

    let start_x = ((top_left_x - t.origin_x) / t.pixel_width).trunc() as i64;
    let end_x = ((bottom_right_x - t.origin_x) / t.pixel_width).trunc() as i64;
    let start_y = ((top_left_y - t.origin_y) / t.pixel_height).trunc() as i64;
    let end_y = ((bottom_right_y - t.origin_y) / t.pixel_height).trunc() as i64;

    let start_x = start_x.clamp(0, raster.columns() as i64);
    let end_x = end_x.clamp(0, raster.columns() as i64);
    let start_y = start_y.clamp(0, raster.rows() as i64);
    let end_y = end_y.clamp(0, raster.rows() as i64);

    let width = end_x - start_x;
    let height = end_y - start_y;
    if width <= 0 || height <= 0 {
        return Err(OpsError::InvalidClipRegion { width, height });
    }

    debug!(start_x, start_y, width, height, "clipping raster window");

    let mut output = Raster::new(
        height as usize,
        width as usize,
        1,
        raster.sample_type(),
        t.shifted(start_y, start_x),
    )?;
    output.set_nodata(raster.nodata());
    output.set_projection(raster.projection());

    for row in 0..height as usize {
        for col in 0..width as usize {
            let value = raster.sample(1, start_y as usize + row, start_x as usize + col)?;
            output.set_sample(1, row, col, value)?;
        }
    }

    output.write(destination)?;
    Ok(())
}

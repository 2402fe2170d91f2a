//! Extent-preserving grid resizing.

use std::path::Path;

use tracing::debug;

use terradem_raster::{resample_median, GeoTransform, RasterSource};

use crate::Result;

/// Resize a raster to `columns x rows` pixels and write the result as a new
/// GeoTIFF at `destination`.
///
/// The ground extent is preserved exactly: the output keeps the source origin
/// and scales each pixel size by `source_size / target_size` on its axis.
/// The per-pixel filter is the collaborator's median kernel
/// ([`terradem_raster::resample_median`]); this operation only computes the
/// target geotransform and delegates.
pub fn resample<P: AsRef<Path>>(
    source: RasterSource<'_>,
    destination: P,
    columns: usize,
    rows: usize,
) -> Result<()> {
    let raster = source.load()?;
    let t = raster.transform();

    let transform = GeoTransform {
        pixel_width: t.pixel_width * raster.columns() as f64 / columns as f64,
        pixel_height: t.pixel_height * raster.rows() as f64 / rows as f64,
        ..*t
    };

    debug!(
        src_rows = raster.rows(),
        src_columns = raster.columns(),
        rows,
        columns,
        "resampling raster"
    );

    let output = resample_median(&raster, rows, columns, transform)?;
    output.write(destination)?;
    Ok(())
}

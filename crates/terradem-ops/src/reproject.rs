//! Metadata-level reprojection to WGS84.

use std::path::Path;

use tracing::debug;

use terradem_raster::RasterSource;

use crate::Result;

/// Well-known text of the WGS84 geographic coordinate system (EPSG:4326).
pub const WGS84_WKT: &str = "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",\
SPHEROID[\"WGS 84\",6378137,298.257223563]],PRIMEM[\"Greenwich\",0],\
UNIT[\"degree\",0.0174532925199433],AUTHORITY[\"EPSG\",\"4326\"]]";

/// Copy a raster to `destination`, stamped with the WGS84 projection
/// descriptor and with its nodata remapped to `nodata`.
///
/// Dimensions, geotransform and samples are carried over unchanged except
/// that band-1 samples equal to the source's declared nodata become the new
/// value, which is also recorded as the output's declared nodata. No pixel
/// warping between coordinate systems takes place; this is a metadata-level
/// operation for sources whose grid is already geographic.
pub fn reproject<P: AsRef<Path>>(
    source: RasterSource<'_>,
    destination: P,
    nodata: i16,
) -> Result<()> {
    let raster = source.load()?;
    let mut output = raster.into_owned();

    if let Some(source_nodata) = output.nodata() {
        let band = output.band_mut(1)?;
        let mut remapped = 0usize;
        for value in band.iter_mut() {
            if *value == source_nodata {
                *value = nodata as f64;
                remapped += 1;
            }
        }
        debug!(remapped, "remapped nodata samples");
    }

    output.set_nodata(Some(nodata as f64));
    output.set_projection(WGS84_WKT);
    output.write(destination)?;
    Ok(())
}

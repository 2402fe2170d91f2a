//! Median-compositing merge of overlapping rasters.

use std::path::Path;

use rayon::prelude::*;
use tracing::debug;

use terradem::{GridGeometry, PixelIndex};
use terradem_raster::{
    GeoTransform, Raster, RasterSource, SampleType, DEFAULT_NODATA_FALLBACK,
};

use crate::{OpsError, Result};

/// Tie-break rule for the median of an even number of samples.
///
/// Both variants exist in the wild for this operation and downstream
/// consumers depend on each, so the choice is the caller's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedianPolicy {
    /// Average the two middle elements.
    Average,
    /// Take the lower of the two middle elements, no averaging.
    Floor,
}

impl MedianPolicy {
    /// Median of `values` under this policy. `None` for an empty set.
    fn resolve(self, values: &mut [f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        values.sort_unstable_by(f64::total_cmp);
        let n = values.len();
        if n % 2 == 1 {
            return Some(values[n / 2]);
        }
        match self {
            MedianPolicy::Average => Some((values[n / 2 - 1] + values[n / 2]) / 2.0),
            MedianPolicy::Floor => Some(values[n / 2 - 1]),
        }
    }
}

/// Composite N rasters into one GeoTIFF at `destination`.
///
/// The output footprint is the union bounding box of all inputs and the cell
/// size is the coarsest resolution found among them, so finer inputs are
/// downsampled rather than the merge failing. Every output cell takes the
/// median of the samples from all inputs whose grid contains its center (each
/// input contributes the cell the center falls in); a cell no input
/// covers falls back to the first input's nodata value. The output is always
/// a single band of 16-bit signed samples, with `nodata` stamped as its
/// declared nodata.
///
/// Rows are composited in parallel; each cell probes every input, which makes
/// input count the dominant cost factor for large mosaics.
pub fn merge<P: AsRef<Path>>(
    sources: &[RasterSource<'_>],
    destination: P,
    nodata: i16,
    policy: MedianPolicy,
) -> Result<()> {
    if sources.is_empty() {
        return Err(OpsError::EmptyInput);
    }

    let loaded = sources
        .iter()
        .map(|s| s.load())
        .collect::<terradem_raster::Result<Vec<_>>>()?;

    // Union bounding box over every input's origin and far corner.
    let mut x_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut cell_width: f64 = 0.0;
    let mut cell_height: f64 = 0.0;

    for raster in &loaded {
        let t = raster.transform();
        let (far_x, far_y) = t.far_corner(raster.rows(), raster.columns());
        x_min = x_min.min(t.origin_x);
        y_max = y_max.max(t.origin_y);
        x_max = x_max.max(far_x);
        y_min = y_min.min(far_y);
        cell_width = cell_width.max(t.pixel_width.abs());
        cell_height = cell_height.max(t.pixel_height.abs());
    }

    let columns = ((x_max - x_min) / cell_width).round() as usize;
    let rows = ((y_max - y_min) / cell_height).round() as usize;
    let transform = GeoTransform::north_up(x_min, y_max, cell_width, -cell_height);

    debug!(
        inputs = loaded.len(),
        rows, columns, cell_width, cell_height, "merging rasters"
    );

    let inputs: Vec<(GridGeometry, &Raster)> = loaded
        .iter()
        .map(|raster| {
            (
                GridGeometry::new(raster.transform(), raster.rows(), raster.columns()),
                raster.as_ref(),
            )
        })
        .collect();

    // A cell no input covers takes the first input's nodata, not the merge
    // parameter. Downstream consumers rely on this asymmetry.
    let uncovered = loaded[0].nodata_or(DEFAULT_NODATA_FALLBACK);

    let mut output = Raster::new(rows, columns, 1, SampleType::Int16, transform)?;
    output.set_nodata(Some(nodata as f64));
    output.set_projection(loaded[0].projection());

    output
        .band_mut(1)?
        .par_chunks_mut(columns)
        .enumerate()
        .for_each(|(i, out_row)| {
            let y = y_max - (i as f64 + 0.5) * cell_height;
            for (j, out) in out_row.iter_mut().enumerate() {
                let x = x_min + (j as f64 + 0.5) * cell_width;

                let mut samples = Vec::with_capacity(inputs.len());
                for (geometry, raster) in &inputs {
                    // Floor to the cell whose extent contains the center.
                    // Node-style rounding would shift aligned inputs by a
                    // pixel, since centers sit at exactly .5 fractions.
                    if let PixelIndex::Found { row, column } = geometry.to_pixel(y, x) {
                        let (row, column) = (row.floor() as usize, column.floor() as usize);
                        if let Ok(value) = raster.sample(1, row, column) {
                            samples.push(value);
                        }
                    }
                }

                *out = policy.resolve(&mut samples).unwrap_or(uncovered);
            }
        });

    output.write(destination)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_policy_odd() {
        assert_eq!(MedianPolicy::Average.resolve(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(MedianPolicy::Floor.resolve(&mut [3.0, 1.0, 2.0]), Some(2.0));
    }

    #[test]
    fn test_median_policy_even_tie_break() {
        assert_eq!(MedianPolicy::Average.resolve(&mut [10.0, 20.0]), Some(15.0));
        assert_eq!(MedianPolicy::Floor.resolve(&mut [10.0, 20.0]), Some(10.0));
        assert_eq!(
            MedianPolicy::Average.resolve(&mut [4.0, 2.0, 3.0, 1.0]),
            Some(2.5)
        );
        assert_eq!(
            MedianPolicy::Floor.resolve(&mut [4.0, 2.0, 3.0, 1.0]),
            Some(2.0)
        );
    }

    #[test]
    fn test_median_policy_single_element() {
        assert_eq!(MedianPolicy::Average.resolve(&mut [7.0]), Some(7.0));
        assert_eq!(MedianPolicy::Floor.resolve(&mut [7.0]), Some(7.0));
    }

    #[test]
    fn test_median_policy_empty() {
        assert_eq!(MedianPolicy::Average.resolve(&mut []), None);
        assert_eq!(MedianPolicy::Floor.resolve(&mut []), None);
    }

    #[test]
    fn test_merge_rejects_empty_input() {
        let err = merge(&[], "/tmp/never-written.tif", -9999, MedianPolicy::Average).unwrap_err();
        assert!(matches!(err, OpsError::EmptyInput));
    }
}

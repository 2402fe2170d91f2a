//! Median resampling kernel.
//!
//! Grid resizing itself is a geometry problem owned by the callers; this
//! module is the per-pixel filter they delegate to. Each output pixel takes
//! the median of the source window it covers, with declared-nodata samples
//! excluded from the ranking.

use rayon::prelude::*;
use tracing::debug;

use crate::{GeoTransform, Raster, Result, DEFAULT_NODATA_FALLBACK};

/// Median of a sample set, ranked ascending. Even counts average the two
/// middle elements. Empty input returns `None`.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        Some(values[n / 2])
    } else {
        Some((values[n / 2 - 1] + values[n / 2]) / 2.0)
    }
}

/// Resize band 1 of `source` to `rows x columns` under `transform`, filling
/// each output pixel with the median of the source pixels it covers.
///
/// Output rows are computed in parallel; each row writes only its own slice.
pub fn resample_median(
    source: &Raster,
    rows: usize,
    columns: usize,
    transform: GeoTransform,
) -> Result<Raster> {
    let src_band = source.band(1)?;
    let src_rows = source.rows();
    let src_columns = source.columns();
    let nodata = source.nodata();
    let fill = source.nodata_or(DEFAULT_NODATA_FALLBACK);

    let mut output = Raster::new(rows, columns, 1, source.sample_type(), transform)?;
    output.set_nodata(nodata);
    output.set_projection(source.projection());

    debug!(
        src_rows,
        src_columns, rows, columns, "median resample"
    );

    output
        .band_mut(1)?
        .par_chunks_mut(columns)
        .enumerate()
        .for_each(|(i, out_row)| {
            let row_start = i * src_rows / rows;
            let row_end = (((i + 1) * src_rows).div_ceil(rows)).min(src_rows).max(row_start + 1);

            for (j, out) in out_row.iter_mut().enumerate() {
                let col_start = j * src_columns / columns;
                let col_end = (((j + 1) * src_columns).div_ceil(columns))
                    .min(src_columns)
                    .max(col_start + 1);

                let mut window = Vec::with_capacity((row_end - row_start) * (col_end - col_start));
                for r in row_start..row_end {
                    for c in col_start..col_end {
                        let value = src_band[r * src_columns + c];
                        if nodata.map_or(true, |nd| value != nd) {
                            window.push(value);
                        }
                    }
                }

                *out = median(&mut window).unwrap_or(fill);
            }
        });

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SampleType;

    #[test]
    fn test_median_odd_count() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
    }

    #[test]
    fn test_median_even_count_averages() {
        assert_eq!(median(&mut [20.0, 10.0]), Some(15.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(&mut []), None);
    }

    fn checkerboard(rows: usize, columns: usize, low: f64, high: f64) -> Raster {
        let mut r = Raster::new(
            rows,
            columns,
            1,
            SampleType::Int16,
            GeoTransform::north_up(0.0, rows as f64, 1.0, -1.0),
        )
        .unwrap();
        for row in 0..rows {
            for col in 0..columns {
                let v = if (row + col) % 2 == 0 { low } else { high };
                r.set_sample(1, row, col, v).unwrap();
            }
        }
        r
    }

    #[test]
    fn test_downsample_constant_raster() {
        let mut src = checkerboard(4, 4, 7.0, 7.0);
        src.set_nodata(Some(-9999.0));

        let out =
            resample_median(&src, 2, 2, GeoTransform::north_up(0.0, 4.0, 2.0, -2.0)).unwrap();
        assert_eq!(out.rows(), 2);
        assert_eq!(out.columns(), 2);
        for row in 0..2 {
            for col in 0..2 {
                assert_eq!(out.sample(1, row, col).unwrap(), 7.0);
            }
        }
        assert_eq!(out.nodata(), Some(-9999.0));
    }

    #[test]
    fn test_downsample_takes_window_median() {
        // 2x2 windows of a checkerboard hold {1, 1, 9, 9}; the median is 5.
        let src = checkerboard(4, 4, 1.0, 9.0);
        let out =
            resample_median(&src, 2, 2, GeoTransform::north_up(0.0, 4.0, 2.0, -2.0)).unwrap();
        for row in 0..2 {
            for col in 0..2 {
                assert_eq!(out.sample(1, row, col).unwrap(), 5.0);
            }
        }
    }

    #[test]
    fn test_nodata_excluded_from_ranking() {
        let mut src = checkerboard(2, 2, 5.0, 5.0);
        src.set_nodata(Some(-9999.0));
        src.set_sample(1, 0, 0, -9999.0).unwrap();

        let out =
            resample_median(&src, 1, 1, GeoTransform::north_up(0.0, 2.0, 2.0, -2.0)).unwrap();
        assert_eq!(out.sample(1, 0, 0).unwrap(), 5.0);
    }

    #[test]
    fn test_all_nodata_window_fills_nodata() {
        let mut src = checkerboard(2, 2, -9999.0, -9999.0);
        src.set_nodata(Some(-9999.0));

        let out =
            resample_median(&src, 1, 1, GeoTransform::north_up(0.0, 2.0, 2.0, -2.0)).unwrap();
        assert_eq!(out.sample(1, 0, 0).unwrap(), -9999.0);
    }
}

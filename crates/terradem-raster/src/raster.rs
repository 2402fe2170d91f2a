//! In-memory raster grid model.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{GeoTransform, RasterError, Result};

/// Fallback nodata value used when a raster declares no usable nodata.
///
/// A declared nodata of exactly zero is treated as unset and replaced by this
/// (or by a caller-supplied fallback); zero is a perfectly ordinary elevation
/// and cannot double as a missing-data marker.
pub const DEFAULT_NODATA_FALLBACK: f64 = i16::MIN as f64;

/// Sample data type of a raster band.
///
/// A small closed set of numeric variants; the in-memory representation is
/// always `f64`, this tag records what the container stored (and what gets
/// written back out).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    /// Unsigned 8-bit integer samples.
    UInt8,
    /// Signed 8-bit integer samples.
    Int8,
    /// Unsigned 16-bit integer samples.
    UInt16,
    /// Signed 16-bit integer samples.
    Int16,
    /// Unsigned 32-bit integer samples.
    UInt32,
    /// Signed 32-bit integer samples.
    Int32,
    /// IEEE 32-bit float samples.
    Float32,
    /// IEEE 64-bit float samples.
    Float64,
}

impl SampleType {
    /// Bits per sample as stored in the container.
    pub fn bits(&self) -> u16 {
        match self {
            SampleType::UInt8 | SampleType::Int8 => 8,
            SampleType::UInt16 | SampleType::Int16 => 16,
            SampleType::UInt32 | SampleType::Int32 | SampleType::Float32 => 32,
            SampleType::Float64 => 64,
        }
    }

    /// Human-readable name used in metadata reports.
    pub fn name(&self) -> &'static str {
        match self {
            SampleType::UInt8 => "UInt8",
            SampleType::Int8 => "Int8",
            SampleType::UInt16 => "UInt16",
            SampleType::Int16 => "Int16",
            SampleType::UInt32 => "UInt32",
            SampleType::Int32 => "Int32",
            SampleType::Float32 => "Float32",
            SampleType::Float64 => "Float64",
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raster grid held fully in memory.
///
/// Samples are stored per band in row-major order (north to south, west to
/// east for north-up rasters), normalized to `f64`. The original container
/// sample type is kept as a tag so the grid round-trips through a file with
/// the type it came in with.
#[derive(Debug, Clone)]
pub struct Raster {
    rows: usize,
    columns: usize,
    transform: GeoTransform,
    sample_type: SampleType,
    /// Declared nodata value, if the container carried one.
    nodata: Option<f64>,
    /// Opaque projection descriptor (WKT or similar). May be empty.
    projection: String,
    /// Band sample storage, `rows * columns` values each.
    bands: Vec<Vec<f64>>,
}

impl Raster {
    /// Create a raster filled with zeros.
    ///
    /// Fails with `CreateFailed` for empty dimensions or zero band count, and
    /// with `TransformUnavailable` when either pixel size is zero.
    pub fn new(
        rows: usize,
        columns: usize,
        band_count: usize,
        sample_type: SampleType,
        transform: GeoTransform,
    ) -> Result<Self> {
        if rows == 0 || columns == 0 || band_count == 0 {
            return Err(RasterError::CreateFailed(format!(
                "degenerate raster shape {rows}x{columns} with {band_count} band(s)"
            )));
        }
        if !transform.is_valid() {
            return Err(RasterError::TransformUnavailable);
        }

        Ok(Self {
            rows,
            columns,
            transform,
            sample_type,
            nodata: None,
            projection: String::new(),
            bands: vec![vec![0.0; rows * columns]; band_count],
        })
    }

    /// Open a raster from a GeoTIFF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::geotiff::read_geotiff(path.as_ref())
    }

    /// Write this raster to a GeoTIFF file at `path`.
    ///
    /// Only band 1 is written; the core operations are single-band by design.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::geotiff::write_geotiff(self, path.as_ref())
    }

    pub(crate) fn from_parts(
        rows: usize,
        columns: usize,
        transform: GeoTransform,
        sample_type: SampleType,
        nodata: Option<f64>,
        projection: String,
        bands: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            rows,
            columns,
            transform,
            sample_type,
            nodata,
            projection,
            bands,
        }
    }

    /// Number of rows in the grid.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns in the grid.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of bands.
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// The affine geotransform.
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Container sample type tag.
    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    /// Declared nodata value as read from (or destined for) the container.
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Set the declared nodata value.
    pub fn set_nodata(&mut self, nodata: Option<f64>) {
        self.nodata = nodata;
    }

    /// The effective nodata value under the nodata-zero policy: a missing or
    /// exactly-zero declared nodata is replaced by `fallback`.
    pub fn nodata_or(&self, fallback: f64) -> f64 {
        match self.nodata {
            Some(v) if v != 0.0 => v,
            _ => fallback,
        }
    }

    /// Opaque projection descriptor.
    pub fn projection(&self) -> &str {
        &self.projection
    }

    /// Set the projection descriptor.
    pub fn set_projection<S: Into<String>>(&mut self, projection: S) {
        self.projection = projection.into();
    }

    /// Borrow the samples of a 1-based band.
    pub fn band(&self, band: usize) -> Result<&[f64]> {
        self.check_band(band)?;
        Ok(&self.bands[band - 1])
    }

    /// Mutably borrow the samples of a 1-based band.
    pub fn band_mut(&mut self, band: usize) -> Result<&mut [f64]> {
        self.check_band(band)?;
        Ok(&mut self.bands[band - 1])
    }

    /// Read one sample at an integer pixel offset.
    pub fn sample(&self, band: usize, row: usize, column: usize) -> Result<f64> {
        self.check_band(band)?;
        if row >= self.rows || column >= self.columns {
            return Err(RasterError::ReadFailed { band, row, column });
        }
        Ok(self.bands[band - 1][row * self.columns + column])
    }

    /// Write one sample at an integer pixel offset.
    pub fn set_sample(&mut self, band: usize, row: usize, column: usize, value: f64) -> Result<()> {
        self.check_band(band)?;
        if row >= self.rows || column >= self.columns {
            return Err(RasterError::WriteFailed { band, row, column });
        }
        self.bands[band - 1][row * self.columns + column] = value;
        Ok(())
    }

    fn check_band(&self, band: usize) -> Result<()> {
        if band == 0 || band > self.bands.len() {
            return Err(RasterError::InvalidBand {
                requested: band,
                available: self.bands.len(),
            });
        }
        Ok(())
    }
}

/// A reference to raster input: either a file on disk or a raster the caller
/// already holds.
///
/// Every bulk operation accepts this one abstraction instead of growing a
/// separate overload per input kind. A `Path` source is opened (and owned) by
/// the operation; a `Raster` source is borrowed and never written back.
#[derive(Debug, Clone, Copy)]
pub enum RasterSource<'a> {
    /// A GeoTIFF file on disk, opened on demand.
    Path(&'a Path),
    /// A raster owned by the caller.
    Raster(&'a Raster),
}

impl<'a> RasterSource<'a> {
    /// Resolve the reference: load the file for a `Path` source, borrow for a
    /// `Raster` source.
    pub fn load(&self) -> Result<Cow<'a, Raster>> {
        match self {
            RasterSource::Path(path) => Ok(Cow::Owned(Raster::open(path)?)),
            RasterSource::Raster(raster) => Ok(Cow::Borrowed(raster)),
        }
    }

    /// The file path behind this source, if it is file-backed.
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            RasterSource::Path(path) => Some(path.to_path_buf()),
            RasterSource::Raster(_) => None,
        }
    }
}

impl<'a> From<&'a Path> for RasterSource<'a> {
    fn from(path: &'a Path) -> Self {
        RasterSource::Path(path)
    }
}

impl<'a> From<&'a Raster> for RasterSource<'a> {
    fn from(raster: &'a Raster) -> Self {
        RasterSource::Raster(raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_raster() -> Raster {
        Raster::new(
            2,
            3,
            1,
            SampleType::Int16,
            GeoTransform::north_up(0.0, 2.0, 1.0, -1.0),
        )
        .unwrap()
    }

    #[test]
    fn test_sample_round_trip() {
        let mut r = small_raster();
        r.set_sample(1, 1, 2, 42.0).unwrap();
        assert_eq!(r.sample(1, 1, 2).unwrap(), 42.0);
        assert_eq!(r.sample(1, 0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_out_of_grid_reads_fail() {
        let r = small_raster();
        assert!(matches!(
            r.sample(1, 2, 0),
            Err(RasterError::ReadFailed { row: 2, .. })
        ));
        assert!(matches!(
            r.sample(1, 0, 3),
            Err(RasterError::ReadFailed { column: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_band() {
        let r = small_raster();
        assert!(matches!(
            r.sample(2, 0, 0),
            Err(RasterError::InvalidBand {
                requested: 2,
                available: 1
            })
        ));
        assert!(matches!(r.sample(0, 0, 0), Err(RasterError::InvalidBand { .. })));
    }

    #[test]
    fn test_nodata_zero_falls_back() {
        let mut r = small_raster();
        assert_eq!(r.nodata_or(DEFAULT_NODATA_FALLBACK), DEFAULT_NODATA_FALLBACK);

        r.set_nodata(Some(0.0));
        assert_eq!(r.nodata_or(-1.0), -1.0);

        r.set_nodata(Some(-9999.0));
        assert_eq!(r.nodata_or(-1.0), -9999.0);
    }

    #[test]
    fn test_degenerate_shapes_rejected() {
        let t = GeoTransform::north_up(0.0, 0.0, 1.0, -1.0);
        assert!(matches!(
            Raster::new(0, 3, 1, SampleType::Int16, t),
            Err(RasterError::CreateFailed(_))
        ));
        assert!(matches!(
            Raster::new(3, 3, 0, SampleType::Int16, t),
            Err(RasterError::CreateFailed(_))
        ));
        let zero = GeoTransform::north_up(0.0, 0.0, 0.0, -1.0);
        assert!(matches!(
            Raster::new(3, 3, 1, SampleType::Int16, zero),
            Err(RasterError::TransformUnavailable)
        ));
    }
}

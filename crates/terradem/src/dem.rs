//! DEM accessor: nodata-aware altitude queries over one raster band.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use terradem_raster::{Raster, RasterError, DEFAULT_NODATA_FALLBACK};

use crate::geo::{Bounds, GridGeometry, PixelIndex};
use crate::Result;

/// Construction options for a [`Dem`].
#[derive(Debug, Clone, Copy)]
pub struct DemOptions {
    /// 1-based raster band to query.
    pub band: usize,
    /// Replacement nodata when the raster declares none, or declares the
    /// unusable value zero.
    pub nodata_fallback: f64,
}

impl Default for DemOptions {
    fn default() -> Self {
        Self {
            band: 1,
            nodata_fallback: DEFAULT_NODATA_FALLBACK,
        }
    }
}

/// One raster band behind an elevation query interface.
///
/// A `Dem` either owns its raster (opened from a file path) or borrows one
/// the caller already holds. The distinction matters for [`Dem::try_clone`]:
/// a file-backed DEM reopens the file into an independent copy, a borrowed
/// one shares the same underlying raster without reopening anything.
///
/// Queries never fail: anything the grid cannot answer comes back as the
/// dataset's nodata value.
#[derive(Debug)]
pub struct Dem<'a> {
    raster: Cow<'a, Raster>,
    /// Present only for file-backed DEMs; drives reopen-on-clone.
    path: Option<PathBuf>,
    geometry: GridGeometry,
    bounds: Bounds,
    band: usize,
    nodata: f64,
}

impl Dem<'static> {
    /// Open a DEM from a GeoTIFF file. The returned DEM owns its raster.
    pub fn open<P: AsRef<Path>>(path: P, options: DemOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let raster = Raster::open(&path)?;
        Self::build(Cow::Owned(raster), Some(path), options)
    }
}

impl<'a> Dem<'a> {
    /// Wrap a raster the caller owns. The returned DEM borrows it and never
    /// takes responsibility for it.
    pub fn from_raster(raster: &'a Raster, options: DemOptions) -> Result<Self> {
        Self::build(Cow::Borrowed(raster), None, options)
    }

    fn build(raster: Cow<'a, Raster>, path: Option<PathBuf>, options: DemOptions) -> Result<Self> {
        if options.band == 0 || options.band > raster.band_count() {
            return Err(RasterError::InvalidBand {
                requested: options.band,
                available: raster.band_count(),
            }
            .into());
        }

        let geometry = GridGeometry::new(raster.transform(), raster.rows(), raster.columns());
        let bounds = Bounds::from_geometry(&geometry)?;
        let nodata = raster.nodata_or(options.nodata_fallback);

        Ok(Self {
            raster,
            path,
            geometry,
            bounds,
            band: options.band,
            nodata,
        })
    }

    /// Duplicate this DEM. File-backed DEMs reopen the file into an
    /// independent raster; borrowed DEMs share the caller's raster.
    pub fn try_clone(&self) -> Result<Self> {
        let raster = match (&self.path, &self.raster) {
            (Some(path), _) => Cow::Owned(Raster::open(path)?),
            (None, Cow::Borrowed(raster)) => Cow::Borrowed(*raster),
            // Unreachable by construction: owned rasters always carry a path.
            (None, Cow::Owned(raster)) => Cow::Owned(raster.clone()),
        };

        Ok(Self {
            raster,
            path: self.path.clone(),
            geometry: self.geometry,
            bounds: self.bounds,
            band: self.band,
            nodata: self.nodata,
        })
    }

    /// The underlying raster.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// True when this DEM owns a file-backed raster (as opposed to borrowing
    /// one from the caller).
    pub fn is_file_backed(&self) -> bool {
        self.path.is_some()
    }

    /// Geographic corner coordinates of the grid.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Derived grid geometry.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Effective nodata value returned by failed queries.
    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    /// Fractional pixel address of a coordinate.
    pub fn index(&self, latitude: f64, longitude: f64) -> PixelIndex {
        self.geometry.to_pixel(latitude, longitude)
    }

    /// Elevation of the sample nearest to the coordinate.
    ///
    /// Rounds the fractional address half away from zero, clamps an address
    /// that landed exactly on the grid edge back inside, and reads one
    /// sample. Out-of-bounds coordinates and failed reads return nodata.
    pub fn altitude(&self, latitude: f64, longitude: f64) -> f64 {
        let Some((row, column)) = self.geometry.nearest_cell(latitude, longitude) else {
            return self.nodata;
        };

        match self.raster.sample(self.band, row, column) {
            Ok(value) => value,
            Err(_) => self.nodata,
        }
    }

    /// Bilinearly interpolated elevation at the coordinate.
    ///
    /// The fractional address is floored to the top-left sample of the
    /// enclosing cell; a cell on the last row or column replicates itself
    /// instead of reaching past the grid edge. Out-of-bounds coordinates and
    /// failed reads return nodata.
    pub fn interpolated_altitude(&self, latitude: f64, longitude: f64) -> f64 {
        let (row, column) = match self.geometry.to_pixel(latitude, longitude) {
            PixelIndex::Found { row, column } => (row, column),
            PixelIndex::OutOfBounds => return self.nodata,
        };

        let r = row.floor() as usize;
        let c = column.floor() as usize;

        let last_row = (self.geometry.rows - 1) as f64;
        let last_column = (self.geometry.columns - 1) as f64;
        let d_lat = row.min(last_row) - r as f64;
        let d_lon = column.min(last_column) - c as f64;

        let next_r = if r + 1 >= self.geometry.rows { r } else { r + 1 };
        let next_c = if c + 1 >= self.geometry.columns { c } else { c + 1 };

        let m = self.raster.sample(self.band, r, c);
        let n = self.raster.sample(self.band, r, next_c);
        let o = self.raster.sample(self.band, next_r, c);
        let p = self.raster.sample(self.band, next_r, next_c);

        match (m, n, o, p) {
            (Ok(m), Ok(n), Ok(o), Ok(p)) => {
                (1.0 - d_lat) * (1.0 - d_lon) * m
                    + d_lon * (1.0 - d_lat) * n
                    + (1.0 - d_lon) * d_lat * o
                    + d_lat * d_lon * p
            }
            _ => self.nodata,
        }
    }
}

impl fmt::Display for Dem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raster = self.raster();
        writeln!(f, "Projection : {}", raster.projection())?;
        writeln!(f, "Data Type : {}", raster.sample_type())?;
        writeln!(f, "Rows : {}", raster.rows())?;
        writeln!(f, "Columns : {}", raster.columns())?;
        writeln!(
            f,
            "Resolution (latitudinal, longitudinal) : ({}, {})",
            self.geometry.y_resolution, self.geometry.x_resolution
        )?;
        writeln!(f, "Bounded Region {{")?;
        writeln!(
            f,
            "    North West : ({}, {})",
            self.bounds.nw.latitude(), self.bounds.nw.longitude()
        )?;
        writeln!(
            f,
            "    South East : ({}, {})",
            self.bounds.se.latitude(), self.bounds.se.longitude()
        )?;
        writeln!(f, "}}")?;
        write!(f, "No Data Value : {}", self.nodata)
    }
}

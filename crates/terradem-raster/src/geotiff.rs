//! GeoTIFF container read/write.
//!
//! Pure Rust via the `tiff` crate, no GDAL. Georeferencing travels in the
//! usual GeoTIFF tags: ModelPixelScale (33550) and ModelTiepoint (33922) carry
//! the affine transform, GDAL_NODATA (42113) the declared nodata value, and
//! GeoAsciiParams (34737) the opaque projection descriptor.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{DirectoryEncoder, TiffEncoder, TiffKind, TiffValue};
use tiff::tags::Tag;
use tracing::debug;

use crate::{GeoTransform, Raster, RasterError, Result, SampleType};

/// Read a GeoTIFF file into an in-memory [`Raster`].
pub(crate) fn read_geotiff(path: &Path) -> Result<Raster> {
    if !path.exists() {
        return Err(RasterError::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| RasterError::OpenFailed(e.to_string()))?;
    let mut decoder = Decoder::new(file).map_err(|e| RasterError::OpenFailed(e.to_string()))?;

    // Raise the decode limits; full-resolution DEM tiles run to hundreds of
    // millions of samples.
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 1024 * 1024 * 1024;
    decoder = decoder.with_limits(limits);

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| RasterError::OpenFailed(e.to_string()))?;
    let columns = width as usize;
    let rows = height as usize;

    let transform = read_transform(&mut decoder)?;
    if !transform.is_valid() {
        return Err(RasterError::TransformUnavailable);
    }

    let nodata = read_nodata(&mut decoder);
    let projection = read_projection(&mut decoder);

    let band_count = match decoder.colortype() {
        Ok(tiff::ColorType::Gray(_)) => 1,
        Ok(tiff::ColorType::GrayA(_)) => 2,
        Ok(tiff::ColorType::RGB(_)) => 3,
        Ok(tiff::ColorType::RGBA(_)) => 4,
        Ok(other) => {
            return Err(RasterError::OpenFailed(format!(
                "unsupported color type {other:?}"
            )))
        }
        Err(e) => return Err(RasterError::OpenFailed(e.to_string())),
    };

    let (sample_type, interleaved) = decode_samples(&mut decoder)?;
    if interleaved.len() != rows * columns * band_count {
        return Err(RasterError::OpenFailed(format!(
            "sample count {} does not match {}x{}x{}",
            interleaved.len(),
            rows,
            columns,
            band_count
        )));
    }

    let bands = deinterleave(&interleaved, band_count);

    debug!(
        path = %path.display(),
        rows,
        columns,
        band_count,
        sample_type = %sample_type,
        "opened geotiff"
    );

    Ok(Raster::from_parts(
        rows,
        columns,
        transform,
        sample_type,
        nodata,
        projection,
        bands,
    ))
}

/// Read the affine transform from ModelTiepoint + ModelPixelScale.
fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    // The decoder normalizes IFD keys to named variants, so lookups must use
    // them too; a `Tag::Unknown` query for the same ID never matches.
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag);
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag);

    match (tiepoint, scale) {
        (Ok(tie), Ok(scale)) if tie.len() >= 6 && scale.len() >= 2 => {
            // Tiepoint ties pixel (i, j) to world (x, y); in practice the tie
            // is the top-left corner, data runs south and east.
            Ok(GeoTransform::north_up(
                tie[3] - tie[0] * scale[0],
                tie[4] + tie[1] * scale[1],
                scale[0],
                -scale[1],
            ))
        }
        _ => Err(RasterError::TransformUnavailable),
    }
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|s| s.trim().trim_end_matches('\0').parse().ok())
}

fn read_projection<R: Read + Seek>(decoder: &mut Decoder<R>) -> String {
    decoder
        .get_tag_ascii_string(Tag::GeoAsciiParamsTag)
        .map(|s| s.trim_end_matches('\0').trim_end_matches('|').to_string())
        .unwrap_or_default()
}

/// Decode the sample data, keeping the container type as a tag and widening
/// everything to `f64` in memory. 64-bit integer containers are tagged as
/// `Float64`; they have no variant of their own in the closed type set.
fn decode_samples<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<(SampleType, Vec<f64>)> {
    let result = decoder
        .read_image()
        .map_err(|e| RasterError::OpenFailed(e.to_string()))?;

    let decoded = match result {
        DecodingResult::U8(data) => (
            SampleType::UInt8,
            data.into_iter().map(|v| v as f64).collect(),
        ),
        DecodingResult::I8(data) => (
            SampleType::Int8,
            data.into_iter().map(|v| v as f64).collect(),
        ),
        DecodingResult::U16(data) => (
            SampleType::UInt16,
            data.into_iter().map(|v| v as f64).collect(),
        ),
        DecodingResult::I16(data) => (
            SampleType::Int16,
            data.into_iter().map(|v| v as f64).collect(),
        ),
        DecodingResult::U32(data) => (
            SampleType::UInt32,
            data.into_iter().map(|v| v as f64).collect(),
        ),
        DecodingResult::I32(data) => (
            SampleType::Int32,
            data.into_iter().map(|v| v as f64).collect(),
        ),
        DecodingResult::F32(data) => (
            SampleType::Float32,
            data.into_iter().map(|v| v as f64).collect(),
        ),
        DecodingResult::F64(data) => (SampleType::Float64, data),
        DecodingResult::U64(data) => (
            SampleType::Float64,
            data.into_iter().map(|v| v as f64).collect(),
        ),
        DecodingResult::I64(data) => (
            SampleType::Float64,
            data.into_iter().map(|v| v as f64).collect(),
        ),
    };

    Ok(decoded)
}

fn deinterleave(interleaved: &[f64], band_count: usize) -> Vec<Vec<f64>> {
    if band_count == 1 {
        return vec![interleaved.to_vec()];
    }
    let per_band = interleaved.len() / band_count;
    let mut bands = vec![Vec::with_capacity(per_band); band_count];
    for chunk in interleaved.chunks_exact(band_count) {
        for (band, &value) in bands.iter_mut().zip(chunk) {
            band.push(value);
        }
    }
    bands
}

/// Write band 1 of a raster to a GeoTIFF file.
pub(crate) fn write_geotiff(raster: &Raster, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| RasterError::CreateFailed(e.to_string()))?;
    let writer = BufWriter::new(file);
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| RasterError::CreateFailed(e.to_string()))?;

    let band = raster.band(1)?;

    match raster.sample_type() {
        SampleType::UInt8 => {
            let data: Vec<u8> = band.iter().map(|&v| v as u8).collect();
            write_band::<_, colortype::Gray8>(&mut encoder, raster, &data)?;
        }
        SampleType::Int8 => {
            let data: Vec<i8> = band.iter().map(|&v| v as i8).collect();
            write_band::<_, colortype::GrayI8>(&mut encoder, raster, &data)?;
        }
        SampleType::UInt16 => {
            let data: Vec<u16> = band.iter().map(|&v| v as u16).collect();
            write_band::<_, colortype::Gray16>(&mut encoder, raster, &data)?;
        }
        SampleType::Int16 => {
            let data: Vec<i16> = band.iter().map(|&v| v as i16).collect();
            write_band::<_, colortype::GrayI16>(&mut encoder, raster, &data)?;
        }
        SampleType::UInt32 => {
            let data: Vec<u32> = band.iter().map(|&v| v as u32).collect();
            write_band::<_, colortype::Gray32>(&mut encoder, raster, &data)?;
        }
        SampleType::Int32 => {
            let data: Vec<i32> = band.iter().map(|&v| v as i32).collect();
            write_band::<_, colortype::GrayI32>(&mut encoder, raster, &data)?;
        }
        SampleType::Float32 => {
            let data: Vec<f32> = band.iter().map(|&v| v as f32).collect();
            write_band::<_, colortype::Gray32Float>(&mut encoder, raster, &data)?;
        }
        SampleType::Float64 => {
            write_band::<_, colortype::Gray64Float>(&mut encoder, raster, band)?;
        }
    }

    debug!(
        path = %path.display(),
        rows = raster.rows(),
        columns = raster.columns(),
        sample_type = %raster.sample_type(),
        "wrote geotiff"
    );

    Ok(())
}

fn write_band<W, C>(encoder: &mut TiffEncoder<W>, raster: &Raster, data: &[C::Inner]) -> Result<()>
where
    W: Write + Seek,
    C: ColorType,
    [C::Inner]: TiffValue,
{
    let mut image = encoder
        .new_image::<C>(raster.columns() as u32, raster.rows() as u32)
        .map_err(|e| RasterError::CreateFailed(e.to_string()))?;

    write_geo_tags(image.encoder(), raster)?;

    image
        .write_data(data)
        .map_err(|e| RasterError::CreateFailed(e.to_string()))?;
    Ok(())
}

fn write_geo_tags<W: Write + Seek, K: TiffKind>(
    dir: &mut DirectoryEncoder<W, K>,
    raster: &Raster,
) -> Result<()> {
    let t = raster.transform();

    // ModelPixelScale is unsigned; north-up orientation is implied.
    let scale = [t.pixel_width.abs(), t.pixel_height.abs(), 0.0];
    dir.write_tag(Tag::ModelPixelScaleTag, scale.as_slice())
        .map_err(|e| RasterError::CreateFailed(e.to_string()))?;

    // Tie pixel (0, 0) to the grid origin.
    let tiepoint = [0.0, 0.0, 0.0, t.origin_x, t.origin_y, 0.0];
    dir.write_tag(Tag::ModelTiepointTag, tiepoint.as_slice())
        .map_err(|e| RasterError::CreateFailed(e.to_string()))?;

    if let Some(nodata) = raster.nodata() {
        let text = format!("{nodata}");
        dir.write_tag(Tag::GdalNodata, text.as_str())
            .map_err(|e| RasterError::CreateFailed(e.to_string()))?;
    }

    if !raster.projection().is_empty() {
        let text = format!("{}|", raster.projection());
        dir.write_tag(Tag::GeoAsciiParamsTag, text.as_str())
            .map_err(|e| RasterError::CreateFailed(e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn synthetic_raster(sample_type: SampleType) -> Raster {
        let mut r = Raster::new(
            4,
            5,
            1,
            sample_type,
            GeoTransform::north_up(-123.0, 48.0, 0.25, -0.25),
        )
        .unwrap();
        for row in 0..4 {
            for col in 0..5 {
                r.set_sample(1, row, col, (row * 10 + col) as f64).unwrap();
            }
        }
        r.set_nodata(Some(-9999.0));
        r.set_projection("WGS 84");
        r
    }

    #[test]
    fn test_round_trip_int16() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("int16.tif");

        let original = synthetic_raster(SampleType::Int16);
        original.write(&path).unwrap();

        let read = Raster::open(&path).unwrap();
        assert_eq!(read.rows(), 4);
        assert_eq!(read.columns(), 5);
        assert_eq!(read.sample_type(), SampleType::Int16);
        assert_eq!(read.nodata(), Some(-9999.0));
        assert_eq!(read.projection(), "WGS 84");

        let t = read.transform();
        assert_relative_eq!(t.origin_x, -123.0);
        assert_relative_eq!(t.origin_y, 48.0);
        assert_relative_eq!(t.pixel_width, 0.25);
        assert_relative_eq!(t.pixel_height, -0.25);

        for row in 0..4 {
            for col in 0..5 {
                assert_eq!(read.sample(1, row, col).unwrap(), (row * 10 + col) as f64);
            }
        }
    }

    #[test]
    fn test_round_trip_float32() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f32.tif");

        let mut original = synthetic_raster(SampleType::Float32);
        original.set_sample(1, 2, 2, 123.5).unwrap();
        original.write(&path).unwrap();

        let read = Raster::open(&path).unwrap();
        assert_eq!(read.sample_type(), SampleType::Float32);
        assert_eq!(read.sample(1, 2, 2).unwrap(), 123.5);
    }

    #[test]
    fn test_missing_file_is_file_not_found() {
        let err = Raster::open("/nonexistent/place/missing.tif").unwrap_err();
        assert!(matches!(err, RasterError::FileNotFound(_)));
    }

    #[test]
    fn test_garbage_file_is_open_failed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.tif");
        std::fs::write(&path, b"this is not a tiff at all").unwrap();

        let err = Raster::open(&path).unwrap_err();
        assert!(matches!(err, RasterError::OpenFailed(_)));
    }

    #[test]
    fn test_tiff_without_geo_tags_has_no_transform() {
        use tiff::encoder::colortype::Gray16;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.tif");

        // A plain TIFF written without ModelTiepoint/ModelPixelScale. The
        // encoder must go out of scope before the reopen so the buffered
        // writer flushes.
        {
            let file = File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(BufWriter::new(file)).unwrap();
            encoder
                .write_image::<Gray16>(2, 2, &[1u16, 2, 3, 4])
                .unwrap();
        }

        let err = Raster::open(&path).unwrap_err();
        assert!(matches!(err, RasterError::TransformUnavailable));
    }

    #[test]
    fn test_nodata_absent_when_untagged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no_nodata.tif");

        let mut r = synthetic_raster(SampleType::Int16);
        r.set_nodata(None);
        r.set_projection("");
        r.write(&path).unwrap();

        let read = Raster::open(&path).unwrap();
        assert_eq!(read.nodata(), None);
        assert_eq!(read.projection(), "");
    }
}

use std::{fs::File, io::{BufWriter, Seek, Write}, path::Path};

use tiff::{encoder::{colortype::Gray8, DirectoryEncoder, TiffEncoder, TiffKind}, tags::Tag};

use super::*;
use crate::{raster::RasterGrid, Error, Result};

/// Write `grid` as a single-band 8-bit GeoTIFF.
pub fn write_geotiff(grid: &RasterGrid, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("[io::geotiff::write] failed to create raster {}: {e}", path.display()))))?;
    let mut writer = BufWriter::new(file);
    write_geotiff_to(grid, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write `grid` to any seekable writer.
pub fn write_geotiff_to<W: Write + Seek>(grid: &RasterGrid, writer: W) -> Result<()> {
    if grid.width() == 0 || grid.height() == 0 {
        return Err(Error::Raster("[io::geotiff::write] raster has zero dimensions".into()))
    }
    if !grid.transform().is_north_up() {
        return Err(Error::Raster("[io::geotiff::write] only north-up rasters can be written".into()))
    }

    let mut encoder = TiffEncoder::new(writer)?;
    let mut image = encoder.new_image::<Gray8>(grid.width() as u32, grid.height() as u32)?;
    write_geotiff_tags(grid, image.encoder())?;

    let pixels = grid.data().iter().copied().collect::<Vec<u8>>();
    image.write_data(&pixels)?;
    Ok(())
}

fn write_geotiff_tags<W: Write + Seek, K: TiffKind>(grid: &RasterGrid, dir: &mut DirectoryEncoder<W, K>) -> Result<()> {
    let t = grid.transform();

    // ModelPixelScale: [ScaleX, ScaleY, ScaleZ]
    dir.write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &[t.a, -t.e, 0.0][..])?;
    // ModelTiepoint: pixel (0, 0) -> top-left corner
    dir.write_tag(Tag::Unknown(MODEL_TIEPOINT), &[0.0, 0.0, 0.0, t.c, t.f, 0.0][..])?;

    let crs = grid.crs();
    let geographic = crs.is_geographic();
    let citation = crs.epsg().is_none().then(|| format!("{}|{}|", crs.label(), crs.proj4()));

    let mut keys = vec![1, 1, 0, 0];
    keys.extend_from_slice(&[
        GT_MODEL_TYPE_GEO_KEY, 0, 1,
        if geographic { MODEL_TYPE_GEOGRAPHIC } else { MODEL_TYPE_PROJECTED },
    ]);
    keys.extend_from_slice(&[GT_RASTER_TYPE_GEO_KEY, 0, 1, RASTER_PIXEL_IS_AREA]);
    if let Some(citation) = &citation {
        keys.extend_from_slice(&[GT_CITATION_GEO_KEY, GEO_ASCII_PARAMS, citation.len() as u16, 0]);
    }
    keys.extend_from_slice(&[
        if geographic { GEOGRAPHIC_TYPE_GEO_KEY } else { PROJECTED_CS_TYPE_GEO_KEY }, 0, 1,
        crs.epsg().unwrap_or(USER_DEFINED),
    ]);
    keys[3] = (keys.len() / 4 - 1) as u16;
    dir.write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), &keys[..])?;

    if let Some(citation) = &citation {
        dir.write_tag(Tag::Unknown(GEO_ASCII_PARAMS), citation.as_str())?;
    }
    if let Some(nodata) = grid.nodata() {
        dir.write_tag(Tag::Unknown(GDAL_NODATA), nodata.to_string().as_str())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::{crs::Crs, io::geotiff::{read_geotiff, read_geotiff_window, GeoTiffInfo}, raster::{GeoTransform, Window}};

    use super::*;

    fn grid(crs: Crs) -> RasterGrid {
        let values = (0..48).collect::<Vec<u8>>();
        RasterGrid::from_vec(8, 6, values, crs, GeoTransform::north_up(-1000.0, 5000.0, 100.0, 100.0), Some(0)).unwrap()
    }

    #[test]
    fn file_round_trip_keeps_georeferencing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.tif");
        let original = grid(Crs::from_epsg(3857).unwrap());
        write_geotiff(&original, &path).unwrap();

        let back = read_geotiff(&path, None).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn user_defined_crs_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moll.tif");
        let original = grid("ESRI:54009".parse().unwrap());
        write_geotiff(&original, &path).unwrap();

        let info = GeoTiffInfo::read(&path).unwrap();
        assert_eq!(info.crs.as_ref().map(|c| c.label()), Some("ESRI:54009"));
        assert_eq!(info.nodata, Some(0));
        assert_eq!((info.width, info.height), (8, 6));
    }

    #[test]
    fn windowed_read_matches_in_memory_crop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.tif");
        let original = grid(Crs::wgs84());
        write_geotiff(&original, &path).unwrap();

        let window = Window { col_off: 2, row_off: 1, width: 4, height: 3 };
        let read = read_geotiff_window(&path, &window, None).unwrap();
        assert_eq!(read, original.crop(&window).unwrap());
    }

    #[test]
    fn writes_to_memory() {
        let mut buf = Cursor::new(Vec::new());
        write_geotiff_to(&grid(Crs::wgs84()), &mut buf).unwrap();
        assert!(!buf.into_inner().is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_geotiff(Path::new("/nonexistent/raster.tif"), None).unwrap_err();
        assert!(matches!(&err, Error::Io(_)));
        assert!(err.to_string().contains("[io::geotiff::read]"));
    }

    #[test]
    fn zero_sized_raster_is_rejected() {
        let empty = RasterGrid::from_vec(0, 0, Vec::new(), Crs::wgs84(), GeoTransform::north_up(0.0, 0.0, 1.0, 1.0), None).unwrap();
        let err = write_geotiff_to(&empty, Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(err, Error::Raster(msg) if msg.starts_with("[io::geotiff::write]")));
    }
}

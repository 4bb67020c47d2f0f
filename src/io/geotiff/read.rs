use std::{fs::File, io::{BufReader, Read, Seek}, path::Path};

use ndarray::Array2;
use tiff::{decoder::{Decoder, DecodingResult}, tags::Tag, ColorType};

use super::*;
use crate::{crs::Crs, raster::{GeoTransform, RasterGrid, Window}, Error, Result};

/// Georeferencing and layout of a GeoTIFF, read without decoding pixels.
#[derive(Debug, Clone)]
pub struct GeoTiffInfo {
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    pub crs: Option<Crs>,
    pub nodata: Option<u8>,
}

impl GeoTiffInfo {
    pub fn read(path: &Path) -> Result<Self> {
        Self::from_decoder(&mut open(path)?)
    }

    fn from_decoder<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Self> {
        match decoder.colortype()? {
            ColorType::Gray(8) => {}
            other => return Err(Error::Raster(format!("[io::geotiff::read] expected single-band 8-bit raster, found {other:?}"))),
        }
        let (width, height) = decoder.dimensions()?;
        let geokeys = read_geokeys(decoder)?;
        Ok(Self {
            width: width as usize,
            height: height as usize,
            transform: read_transform(decoder, &geokeys)?,
            crs: read_crs(decoder, &geokeys)?,
            nodata: read_nodata(decoder)?,
        })
    }
}

fn open(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("[io::geotiff::read] failed to open raster {}: {e}", path.display()))))?;
    Ok(Decoder::new(BufReader::new(file))?)
}

/// `(key, location, count, value)` entries of the GeoKeyDirectory.
fn read_geokeys<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Vec<[u16; 4]>> {
    let Some(value) = decoder.find_tag(Tag::Unknown(GEO_KEY_DIRECTORY))? else { return Ok(Vec::new()) };
    let dir = value.into_u16_vec()?;
    Ok(dir.chunks_exact(4).skip(1).map(|k| [k[0], k[1], k[2], k[3]]).collect())
}

fn geokey(geokeys: &[[u16; 4]], key: u16) -> Option<[u16; 4]> {
    geokeys.iter().find(|k| k[0] == key).copied()
}

fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>, geokeys: &[[u16; 4]]) -> Result<GeoTransform> {
    if let Some(value) = decoder.find_tag(Tag::Unknown(MODEL_TRANSFORMATION))? {
        let m = value.into_f64_vec()?;
        if m.len() < 8 { return Err(Error::Raster("[io::geotiff::read] ModelTransformation tag has fewer than 8 values".into())) }
        return Ok(GeoTransform::new(m[0], m[1], m[3], m[4], m[5], m[7]))
    }

    let scale = decoder.find_tag(Tag::Unknown(MODEL_PIXEL_SCALE))?
        .ok_or_else(|| Error::Raster("[io::geotiff::read] missing ModelPixelScale tag".into()))?
        .into_f64_vec()?;
    let tie = decoder.find_tag(Tag::Unknown(MODEL_TIEPOINT))?
        .ok_or_else(|| Error::Raster("[io::geotiff::read] missing ModelTiepoint tag".into()))?
        .into_f64_vec()?;
    if scale.len() < 2 || tie.len() < 6 {
        return Err(Error::Raster("[io::geotiff::read] malformed ModelPixelScale/ModelTiepoint tags".into()))
    }

    let (sx, sy) = (scale[0], scale[1]);
    let mut transform = GeoTransform::new(sx, 0.0, tie[3] - tie[0] * sx, 0.0, -sy, tie[4] + tie[1] * sy);

    // PixelIsPoint ties the pixel centre, not its corner.
    if geokey(geokeys, GT_RASTER_TYPE_GEO_KEY).is_some_and(|k| k[3] == RASTER_PIXEL_IS_POINT) {
        transform.c -= sx / 2.0;
        transform.f += sy / 2.0;
    }
    Ok(transform)
}

fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>, geokeys: &[[u16; 4]]) -> Result<Option<Crs>> {
    let Some(key) = geokey(geokeys, PROJECTED_CS_TYPE_GEO_KEY)
        .or_else(|| geokey(geokeys, GEOGRAPHIC_TYPE_GEO_KEY)) else { return Ok(None) };

    if key[3] != USER_DEFINED {
        return Crs::from_epsg(key[3]).map(Some)
    }

    // User-defined CRS: our writer stores "label|proj4|" in GeoAsciiParams.
    let Some(value) = decoder.find_tag(Tag::Unknown(GEO_ASCII_PARAMS))? else { return Ok(None) };
    let ascii = value.into_string()?;
    let mut parts = ascii.split('|');
    match (parts.next(), parts.next()) {
        (Some(label), Some(proj4)) if proj4.contains("+proj=") => Ok(Some(Crs::custom(label, proj4))),
        _ => Ok(None),
    }
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<u8>> {
    let Some(value) = decoder.find_tag(Tag::Unknown(GDAL_NODATA))? else { return Ok(None) };
    let text = value.into_string()?;
    Ok(text.trim_matches(char::from(0)).trim().parse::<f64>().ok()
        .filter(|v| v.fract() == 0.0 && (0.0..=255.0).contains(v))
        .map(|v| v as u8))
}

fn resolve_crs(info: &GeoTiffInfo, crs: Option<&Crs>, path: &Path) -> Result<Crs> {
    crs.cloned().or_else(|| info.crs.clone())
        .ok_or_else(|| Error::Crs(format!("[io::geotiff::read] {} carries no CRS and none was supplied", path.display())))
}

/// Read band 1 of a GeoTIFF. `crs` overrides the CRS stored in the file.
pub fn read_geotiff(path: &Path, crs: Option<&Crs>) -> Result<RasterGrid> {
    let mut decoder = open(path)?;
    let info = GeoTiffInfo::from_decoder(&mut decoder)?;
    let crs = resolve_crs(&info, crs, path)?;

    let values = match decoder.read_image()? {
        DecodingResult::U8(values) => values,
        _ => return Err(Error::Raster(format!("[io::geotiff::read] {}: expected U8 pixels", path.display()))),
    };
    RasterGrid::from_vec(info.width, info.height, values, crs, info.transform, info.nodata)
}

/// Read only the pixels of `window` from band 1 of a GeoTIFF, decoding just
/// the strips or tiles that overlap it.
pub fn read_geotiff_window(path: &Path, window: &Window, crs: Option<&Crs>) -> Result<RasterGrid> {
    let mut decoder = open(path)?;
    let info = GeoTiffInfo::from_decoder(&mut decoder)?;
    let crs = resolve_crs(&info, crs, path)?;

    let extent = Window { col_off: 0, row_off: 0, width: info.width, height: info.height };
    let window = window.intersection(&extent)
        .ok_or_else(|| Error::Bounds(format!("[io::geotiff::read] window {window:?} lies outside {} ({}x{})", path.display(), info.width, info.height)))?;

    let (chunk_w, chunk_h) = decoder.chunk_dimensions();
    let (chunk_w, chunk_h) = (chunk_w as usize, chunk_h as usize);
    let chunks_across = info.width.div_ceil(chunk_w);

    let mut data = Array2::<u8>::zeros((window.height, window.width));
    for chunk_row in window.row_off / chunk_h..=(window.row_end() - 1) / chunk_h {
        for chunk_col in window.col_off / chunk_w..=(window.col_end() - 1) / chunk_w {
            let idx = (chunk_row * chunks_across + chunk_col) as u32;
            let (data_w, data_h) = decoder.chunk_data_dimensions(idx);
            let (data_w, data_h) = (data_w as usize, data_h as usize);
            let buf = match decoder.read_chunk(idx)? {
                DecodingResult::U8(buf) => buf,
                _ => return Err(Error::Raster(format!("[io::geotiff::read] {}: expected U8 pixels in chunk {idx}", path.display()))),
            };

            let (row0, col0) = (chunk_row * chunk_h, chunk_col * chunk_w);
            for row in row0.max(window.row_off)..(row0 + data_h).min(window.row_end()) {
                for col in col0.max(window.col_off)..(col0 + data_w).min(window.col_end()) {
                    data[(row - window.row_off, col - window.col_off)] = buf[(row - row0) * data_w + (col - col0)];
                }
            }
        }
    }

    Ok(RasterGrid::new(data, crs, info.transform.window_transform(&window), info.nodata))
}

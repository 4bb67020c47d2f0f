use geo::BoundingRect;
use h3o::Resolution;
use log::info;

use crate::{
    assemble::CityBoundary,
    crs::{BoundingBox, Crs},
    hex::{cover_geometry, BoundaryCells, LineCoverage},
    Error, Result,
};

/// Everything the pipelines need to know about the requested cities.
#[derive(Debug, Clone)]
pub struct CityArea {
    /// Cells covering every city outline.
    pub cells: BoundaryCells,
    /// Total bounds of the outlines, WGS84 degrees.
    pub bbox: BoundingBox,
    /// `bbox` grown by the POI buffer on every side.
    pub bbox_pois: BoundingBox,
}

/// Cover each city outline with cells at `resolution` and compute the
/// bounding boxes for the raster crop and the POI query.
pub fn city_boundaries(cities: &[CityBoundary], resolution: Resolution, poi_buffer: f64) -> Result<CityArea> {
    let mut bbox: Option<BoundingBox> = None;
    let mut cells = Vec::new();
    for city in cities {
        let rect = city.geometry.bounding_rect()
            .ok_or_else(|| Error::Bounds(format!("[assemble::boundary] {} has an empty outline", city.name)))?;
        let city_bbox = BoundingBox::from_rect(rect, Crs::wgs84());
        bbox = Some(match bbox {
            Some(total) => total.union(&city_bbox),
            None => city_bbox,
        });
        cells.extend(cover_geometry(&city.geometry, resolution, LineCoverage::default())?);
    }

    let bbox = bbox.ok_or_else(|| Error::Bounds("[assemble::boundary] no city outlines".into()))?;
    let cells = BoundaryCells::new(resolution, cells);
    info!("[assemble::boundary] {} cities -> {} boundary cells at resolution {}", cities.len(), cells.len(), resolution);

    Ok(CityArea { bbox_pois: bbox.buffered(poi_buffer), bbox, cells })
}

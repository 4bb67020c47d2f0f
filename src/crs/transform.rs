use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::{crs::{BoundingBox, Crs}, Error, Result};

/// A source/destination projection pair, built once and reused for every point.
pub struct CrsTransformer {
    src: Crs,
    dst: Crs,
    from: Proj4,
    to: Proj4,
}

impl CrsTransformer {
    pub fn new(src: &Crs, dst: &Crs) -> Result<Self> {
        let build = |crs: &Crs| Proj4::from_proj_string(crs.proj4())
            .map_err(|e| Error::Crs(format!("[crs::transform] failed to build PROJ.4 for {crs}: {e:?}")));
        Ok(Self { src: src.clone(), dst: dst.clone(), from: build(src)?, to: build(dst)? })
    }

    pub fn src(&self) -> &Crs { &self.src }

    pub fn dst(&self) -> &Crs { &self.dst }

    /// Transform one `(x, y)` coordinate. Geographic coordinates are degrees (x = longitude).
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        if self.src == self.dst { return Ok((x, y)) }

        let mut point = if self.src.is_geographic() { (x.to_radians(), y.to_radians(), 0.0) }
            else { (x, y, 0.0) };

        transform(&self.from, &self.to, &mut point)
            .map_err(|e| Error::Crs(format!("[crs::transform] transform {} -> {} failed at ({x}, {y}): {e:?}", self.src, self.dst)))?;

        if !point.0.is_finite() || !point.1.is_finite() {
            return Err(Error::Crs(format!("[crs::transform] transform {} -> {} is undefined at ({x}, {y})", self.src, self.dst)))
        }

        Ok(if self.dst.is_geographic() { (point.0.to_degrees(), point.1.to_degrees()) }
            else { (point.0, point.1) })
    }

    /// Transform both corners of `bbox`, keeping corner correspondence.
    pub fn transform_bbox(&self, bbox: &BoundingBox) -> Result<BoundingBox> {
        let (xmin, ymin) = self.transform_point(bbox.xmin, bbox.ymin)?;
        let (xmax, ymax) = self.transform_point(bbox.xmax, bbox.ymax)?;
        Ok(BoundingBox::new(xmin, ymin, xmax, ymax, self.dst.clone()))
    }
}

/// Reproject a bounding box to `dst`. Builds a fresh transformer; reuse a
/// [`CrsTransformer`] when converting many boxes.
pub fn reproject_bbox(bbox: &BoundingBox, dst: &Crs) -> Result<BoundingBox> {
    CrsTransformer::new(&bbox.crs, dst)?.transform_bbox(bbox)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn wgs84_to_web_mercator_origin() {
        let t = CrsTransformer::new(&Crs::wgs84(), &Crs::from_epsg(3857).unwrap()).unwrap();
        let (x, y) = t.transform_point(0.0, 0.0).unwrap();
        assert!(x.abs() < EPS && y.abs() < EPS);
    }

    #[test]
    fn bbox_round_trip() {
        let merc = Crs::from_epsg(3857).unwrap();
        let bbox = BoundingBox::new(12.45, 55.61, 12.65, 55.73, Crs::wgs84());
        let projected = reproject_bbox(&bbox, &merc).unwrap();
        assert!(projected.xmin < projected.xmax && projected.ymin < projected.ymax);

        let back = reproject_bbox(&projected, &Crs::wgs84()).unwrap();
        assert!((back.xmin - bbox.xmin).abs() < EPS);
        assert!((back.ymax - bbox.ymax).abs() < EPS);
    }

    #[test]
    fn keeps_corner_correspondence() {
        // Corners given max-first stay max-first after projection.
        let merc = Crs::from_epsg(3857).unwrap();
        let bbox = BoundingBox::new(10.0, 50.0, 9.0, 49.0, Crs::wgs84());
        let projected = reproject_bbox(&bbox, &merc).unwrap();
        assert!(projected.xmin > projected.xmax);
        assert!(projected.ymin > projected.ymax);
    }

    #[test]
    fn mollweide_round_trip() {
        let moll: Crs = "ESRI:54009".parse().unwrap();
        let t = CrsTransformer::new(&Crs::wgs84(), &moll).unwrap();
        let inv = CrsTransformer::new(&moll, &Crs::wgs84()).unwrap();
        let (x, y) = t.transform_point(12.57, 55.68).unwrap();
        let (lon, lat) = inv.transform_point(x, y).unwrap();
        assert!((lon - 12.57).abs() < EPS && (lat - 55.68).abs() < EPS);
    }
}

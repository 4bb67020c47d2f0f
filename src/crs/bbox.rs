use geo::{Coord, Rect};

use crate::crs::Crs;

/// An `(xmin, ymin, xmax, ymax)` box in a named CRS.
///
/// After reprojection the first corner is still the image of the original
/// `(xmin, ymin)` corner, which is not necessarily the smaller one. Use
/// [`BoundingBox::normalized`] before treating it as an extent.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub crs: Crs,
}

impl BoundingBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64, crs: Crs) -> Self {
        Self { xmin, ymin, xmax, ymax, crs }
    }

    /// Sort each axis so that min <= max.
    pub fn normalized(&self) -> Self {
        Self {
            xmin: self.xmin.min(self.xmax),
            ymin: self.ymin.min(self.ymax),
            xmax: self.xmin.max(self.xmax),
            ymax: self.ymin.max(self.ymax),
            crs: self.crs.clone(),
        }
    }

    /// Grow every side by `delta` (in CRS units).
    pub fn buffered(&self, delta: f64) -> Self {
        let b = self.normalized();
        Self::new(b.xmin - delta, b.ymin - delta, b.xmax + delta, b.ymax + delta, b.crs)
    }

    /// Smallest box covering both boxes. Both must share a CRS.
    pub fn union(&self, other: &Self) -> Self {
        let (a, b) = (self.normalized(), other.normalized());
        Self::new(a.xmin.min(b.xmin), a.ymin.min(b.ymin), a.xmax.max(b.xmax), a.ymax.max(b.ymax), a.crs)
    }

    pub fn width(&self) -> f64 { (self.xmax - self.xmin).abs() }

    pub fn height(&self) -> f64 { (self.ymax - self.ymin).abs() }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(Coord { x: self.xmin, y: self.ymin }, Coord { x: self.xmax, y: self.ymax })
    }

    pub fn from_rect(rect: Rect<f64>, crs: Crs) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y, crs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_sorts_each_axis() {
        let b = BoundingBox::new(5.0, -1.0, 2.0, 3.0, Crs::wgs84()).normalized();
        assert_eq!((b.xmin, b.ymin, b.xmax, b.ymax), (2.0, -1.0, 5.0, 3.0));
    }

    #[test]
    fn buffer_and_union() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0, Crs::wgs84());
        let b = BoundingBox::new(2.0, -1.0, 3.0, 0.5, Crs::wgs84());
        let u = a.union(&b);
        assert_eq!((u.xmin, u.ymin, u.xmax, u.ymax), (0.0, -1.0, 3.0, 1.0));

        let g = a.buffered(0.03);
        assert!((g.xmin + 0.03).abs() < 1e-12 && (g.ymax - 1.03).abs() < 1e-12);
        assert!((g.width() - 1.06).abs() < 1e-12);
    }
}

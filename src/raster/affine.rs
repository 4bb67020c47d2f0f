use crate::raster::Window;

/// Affine pixel-to-map transform, rasterio/GDAL convention:
/// `x = c + a * col + b * row`, `y = f + d * col + e * row`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform with its top-left corner at `(west, north)`.
    pub fn north_up(west: f64, north: f64, xres: f64, yres: f64) -> Self {
        Self::new(xres, 0.0, west, 0.0, -yres.abs(), north)
    }

    pub fn is_north_up(&self) -> bool { self.b == 0.0 && self.d == 0.0 }

    /// Map coordinate of an arbitrary (fractional) pixel position.
    #[inline]
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (self.c + self.a * col + self.b * row, self.f + self.d * col + self.e * row)
    }

    /// Map coordinate of the centre of pixel `(row, col)`.
    #[inline]
    pub fn xy(&self, row: usize, col: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Fractional `(col, row)` position of a map coordinate.
    pub fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let det = self.a * self.e - self.b * self.d;
        if det == 0.0 { return None }
        let (dx, dy) = (x - self.c, y - self.f);
        Some(((self.e * dx - self.b * dy) / det, (self.a * dy - self.d * dx) / det))
    }

    /// Integer `(row, col)` of the pixel containing a map coordinate.
    /// May be negative or past the raster edge.
    pub fn rowcol(&self, x: f64, y: f64) -> Option<(i64, i64)> {
        self.invert(x, y).map(|(col, row)| (row.floor() as i64, col.floor() as i64))
    }

    /// Transform of a window's top-left pixel.
    pub fn window_transform(&self, window: &Window) -> Self {
        let (c, f) = self.apply(window.col_off as f64, window.row_off as f64);
        Self { c, f, ..*self }
    }

    /// `(west, south, east, north)` of a `width x height` raster.
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(width as f64, 0.0),
            self.apply(0.0, height as f64),
            self.apply(width as f64, height as f64),
        ];
        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(w, s, e, n), &(x, y)| (w.min(x), s.min(y), e.max(x), n.max(y)),
        )
    }
}

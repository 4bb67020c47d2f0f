//! Library error types.

use thiserror::Error;

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Library error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A CRS label could not be resolved, or a coordinate failed to project.
    #[error("CRS error: {0}")]
    Crs(String),

    /// A crop window does not overlap the raster extent.
    #[error("bounds error: {0}")]
    Bounds(String),

    /// Malformed or unsupported raster content.
    #[error("raster error: {0}")]
    Raster(String),

    /// A coordinate is not a valid latitude/longitude pair.
    #[error("invalid coordinate: {0}")]
    Coordinate(String),

    /// A geometry variant the cell coverer does not handle.
    #[error("unimplemented geometry type: {0}")]
    UnsupportedGeometry(&'static str),

    /// Majority vote tie under the error-on-tie policy.
    #[error("tie between codes {0:?} in cell {1}")]
    Tie(Vec<u8>, h3o::CellIndex),

    /// Malformed table content (CSV columns, types).
    #[error("table error: {0}")]
    Table(String),

    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),
}

impl From<tiff::TiffError> for Error {
    fn from(e: tiff::TiffError) -> Self {
        match e {
            tiff::TiffError::IoError(e) => Self::Io(e),
            other => Self::Raster(other.to_string()),
        }
    }
}

impl From<polars::error::PolarsError> for Error {
    fn from(e: polars::error::PolarsError) -> Self {
        Self::Table(e.to_string())
    }
}

impl From<h3o::error::InvalidLatLng> for Error {
    fn from(e: h3o::error::InvalidLatLng) -> Self {
        Self::Coordinate(e.to_string())
    }
}

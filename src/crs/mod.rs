mod bbox;
mod crs;
mod transform;

pub use bbox::BoundingBox;
pub use crs::Crs;
pub use transform::{reproject_bbox, CrsTransformer};

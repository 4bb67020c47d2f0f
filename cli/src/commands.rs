pub mod destinations;
pub mod origins;

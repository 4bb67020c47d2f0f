//! Destinations: categorized points of interest on H3 cells.

mod categorize;
mod category;
mod poi;
mod table;

pub use categorize::Categorizer;
pub use category::{Category, CategoryMap, CategorySet};
pub use poi::{PoiRecord, TagFilter};
pub use table::{DestinationRow, DestinationsTable};

//! Origins: GHSL built-up classes aggregated to H3 cells.

mod aggregate;
mod ghsl;
mod table;
mod vote;

pub use aggregate::{aggregate, aggregate_raster_file};
pub use ghsl::GhslClass;
pub use table::{OriginRow, OriginsTable};
pub use vote::{majority_vote, TieBreak};

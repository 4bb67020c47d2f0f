//! Origins and destinations tables as CSV.

mod read;
mod write;

pub(crate) use read::*;
pub(crate) use write::*;

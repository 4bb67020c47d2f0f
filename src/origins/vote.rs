use h3o::CellIndex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{origins::GhslClass, Error, Result};

/// What to do when two or more codes share the highest count in a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The tied code seen first in scan order.
    FirstWins,
    /// Uniformly among all tied codes.
    #[default]
    Random,
    /// Fail with [`Error::Tie`].
    Error,
}

/// The most frequent code among `codes`. A strict winner is returned as is;
/// ties go to `policy`. Counts keep first-seen order.
pub fn majority_vote<R: Rng + ?Sized>(
    cell: CellIndex,
    codes: &[GhslClass],
    policy: TieBreak,
    rng: &mut R,
) -> Result<GhslClass> {
    let mut counts: SmallVec<[(GhslClass, u32); 10]> = SmallVec::new();
    for &code in codes {
        match counts.iter_mut().find(|(c, _)| *c == code) {
            Some((_, n)) => *n += 1,
            None => counts.push((code, 1)),
        }
    }

    let top = counts.iter().map(|&(_, n)| n).max()
        .ok_or_else(|| Error::Raster(format!("[origins::vote] no codes for cell {cell}")))?;
    let tied = counts.iter()
        .filter(|&&(_, n)| n == top)
        .map(|&(c, _)| c)
        .collect::<SmallVec<[GhslClass; 10]>>();

    if tied.len() == 1 {
        return Ok(tied[0])
    }
    match policy {
        TieBreak::FirstWins => Ok(tied[0]),
        TieBreak::Random => Ok(tied[rng.random_range(0..tied.len())]),
        TieBreak::Error => Err(Error::Tie(tied.iter().map(|c| c.code()).collect(), cell)),
    }
}

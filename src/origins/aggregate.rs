use std::{collections::BTreeMap, path::Path};

use h3o::{CellIndex, LatLng, Resolution};
use log::debug;
use rand::Rng;

use crate::{
    crs::Crs,
    io::geotiff::read_geotiff,
    origins::{majority_vote, GhslClass, OriginRow, OriginsTable, TieBreak},
    raster::{GeoTransform, RasterGrid},
    Error, Result,
};

/// Aggregate a geographic raster of GHSL codes to cells: every relevant
/// pixel votes for the cell containing its centre, and each cell keeps its
/// most frequent code. Rows come out ordered by cell.
pub fn aggregate<R: Rng + ?Sized>(
    grid: &RasterGrid,
    resolution: Resolution,
    policy: TieBreak,
    rng: &mut R,
) -> Result<OriginsTable> {
    if !grid.crs().is_geographic() {
        return Err(Error::Crs(format!("[origins::aggregate] raster must be geographic, got {}", grid.crs())))
    }

    let mut votes: BTreeMap<CellIndex, Vec<GhslClass>> = BTreeMap::new();
    let mut skipped = 0usize;
    for ((row, col), &code) in grid.data().indexed_iter() {
        if grid.nodata() == Some(code) {
            skipped += 1;
            continue
        }
        let Some(class) = GhslClass::relevant(code) else {
            skipped += 1;
            continue
        };
        let (lng, lat) = grid.transform().xy(row, col);
        let cell = LatLng::new(lat, lng)
            .map_err(|e| Error::Coordinate(format!("[origins::aggregate] pixel ({row}, {col}) at ({lat}, {lng}): {e}")))?
            .to_cell(resolution);
        votes.entry(cell).or_default().push(class);
    }
    debug!("[origins::aggregate] {} pixels voted into {} cells, {skipped} skipped",
        grid.width() * grid.height() - skipped, votes.len());

    let rows = votes.into_iter()
        .map(|(cell, codes)| Ok(OriginRow { cell, class: majority_vote(cell, &codes, policy, rng)? }))
        .collect::<Result<Vec<_>>>()?;
    OriginsTable::new(rows)
}

/// Load a reprojected raster and aggregate it, using `transform` in place of
/// the file's own georeferencing. `crs` overrides the file's CRS when given.
pub fn aggregate_raster_file<R: Rng + ?Sized>(
    path: &Path,
    transform: &GeoTransform,
    crs: Option<&Crs>,
    resolution: Resolution,
    policy: TieBreak,
    rng: &mut R,
) -> Result<OriginsTable> {
    let grid = read_geotiff(path, crs)?.with_transform(*transform);
    aggregate(&grid, resolution, policy, rng)
}

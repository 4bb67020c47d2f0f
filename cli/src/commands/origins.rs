use anyhow::{Context, Result};
use odhex::{
    assemble::{city_boundaries, CityGeocoder, GeoJsonGeocoder},
    cache::DiskCache,
    hex::boundary_geojson,
    OriginsAssembler, PipelineConfig,
};

pub fn run(cli: &crate::cli::Cli, mut config: PipelineConfig, args: &crate::cli::OriginsArgs) -> Result<()> {
    if let Some(raster) = &args.raster {
        config.raster_path = raster.clone();
    }
    let cities = &args.city.cities;
    let geocoder = GeoJsonGeocoder::new(&args.city.boundaries);

    let cache = DiskCache::new(&config.resources_root);
    let mut assembler = OriginsAssembler::new(&config, cache)
        .context("[origins] invalid configuration")?;

    let table = match &args.boundary_geojson {
        // outlines are written even on a cache hit
        Some(out) => {
            let area = city_boundaries(&geocoder.geocode(cities)?, config.boundary_resolution()?, config.poi_bbox_buffer)?;
            std::fs::write(out, boundary_geojson(area.cells.iter())?)
                .with_context(|| format!("[origins] failed to write {}", out.display()))?;
            assembler.assemble_area(cities, &area)?
        }
        None => assembler.assemble(&geocoder, cities)?,
    };

    if cli.verbose > 0 {
        let residential = table.rows().iter().filter(|row| row.residential() == 1).count();
        eprintln!("[origins] {} cells ({residential} residential) for {}", table.len(), cities.join(", "));
    }
    if let Some(out) = &args.city.output {
        table.write_csv(out)
            .with_context(|| format!("[origins] failed to write {}", out.display()))?;
    }
    Ok(())
}

use anyhow::{Context, Result};
use odhex::{
    assemble::{GeoJsonGeocoder, GeoJsonPoiSource},
    cache::DiskCache,
    DestinationsAssembler, PipelineConfig,
};

pub fn run(cli: &crate::cli::Cli, config: PipelineConfig, args: &crate::cli::DestinationsArgs) -> Result<()> {
    let cities = &args.city.cities;
    let geocoder = GeoJsonGeocoder::new(&args.city.boundaries);

    let cache = DiskCache::new(&config.resources_root);
    let mut assembler = DestinationsAssembler::new(&config, cache)
        .context("[destinations] invalid configuration")?;
    let table = assembler.assemble(&geocoder, &GeoJsonPoiSource, &args.pois, cities)?;

    if cli.verbose > 0 {
        eprintln!("[destinations] {} rows for {}", table.len(), cities.join(", "));
    }
    if let Some(out) = &args.city.output {
        table.write_csv(out)
            .with_context(|| format!("[destinations] failed to write {}", out.display()))?;
    }
    Ok(())
}

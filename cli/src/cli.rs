use std::path::PathBuf;

/// Origins and destinations on an H3 grid
#[derive(clap::Parser, Debug)]
#[command(name = "odhex", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Pipeline config (JSON); defaults apply when omitted
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Residential/non-residential cells from the GHSL raster, inside the city boundary
    Origins(OriginsArgs),

    /// Categorized POI cells from a map-data extract
    Destinations(DestinationsArgs),
}

#[derive(clap::Args, Debug)]
pub struct CityArgs {
    /// City names, e.g. Copenhagen Frederiksberg
    #[arg(required = true)]
    pub cities: Vec<String>,

    /// City outlines (GeoJSON with a `name` property per feature)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub boundaries: PathBuf,

    /// Also write the output table here (CSV)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct OriginsArgs {
    #[command(flatten)]
    pub city: CityArgs,

    /// GHSL raster, overrides `raster_path` from the config
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub raster: Option<PathBuf>,

    /// Write the boundary cell outlines (GeoJSON) for inspection
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub boundary_geojson: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DestinationsArgs {
    #[command(flatten)]
    pub city: CityArgs,

    /// POI extract (GeoJSON with amenity/shop/leisure/tags properties)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub pois: PathBuf,
}

use std::path::{Path, PathBuf};

use h3o::{LatLng, Resolution};
use odhex::{
    assemble::{GeoJsonGeocoder, GeoJsonPoiSource},
    cache::{CacheCategory, CachePaths, DiskCache, MemCache, Stage, TableCache},
    crs::{BoundingBox, Crs},
    destinations::{CategoryMap, CategorySet, TagFilter},
    origins::{aggregate_raster_file, GhslClass, OriginsTable, TieBreak},
    raster::{crop_raster, reproject_raster, GeoTransform, RasterGrid, Window},
    read_geotiff, write_geotiff, DestinationsAssembler, OriginsAssembler, PipelineConfig,
};
use rand::{rngs::StdRng, SeedableRng};

const CITY: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {"name": "Testby"},
     "geometry": {"type": "Polygon", "coordinates": [[[12.45, 55.65], [12.55, 55.65], [12.45, 55.75], [12.45, 55.65]]]}}
]}"#;

const POIS: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {"amenity": "restaurant"}, "geometry": {"type": "Point", "coordinates": [12.48, 55.68]}},
    {"type": "Feature", "properties": {"amenity": "school"}, "geometry": {"type": "Point", "coordinates": [12.47, 55.67]}},
    {"type": "Feature", "properties": {"shop": "supermarket"}, "geometry": {"type": "Point", "coordinates": [12.49, 55.69]}},
    {"type": "Feature", "properties": {"amenity": "school"}, "geometry": {"type": "Point", "coordinates": [10.20, 56.15]}}
]}"#;

/// 40 x 40 pixels of 0.005 degrees from (12.40, 55.60) to (12.60, 55.80);
/// mostly residential with a non-residential band and some open space.
fn ghsl_grid() -> RasterGrid {
    let values = (0..40 * 40).map(|i| {
        let (row, col) = (i / 40, i % 40);
        match (row, col) {
            (_, c) if c % 9 == 0 => 1,
            (r, _) if r % 4 == 0 => 23,
            _ => 12,
        }
    }).collect::<Vec<u8>>();
    let transform = GeoTransform::north_up(12.40, 55.80, 0.005, 0.005);
    RasterGrid::from_vec(40, 40, values, Crs::wgs84(), transform, Some(0)).unwrap()
}

struct Fixture {
    dir: tempfile::TempDir,
    raster: PathBuf,
    cities: PathBuf,
    pois: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let raster = dir.path().join("ghsl.tif");
        write_geotiff(&ghsl_grid(), &raster).unwrap();
        let cities = dir.path().join("cities.geojson");
        std::fs::write(&cities, CITY).unwrap();
        let pois = dir.path().join("pois.geojson");
        std::fs::write(&pois, POIS).unwrap();
        Self { dir, raster, cities, pois }
    }

    fn resources(&self) -> PathBuf { self.dir.path().join("resources") }

    fn config(&self) -> PipelineConfig {
        PipelineConfig {
            resources_root: self.resources(),
            h3_resolution: 8,
            boundary_resolution: 9,
            raster_path: self.raster.clone(),
            target_crs: Crs::wgs84(),
            tie_break: TieBreak::FirstWins,
            seed: Some(7),
            category_set: ["education", "grocery"].into_iter().collect::<CategorySet>(),
            tag_mapping: [("school", "education"), ("supermarket", "grocery")].into_iter().collect::<CategoryMap>(),
            tag_filter: TagFilter::new().with("amenity", Vec::<String>::new()).with("shop", Vec::<String>::new()),
            ..Default::default()
        }
    }
}

fn cities() -> Vec<String> { vec!["Testby".to_string()] }

#[test]
fn aggregation_of_a_geotiff_majority() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.tif");
    let transform = GeoTransform::north_up(12.500, 55.700, 0.001, 0.001);
    let grid = RasterGrid::from_vec(2, 2, vec![11, 21, 11, 99], Crs::wgs84(), transform, None).unwrap();
    write_geotiff(&grid, &path).unwrap();

    let table = aggregate_raster_file(&path, &transform, None, Resolution::Two, TieBreak::Random, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(table.len(), 1);
    let row = table.rows()[0];
    assert_eq!(row.cell, LatLng::new(55.6995, 12.5005).unwrap().to_cell(Resolution::Two));
    assert_eq!(row.class, GhslClass::ResidentialUpTo3m);
    assert_eq!(row.residential(), 1);
}

#[test]
fn crop_then_reproject_keeps_the_footprint() {
    let fixture = Fixture::new();
    let subset = fixture.dir.path().join("subset.tif");
    let bbox = BoundingBox::new(12.45, 55.65, 12.55, 55.75, Crs::wgs84());
    let window = crop_raster(&fixture.raster, &subset, &bbox, &Crs::wgs84(), &Crs::wgs84()).unwrap();
    assert_eq!(window, Window { col_off: 10, row_off: 10, width: 20, height: 20 });

    let cropped = read_geotiff(&subset, None).unwrap();
    assert_eq!(cropped, ghsl_grid().crop(&window).unwrap());

    let merc = Crs::from_epsg(3857).unwrap();
    let there = fixture.dir.path().join("merc.tif");
    reproject_raster(&subset, &merc, &there).unwrap();
    let back = fixture.dir.path().join("back.tif");
    let transform = reproject_raster(&there, &Crs::wgs84(), &back).unwrap();

    let round_trip = read_geotiff(&back, None).unwrap();
    let (w, s, e, n) = transform.bounds(round_trip.width(), round_trip.height());
    let pixel = 0.005;
    for (got, want) in [(w, 12.45), (s, 55.65), (e, 12.55), (n, 55.75)] {
        assert!((got - want).abs() <= pixel, "{got} vs {want}");
    }
}

#[test]
fn origins_are_filtered_to_the_city() {
    let fixture = Fixture::new();
    let config = fixture.config();
    let geocoder = GeoJsonGeocoder::new(&fixture.cities);

    let mut assembler = OriginsAssembler::new(&config, DiskCache::new(fixture.resources())).unwrap();
    let table = assembler.assemble(&geocoder, &cities()).unwrap();

    let paths = CachePaths::new(CacheCategory::Origins, &cities());
    for stage in [Stage::Subset, Stage::Reprojected, Stage::Codes, Stage::Clean] {
        assert!(paths.path(&fixture.resources(), stage).is_file(), "{stage:?} not written");
    }

    let codes = OriginsTable::read_csv(&paths.path(&fixture.resources(), Stage::Codes)).unwrap();
    assert!(!table.is_empty());
    assert!(table.len() < codes.len(), "cells outside the triangle should be dropped");
    assert!(table.rows().iter().all(|row| codes.get(row.cell) == Some(row)));
    assert!(table.rows().iter().all(|row| row.class.is_relevant()));
}

#[test]
fn declared_raster_crs_beats_the_default() {
    let fixture = Fixture::new();
    let config = fixture.config();
    assert_eq!(config.raster_crs, Some(Crs::mollweide()));

    let mut assembler = OriginsAssembler::new(&config, MemCache::new()).unwrap();
    assert_eq!(assembler.native_crs().unwrap(), Crs::wgs84());
    let table = assembler.assemble(&GeoJsonGeocoder::new(&fixture.cities), &cities()).unwrap();
    assert!(!table.is_empty());

    let subset = CachePaths::new(CacheCategory::Origins, &cities()).path(&fixture.resources(), Stage::Subset);
    let cropped = read_geotiff(&subset, None).unwrap();
    assert_eq!(cropped.crs(), &Crs::wgs84());
    assert_eq!((cropped.width(), cropped.height()), (20, 20));
}

#[test]
fn cached_origins_skip_the_raster() {
    let fixture = Fixture::new();
    let config = fixture.config();
    let geocoder = GeoJsonGeocoder::new(&fixture.cities);

    let first = OriginsAssembler::new(&config, DiskCache::new(fixture.resources())).unwrap()
        .assemble(&geocoder, &cities()).unwrap();
    let clean = CachePaths::new(CacheCategory::Origins, &cities()).path(&fixture.resources(), Stage::Clean);
    let bytes = std::fs::read(&clean).unwrap();

    // a raster that does not exist proves the second call never reads one
    let missing = PipelineConfig { raster_path: fixture.dir.path().join("missing.tif"), ..config.clone() };
    let second = OriginsAssembler::new(&missing, DiskCache::new(fixture.resources())).unwrap()
        .assemble(&geocoder, &cities()).unwrap();

    assert_eq!(first, second);
    assert_eq!(std::fs::read(&clean).unwrap(), bytes);

    let fresh = OriginsAssembler::new(&missing, MemCache::new()).unwrap().assemble(&geocoder, &cities());
    assert!(fresh.is_err());
}

#[test]
fn fingerprinted_cache_misses_on_changed_config() {
    let fixture = Fixture::new();
    let config = PipelineConfig { fingerprint_cache: true, ..fixture.config() };
    let geocoder = GeoJsonGeocoder::new(&fixture.cities);

    let mut cache = MemCache::new();
    OriginsAssembler::new(&config, &mut cache).unwrap().assemble(&geocoder, &cities()).unwrap();
    assert_eq!(cache.len(), 1);

    let coarser = PipelineConfig { h3_resolution: 7, ..config.clone() };
    let assembler = OriginsAssembler::new(&coarser, &mut cache).unwrap();
    assert!(assembler.cached(&cities()).unwrap().is_none());
}

#[test]
fn destinations_drop_unlisted_categories() {
    let fixture = Fixture::new();
    let config = fixture.config();
    let geocoder = GeoJsonGeocoder::new(&fixture.cities);

    let mut cache = MemCache::new();
    let table = DestinationsAssembler::new(&config, &mut cache).unwrap()
        .assemble(&geocoder, &GeoJsonPoiSource, &fixture.pois, &cities())
        .unwrap();

    let mut categories = table.rows().iter().map(|row| row.category.as_str()).collect::<Vec<_>>();
    categories.sort_unstable();
    // the restaurant is unmapped and unlisted; the far school is outside the query box
    assert_eq!(categories, ["education", "grocery"]);

    let school = LatLng::new(55.67, 12.47).unwrap().to_cell(Resolution::Eight);
    assert!(table.rows().iter().any(|row| row.cell == school && row.category == "education"));

    let key = CachePaths::new(CacheCategory::Destinations, &cities()).key(Stage::Clean);
    assert!(cache.has(&key));
    assert!(String::from_utf8_lossy(&cache.get(&key).unwrap().unwrap()).starts_with("h3_index,category\n"));
}

#[test]
fn config_file_drives_the_pipeline() {
    let fixture = Fixture::new();
    let path = fixture.dir.path().join("config.json");
    std::fs::write(&path, fixture.config().to_json().unwrap()).unwrap();

    let config = PipelineConfig::from_path(&path).unwrap();
    assert_eq!(config, fixture.config());
    assert!(PipelineConfig::from_path(Path::new("/nonexistent/config.json")).is_err());
}

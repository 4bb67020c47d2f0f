use std::{fmt, path::{Path, PathBuf}};

/// Which pipeline a cache entry belongs to; also its directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    Origins,
    Destinations,
}

impl CacheCategory {
    pub fn dir(self) -> &'static str {
        match self {
            CacheCategory::Origins => "origins",
            CacheCategory::Destinations => "destinations",
        }
    }
}

/// Persisted pipeline stages, each with a fixed suffix and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Raster window cut from the source raster.
    Subset,
    /// Subset warped to the target CRS.
    Reprojected,
    /// Aggregated cell codes before boundary filtering.
    Codes,
    /// Final table.
    Clean,
}

impl Stage {
    pub fn suffix(self) -> &'static str {
        match self {
            Stage::Subset => "subset",
            Stage::Reprojected => "reprojected",
            Stage::Codes => "codes",
            Stage::Clean => "clean",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Stage::Subset | Stage::Reprojected => "tif",
            Stage::Codes | Stage::Clean => "csv",
        }
    }
}

/// Relative, path-shaped cache key: `<category>/<stem>_<stage>[_<fingerprint>].<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str { &self.0 }

    pub fn to_path(&self, root: &Path) -> PathBuf { root.join(&self.0) }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Builds every stage key for one set of cities, so writers and existence
/// checks agree on names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    category: CacheCategory,
    stem: String,
    fingerprint: Option<String>,
}

/// Hex digits of the fingerprint kept in file names.
const FINGERPRINT_LEN: usize = 16;

impl CachePaths {
    /// The stem is the city names, sorted and joined with `_`.
    pub fn new<S: AsRef<str>>(category: CacheCategory, cities: &[S]) -> Self {
        let mut names = cities.iter().map(|c| c.as_ref().trim()).collect::<Vec<_>>();
        names.sort_unstable();
        Self { category, stem: names.join("_"), fingerprint: None }
    }

    /// Tie every key to an input fingerprint (hex digest; truncated).
    pub fn with_fingerprint(mut self, fingerprint: &str) -> Self {
        self.fingerprint = Some(fingerprint.chars().take(FINGERPRINT_LEN).collect());
        self
    }

    pub fn category(&self) -> CacheCategory { self.category }

    pub fn stem(&self) -> &str { &self.stem }

    pub fn key(&self, stage: Stage) -> CacheKey {
        let fingerprint = self.fingerprint.as_deref().map(|fp| format!("_{fp}")).unwrap_or_default();
        CacheKey(format!("{}/{}_{}{fingerprint}.{}", self.category.dir(), self.stem, stage.suffix(), stage.extension()))
    }

    pub fn path(&self, root: &Path, stage: Stage) -> PathBuf { self.key(stage).to_path(root) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_sorted_and_joined() {
        let paths = CachePaths::new(CacheCategory::Origins, &["Frederiksberg", "Copenhagen"]);
        assert_eq!(paths.key(Stage::Subset).as_str(), "origins/Copenhagen_Frederiksberg_subset.tif");
        assert_eq!(paths.key(Stage::Reprojected).as_str(), "origins/Copenhagen_Frederiksberg_reprojected.tif");
        assert_eq!(paths.key(Stage::Codes).as_str(), "origins/Copenhagen_Frederiksberg_codes.csv");
        assert_eq!(
            paths.path(Path::new("/res"), Stage::Clean),
            PathBuf::from("/res/origins/Copenhagen_Frederiksberg_clean.csv"),
        );
    }

    #[test]
    fn order_of_cities_does_not_matter() {
        let a = CachePaths::new(CacheCategory::Destinations, &["b", "a"]);
        let b = CachePaths::new(CacheCategory::Destinations, &["a", "b"]);
        assert_eq!(a.key(Stage::Clean), b.key(Stage::Clean));
        assert_eq!(a.key(Stage::Clean).as_str(), "destinations/a_b_clean.csv");
    }

    #[test]
    fn fingerprint_is_appended() {
        let paths = CachePaths::new(CacheCategory::Destinations, &["Aarhus"])
            .with_fingerprint("0123456789abcdef0123456789abcdef");
        assert_eq!(paths.key(Stage::Clean).as_str(), "destinations/Aarhus_clean_0123456789abcdef.csv");
    }
}

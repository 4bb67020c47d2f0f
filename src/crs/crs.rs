use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Mollweide on WGS84, the native CRS of the GHSL built-up rasters.
const ESRI_54009: &str = "+proj=moll +lon_0=0 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs +type=crs";

/// A named coordinate reference system with its PROJ.4 definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Crs {
    label: String,
    proj4: String,
}

impl Crs {
    /// WGS84 longitude/latitude.
    pub fn wgs84() -> Self {
        Self::from_epsg(4326).expect("EPSG:4326 is always defined")
    }

    /// ESRI:54009, World Mollweide.
    pub fn mollweide() -> Self {
        Self::custom("ESRI:54009", ESRI_54009)
    }

    /// Resolve an EPSG code through the crs-definitions database.
    pub fn from_epsg(code: u16) -> Result<Self> {
        let def = crs_definitions::from_code(code)
            .ok_or_else(|| Error::Crs(format!("[crs] EPSG:{code} is not in the crs-definitions database")))?;
        Ok(Self { label: format!("EPSG:{code}"), proj4: def.proj4.to_string() })
    }

    /// A CRS with an explicit PROJ.4 definition, e.g. one read back from a GeoTIFF.
    pub fn custom(label: impl Into<String>, proj4: impl Into<String>) -> Self {
        Self { label: label.into(), proj4: proj4.into() }
    }

    pub fn label(&self) -> &str { &self.label }

    pub fn proj4(&self) -> &str { &self.proj4 }

    /// The EPSG code, if the label is an EPSG label.
    pub fn epsg(&self) -> Option<u16> {
        self.label.strip_prefix("EPSG:").and_then(|code| code.parse().ok())
    }

    /// Geographic CRSs take and return degrees; proj4rs works in radians for them.
    pub fn is_geographic(&self) -> bool {
        self.proj4.contains("+proj=longlat") || self.proj4.contains("+proj=latlong")
    }
}

impl FromStr for Crs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim().to_ascii_uppercase();
        if let Some(code) = label.strip_prefix("EPSG:") {
            let code = code.parse::<u16>()
                .map_err(|_| Error::Crs(format!("[crs] invalid EPSG code: {s}")))?;
            return Self::from_epsg(code);
        }
        match label.as_str() {
            "ESRI:54009" => Ok(Self::mollweide()),
            _ => Err(Error::Crs(format!("[crs] unknown CRS label: {s}"))),
        }
    }
}

impl TryFrom<String> for Crs {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self { crs.label }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.label) }
}

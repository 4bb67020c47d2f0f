use std::fmt;

use crate::{Error, Result};

/// GHSL built-up characteristics classes (GHS-BUILT-C, MSZ layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum GhslClass {
    LowVegetation = 1,
    MediumVegetation = 2,
    HighVegetation = 3,
    Water = 4,
    Road = 5,
    ResidentialUpTo3m = 11,
    Residential3To6m = 12,
    Residential6To15m = 13,
    Residential15To30m = 14,
    ResidentialOver30m = 15,
    NonResidentialUpTo3m = 21,
    NonResidential3To6m = 22,
    NonResidential6To15m = 23,
    NonResidential15To30m = 24,
    NonResidentialOver30m = 25,
}

impl GhslClass {
    pub const ALL: [GhslClass; 15] = [
        Self::LowVegetation, Self::MediumVegetation, Self::HighVegetation, Self::Water, Self::Road,
        Self::ResidentialUpTo3m, Self::Residential3To6m, Self::Residential6To15m,
        Self::Residential15To30m, Self::ResidentialOver30m,
        Self::NonResidentialUpTo3m, Self::NonResidential3To6m, Self::NonResidential6To15m,
        Self::NonResidential15To30m, Self::NonResidentialOver30m,
    ];

    pub fn code(self) -> u8 { self as u8 }

    /// Built spaces (11-15, 21-25) are the only classes kept as origins.
    pub fn is_relevant(self) -> bool { self.code() >= 11 }

    /// 11-15 residential, everything else not.
    pub fn is_residential(self) -> bool { (11..=15).contains(&self.code()) }

    /// The `residential_bool` column value.
    pub fn residential(self) -> u8 { self.is_residential() as u8 }

    /// Relevant class for a raw pixel code, `None` for open spaces,
    /// nodata, and codes outside the vocabulary.
    pub fn relevant(code: u8) -> Option<Self> {
        Self::try_from(code).ok().filter(|class| class.is_relevant())
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::LowVegetation => "open spaces, low vegetation surfaces NDVI <= 0.3",
            Self::MediumVegetation => "open spaces, medium vegetation surfaces 0.3 < NDVI <= 0.5",
            Self::HighVegetation => "open spaces, high vegetation surfaces NDVI > 0.5",
            Self::Water => "open spaces, water surfaces LAND < 0.5",
            Self::Road => "open spaces, road surfaces",
            Self::ResidentialUpTo3m => "built spaces, residential, building height <= 3m",
            Self::Residential3To6m => "built spaces, residential, 3m < building height <= 6m",
            Self::Residential6To15m => "built spaces, residential, 6m < building height <= 15m",
            Self::Residential15To30m => "built spaces, residential, 15m < building height <= 30m",
            Self::ResidentialOver30m => "built spaces, residential, building height > 30m",
            Self::NonResidentialUpTo3m => "built spaces, non-residential, building height <= 3m",
            Self::NonResidential3To6m => "built spaces, non-residential, 3m < building height <= 6m",
            Self::NonResidential6To15m => "built spaces, non-residential, 6m < building height <= 15m",
            Self::NonResidential15To30m => "built spaces, non-residential, 15m < building height <= 30m",
            Self::NonResidentialOver30m => "built spaces, non-residential, building height > 30m",
        }
    }
}

impl TryFrom<u8> for GhslClass {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Self::ALL.into_iter()
            .find(|class| class.code() == code)
            .ok_or_else(|| Error::Raster(format!("[origins::ghsl] unknown GHSL code {code}")))
    }
}

impl From<GhslClass> for u8 {
    fn from(class: GhslClass) -> Self { class.code() }
}

impl fmt::Display for GhslClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02} : {}", self.code(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevant_set_is_built_spaces() {
        let relevant = GhslClass::ALL.iter().filter(|c| c.is_relevant()).map(|c| c.code()).collect::<Vec<_>>();
        assert_eq!(relevant, vec![11, 12, 13, 14, 15, 21, 22, 23, 24, 25]);
    }

    #[test]
    fn residential_flag_follows_code() {
        for code in 11..=15 {
            assert_eq!(GhslClass::relevant(code).unwrap().residential(), 1);
        }
        for code in 21..=25 {
            assert_eq!(GhslClass::relevant(code).unwrap().residential(), 0);
        }
    }

    #[test]
    fn irrelevant_codes_are_discarded() {
        for code in [0, 1, 5, 6, 10, 16, 20, 26, 99, 255] {
            assert_eq!(GhslClass::relevant(code), None, "code {code}");
        }
        assert!(GhslClass::try_from(4).is_ok());
        assert!(GhslClass::try_from(99).is_err());
    }

    #[test]
    fn display_has_code_and_label() {
        assert_eq!(GhslClass::Residential6To15m.to_string(), "13 : built spaces, residential, 6m < building height <= 15m");
    }
}

//! Coordinate reference system identifiers.

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Epsg(u16);

impl Epsg {
    pub const fn new(code: u16) -> Self {
        Epsg(code)
    }

    pub const fn code(&self) -> u16 {
        self.0
    }
}

impl From<u16> for Epsg {
    fn from(code: u16) -> Self {
        Epsg(code)
    }
}

impl From<Epsg> for u16 {
    fn from(epsg: Epsg) -> Self {
        epsg.0
    }
}

impl std::fmt::Display for Epsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl std::str::FromStr for Epsg {
    type Err = Error;

    /// Parses `EPSG:<code>` (case insensitive prefix) or a bare numeric code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let code = match trimmed.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("EPSG:") => &trimmed[5..],
            _ => trimmed,
        };

        code.parse::<u16>()
            .map(Epsg)
            .map_err(|_| Error::InvalidArgument(format!("Invalid EPSG identifier: '{s}'")))
    }
}

pub mod epsg {
    use super::Epsg;

    pub const WGS84: Epsg = Epsg(4326);
    pub const WGS84_WEB_MERCATOR: Epsg = Epsg(3857);
    pub const BELGIAN_LAMBERT72: Epsg = Epsg(31370);
    pub const BELGE72_GEO: Epsg = Epsg(4313);
    pub const ETRS89: Epsg = Epsg(4258);
    pub const ETRS89_LAEA: Epsg = Epsg(3035);
}

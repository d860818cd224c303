//! The static WIND Toolkit region catalog and the canonical file path layout
//! derived from it.

use crate::regions::error::RegionError;
use crate::types::lat_lon::LatLon;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

const WTK_CATALOG: &str = include_str!("wtk.json");
const BASE_PATH: &str = "/nrel/wtk/";

/// The only resolution that is stored under its own region directory.
pub const FIVE_MINUTE_RESOLUTION: &str = "5min";

static CATALOG: OnceLock<RegionCatalog> = OnceLock::new();

/// Metadata for a single WTK region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// First and last available year, inclusive.
    pub year_range: (i32, i32),
    /// Allowed resolutions, e.g. `"hourly"` and `"5min"`.
    pub resolutions: BTreeSet<String>,
    /// `((lat_min, lat_max), (lon_min, lon_max))`, inclusive.
    pub lat_lon_range: ((f64, f64), (f64, f64)),
    /// File name prefix used instead of `wtk_{region}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

impl Region {
    pub fn has_year(&self, year: i32) -> bool {
        (self.year_range.0..=self.year_range.1).contains(&year)
    }

    pub fn contains(&self, location: LatLon) -> bool {
        let ((lat_min, lat_max), (lon_min, lon_max)) = self.lat_lon_range;
        (lat_min..=lat_max).contains(&location.0) && (lon_min..=lon_max).contains(&location.1)
    }

    /// The most recent year with data for this region.
    pub fn latest_year(&self) -> i32 {
        self.year_range.1
    }
}

/// Immutable mapping of region identifier to [`Region`], ordered by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCatalog {
    regions: BTreeMap<String, Region>,
}

impl RegionCatalog {
    /// Parses a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, RegionError> {
        serde_json::from_str(json).map_err(RegionError::CatalogParse)
    }

    pub fn get(&self, region: &str) -> Option<&Region> {
        self.regions.get(region)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Region)> {
        self.regions.iter().map(|(name, region)| (name.as_str(), region))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Builds the archive path of the file holding `region` data for `year`.
    ///
    /// The format is `/nrel/wtk/{region}[-5min]/{base or wtk_region}_{year}.h5`.
    ///
    /// # Errors
    ///
    /// * [`RegionError::RegionNotFound`] if the region is not in the catalog.
    /// * [`RegionError::YearNotAvailable`] if `year` is outside the region's year range.
    /// * [`RegionError::ResolutionNotAvailable`] if `resolution` is given but not offered.
    pub fn build_path(
        &self,
        region: &str,
        year: i32,
        resolution: Option<&str>,
    ) -> Result<String, RegionError> {
        let entry = self
            .get(region)
            .ok_or_else(|| RegionError::RegionNotFound(region.to_string()))?;

        if !entry.has_year(year) {
            return Err(RegionError::YearNotAvailable {
                region: region.to_string(),
                year,
            });
        }

        if let Some(resolution) = resolution {
            if !entry.resolutions.contains(resolution) {
                return Err(RegionError::ResolutionNotAvailable {
                    region: region.to_string(),
                    resolution: resolution.to_string(),
                });
            }
        }

        let url_region = match resolution {
            Some(FIVE_MINUTE_RESOLUTION) => format!("{}-{}/", region, FIVE_MINUTE_RESOLUTION),
            _ => format!("{}/", region),
        };

        let file = match &entry.base {
            Some(base) => format!("{}_{}.h5", base, year),
            None => format!("wtk_{}_{}.h5", region, year),
        };

        Ok(format!("{}{}{}", BASE_PATH, url_region, file))
    }

    /// Returns every region whose bounding box contains `location`, boundaries included.
    ///
    /// # Errors
    ///
    /// * [`RegionError::InvalidLatLon`] if a coordinate is not finite.
    /// * [`RegionError::NoRegionForPoint`] if no region matches.
    pub fn identify(&self, location: LatLon) -> Result<Vec<String>, RegionError> {
        let location = location.validate()?;
        let matches: Vec<String> = self
            .iter()
            .filter(|(_, region)| region.contains(location))
            .map(|(name, _)| name.to_string())
            .collect();

        if matches.is_empty() {
            return Err(RegionError::NoRegionForPoint);
        }
        debug!("Regions containing {}: {:?}", location, matches);
        Ok(matches)
    }
}

/// Returns the process-wide WTK region catalog, parsing it on first use.
pub fn get_regions() -> Result<&'static RegionCatalog, RegionError> {
    if let Some(catalog) = CATALOG.get() {
        return Ok(catalog);
    }
    let parsed = RegionCatalog::from_json(WTK_CATALOG)?;
    Ok(CATALOG.get_or_init(|| parsed))
}

/// Builds the WTK file path for `region`, `year` and optional `resolution`
/// using the built-in catalog. See [`RegionCatalog::build_path`].
///
/// # Examples
///
/// ```
/// use albatross::build_wtk_filepath;
///
/// assert_eq!(
///     build_wtk_filepath("conus", 2007, None).unwrap(),
///     "/nrel/wtk/conus/wtk_conus_2007.h5"
/// );
/// assert_eq!(
///     build_wtk_filepath("mexico", 2010, Some("5min")).unwrap(),
///     "/nrel/wtk/mexico-5min/wtk_mexico_2010.h5"
/// );
/// ```
pub fn build_wtk_filepath(
    region: &str,
    year: i32,
    resolution: Option<&str>,
) -> Result<String, RegionError> {
    get_regions()?.build_path(region, year, resolution)
}

/// Lists the built-in catalog regions containing `location`. See [`RegionCatalog::identify`].
pub fn identify_regions(location: LatLon) -> Result<Vec<String>, RegionError> {
    get_regions()?.identify(location)
}

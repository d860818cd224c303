use crate::types::lat_lon::LatLonError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegionError {
    #[error("region not found: {0}")]
    RegionNotFound(String),

    #[error("year {year} not available for region: {region}")]
    YearNotAvailable { region: String, year: i32 },

    #[error("resolution \"{resolution}\" not available for region: {region}")]
    ResolutionNotAvailable { region: String, resolution: String },

    #[error("No region found for specified lat/lon point.")]
    NoRegionForPoint,

    #[error(
        "Multiple regions identified for the given lat/lon point: {0:?}.\nPlease specify one using the `region` arg."
    )]
    MultipleRegions(Vec<String>),

    #[error(transparent)]
    InvalidLatLon(#[from] LatLonError),

    // Only reachable if the embedded catalog is malformed
    #[error("Failed to parse region catalog")]
    CatalogParse(#[source] serde_json::Error),
}

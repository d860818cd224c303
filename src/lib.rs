//! Wind resource analysis on top of the NREL WIND Toolkit (WTK).
//!
//! The crate resolves WTK archive files from a built-in region catalog, builds
//! the list of dataset names to request, reads point data through a cached
//! parquet mirror and computes diurnal statistics, turbulence and Weibull fits
//! on the resulting Polars frames.

mod analysis;
mod archive;
mod error;
mod regions;
mod requests;
mod types;
mod utils;
mod wind_toolkit;

pub use error::AlbatrossError;
pub use wind_toolkit::*;

pub use types::lat_lon::{LatLon, LatLonError};
pub use types::turbine::{TurbineError, TurbulenceClass, WindSpeedClass, WindTurbine};

pub use regions::catalog::{
    build_wtk_filepath, get_regions, identify_regions, Region, RegionCatalog,
    FIVE_MINUTE_RESOLUTION,
};
pub use regions::error::RegionError;

pub use requests::error::RequestError;
pub use requests::params::{get_fields, Field, RequestParams};

pub use analysis::columns::{
    boxplot_series, resolve_speed_column, BoxplotSeries, TIME_INDEX_COLUMN, WIND_SPEED_TAG,
};
pub use analysis::diurnal::{get_diurnal_stats, DIURNAL_STAT_COLUMNS, HOUR_COLUMN};
pub use analysis::error::AnalysisError;
pub use analysis::pdf::{fit_weibull, pdf, ExponWeibParams, WindSpeedPdf};
pub use analysis::turbulence::{turbulence_std, TurbulenceInput, DEFAULT_B, TURBULENCE_STD_COLUMN};

pub use archive::error::ArchiveError;
pub use archive::loader::{archive_stem, PointData, WtkArchive};
pub use archive::site_locator::{Site, SiteLocator};

pub use utils::MIRROR_URL_ENV;

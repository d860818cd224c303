use crate::analysis::error::AnalysisError;
use crate::archive::error::ArchiveError;
use crate::regions::error::RegionError;
use crate::requests::error::RequestError;
use crate::types::lat_lon::LatLonError;
use crate::types::turbine::TurbineError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlbatrossError {
    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Turbine(#[from] TurbineError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    InvalidLatLon(#[from] LatLonError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}

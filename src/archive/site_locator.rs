//! Nearest grid site lookup over the `meta.parquet` table of an archive file.

use crate::archive::error::ArchiveError;
use crate::types::lat_lon::LatLon;
use haversine::{distance, Location as HaversineLocation, Units};
use polars::prelude::*;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use std::path::Path;

pub const GID_COLUMN: &str = "gid";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

/// A WTK grid site: its id, location and row in the metadata table.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub gid: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub row: usize,
}

impl Site {
    /// Great-circle distance to `location` in kilometres.
    pub fn distance_km(&self, location: LatLon) -> f64 {
        distance(
            HaversineLocation {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            HaversineLocation {
                latitude: location.0,
                longitude: location.1,
            },
            Units::Kilometers,
        )
    }
}

impl RTreeObject for Site {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.latitude, self.longitude])
    }
}

impl PointDistance for Site {
    // Planar squared distance in degrees, matching how grid points are picked
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.latitude - point[0];
        let dy = self.longitude - point[1];
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone)]
pub struct SiteLocator {
    rtree: RTree<Site>,
}

impl SiteLocator {
    /// Indexes the `gid`, `latitude` and `longitude` columns of `meta`.
    pub fn from_meta(meta: &DataFrame, source: &Path) -> Result<Self, ArchiveError> {
        let column = |name: &str, dtype: DataType| -> Result<Series, ArchiveError> {
            let column = meta.column(name).map_err(|_| ArchiveError::MissingColumn {
                path: source.to_path_buf(),
                column: name.to_string(),
            })?;
            Ok(column.as_materialized_series().cast(&dtype)?)
        };

        let gids = column(GID_COLUMN, DataType::Int64)?;
        let latitudes = column(LATITUDE_COLUMN, DataType::Float64)?;
        let longitudes = column(LONGITUDE_COLUMN, DataType::Float64)?;

        let sites: Vec<Site> = gids
            .i64()?
            .into_iter()
            .zip(latitudes.f64()?.into_iter())
            .zip(longitudes.f64()?.into_iter())
            .enumerate()
            .filter_map(|(row, ((gid, latitude), longitude))| {
                Some(Site {
                    gid: gid?,
                    latitude: latitude?,
                    longitude: longitude?,
                    row,
                })
            })
            .collect();

        if sites.is_empty() {
            return Err(ArchiveError::NoSites(source.to_path_buf()));
        }
        Ok(Self {
            rtree: RTree::bulk_load(sites),
        })
    }

    pub fn nearest(&self, location: LatLon) -> Option<&Site> {
        self.rtree.nearest_neighbor(&[location.0, location.1])
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }
}

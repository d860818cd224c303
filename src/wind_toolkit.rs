//! The main entry point for requesting WIND Toolkit point data.
//!
//! [`WindToolkit`] resolves the archive file for a location and year from the
//! region catalog, validates the requested columns and reads the time series of
//! the nearest grid site through a cached [`WtkArchive`].

use crate::archive::loader::{archive_stem, PointData, WtkArchive};
use crate::error::AlbatrossError;
use crate::regions::catalog::{get_regions, RegionCatalog};
use crate::regions::error::RegionError;
use crate::types::lat_lon::LatLon;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir, mirror_url_from_env};
use bon::bon;
use log::info;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

/// Client for WTK point data.
///
/// Create an instance using [`WindToolkit::new()`] for the default cache
/// directory and the mirror configured in `ALBATROSS_MIRROR_URL`, or
/// [`WindToolkit::with_cache_folder()`] to choose both explicitly.
///
/// # Examples
///
/// ```rust,no_run
/// # use albatross::{AlbatrossError, LatLon, RequestParams, Field, WindToolkit};
/// # async fn run() -> Result<(), AlbatrossError> {
/// let client = WindToolkit::new().await?;
///
/// let mut params = RequestParams::new();
/// params.register(Field::WindSpeed, &[100])?;
///
/// let point = client
///     .point_data()
///     .location(LatLon(39.913561, -105.222422))
///     .year(2012)
///     .params(params.as_slice())
///     .call()
///     .await?;
/// println!("{}", point.data.head(Some(5)));
/// # Ok(())
/// # }
/// ```
pub struct WindToolkit {
    archive: WtkArchive,
}

#[bon]
impl WindToolkit {
    /// Creates a client that caches archive files in `cache_folder`.
    ///
    /// When `mirror_url` is `None` only files already present in the cache can be read.
    ///
    /// # Errors
    ///
    /// Returns [`AlbatrossError::CacheDirCreation`] if the directory cannot be created.
    pub async fn with_cache_folder(
        cache_folder: PathBuf,
        mirror_url: Option<String>,
    ) -> Result<Self, AlbatrossError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| AlbatrossError::CacheDirCreation(cache_folder.clone(), e))?;
        Ok(Self {
            archive: WtkArchive::new(&cache_folder, mirror_url),
        })
    }

    /// Creates a client using the default cache directory (e.g.
    /// `~/.cache/albatross_rs_cache` on Linux) and the `ALBATROSS_MIRROR_URL`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// * [`AlbatrossError::CacheDirResolution`] if there is no system cache directory.
    /// * [`AlbatrossError::CacheDirCreation`] if it cannot be created.
    pub async fn new() -> Result<Self, AlbatrossError> {
        let cache_folder = get_cache_dir().map_err(AlbatrossError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder, mirror_url_from_env()).await
    }

    pub fn cache_folder(&self) -> &Path {
        self.archive.cache_dir()
    }

    /// The region catalog used to resolve archive files.
    pub fn regions(&self) -> Result<&'static RegionCatalog, AlbatrossError> {
        Ok(get_regions()?)
    }

    /// Reads WTK data for the grid site nearest to a location.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point to read.
    /// * `.year(i32)`: **Required.** Archive year; must be in the region's range.
    /// * `.params(&[String])`: **Required.** Canonical column names, usually from
    ///   [`crate::RequestParams::as_slice`].
    /// * `.region(&str)`: Optional. Skips region identification. Required when the
    ///   location lies in more than one region.
    /// * `.resolution(&str)`: Optional. `"5min"` selects the five minute archive.
    ///
    /// All arguments are validated before any file is read.
    ///
    /// # Errors
    ///
    /// * [`RegionError::MultipleRegions`] if no region is given and the location
    ///   falls in several.
    /// * Other [`RegionError`] variants for unknown regions, years or resolutions.
    /// * [`crate::ArchiveError`] variants if the data cannot be read.
    #[builder]
    pub async fn point_data(
        &self,
        location: LatLon,
        year: i32,
        params: &[String],
        region: Option<&str>,
        resolution: Option<&str>,
    ) -> Result<PointData, AlbatrossError> {
        let location = location.validate()?;
        let region = match region {
            Some(region) => region.to_string(),
            None => {
                let mut regions = get_regions()?.identify(location)?;
                if regions.len() > 1 {
                    return Err(RegionError::MultipleRegions(regions).into());
                }
                regions.remove(0)
            }
        };

        let wtk_path = get_regions()?.build_path(&region, year, resolution)?;
        info!("Requesting {:?} at {} from {}", params, location, wtk_path);
        Ok(self
            .archive
            .read_point_data(&wtk_path, location, params)
            .await?)
    }

    /// Finds the regions containing a location, paired with the metadata row of
    /// the nearest grid site in each region's most recent archive year.
    ///
    /// # Errors
    ///
    /// * [`RegionError::NoRegionForPoint`] if no region contains the location.
    /// * [`crate::ArchiveError`] variants if a site table cannot be read.
    #[builder]
    pub async fn locate(&self, location: LatLon) -> Result<Vec<(String, DataFrame)>, AlbatrossError> {
        let catalog = get_regions()?;
        let regions = catalog.identify(location)?;

        let mut located = Vec::with_capacity(regions.len());
        for name in regions {
            let Some(region) = catalog.get(&name) else {
                continue;
            };
            let wtk_path = catalog.build_path(&name, region.latest_year(), None)?;
            let (meta, site) = self
                .archive
                .nearest_site(&archive_stem(&wtk_path), location)
                .await?;
            located.push((name, meta.slice(site.row as i64, 1)));
        }
        Ok(located)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::error::ArchiveError;
    use crate::archive::fixtures::write_archive_file;
    use crate::requests::params::{Field, RequestParams};

    const PROVIDENCE: LatLon = LatLon(41.96364, -71.79364);

    async fn client(dir: &Path) -> Result<WindToolkit, AlbatrossError> {
        WindToolkit::with_cache_folder(dir.to_path_buf(), None).await
    }

    #[tokio::test]
    async fn test_point_data() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write_archive_file(dir.path(), "/nrel/wtk/conus/wtk_conus_2012.h5")?;
        let client = client(dir.path()).await?;

        let mut params = RequestParams::new();
        params
            .register(Field::WindSpeed, &[100])?
            .register(Field::Temperature, &[2])?
            .register(Field::Meta, &[])?;

        let point = client
            .point_data()
            .location(PROVIDENCE)
            .year(2012)
            .params(params.as_slice())
            .region("conus")
            .call()
            .await?;

        let names: Vec<&str> = point
            .data
            .get_column_names()
            .into_iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(names, vec!["time_index", "windspeed_100m", "temperature_2m"]);
        assert_eq!(point.meta.height(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_point_data_multiple_regions() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = client(dir.path()).await?;
        let params = vec!["windspeed_100m".to_string()];

        let err = client
            .point_data()
            .location(PROVIDENCE)
            .year(2012)
            .params(&params)
            .call()
            .await
            .err()
            .expect("ambiguous location should fail");
        assert_eq!(
            err.to_string(),
            "Multiple regions identified for the given lat/lon point: [\"canada\", \"conus\"].\nPlease specify one using the `region` arg."
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_point_data_validates_before_reading() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = client(dir.path()).await?;
        let params = vec!["windspeed_100m".to_string()];

        let err = client
            .point_data()
            .location(PROVIDENCE)
            .year(2020)
            .params(&params)
            .region("conus")
            .call()
            .await
            .err()
            .expect("year out of range");
        assert!(matches!(
            err,
            AlbatrossError::Region(RegionError::YearNotAvailable { year: 2020, .. })
        ));

        let err = client
            .point_data()
            .location(PROVIDENCE)
            .year(2012)
            .params(&params)
            .region("conus")
            .resolution("15min")
            .call()
            .await
            .err()
            .expect("unknown resolution");
        assert!(matches!(
            err,
            AlbatrossError::Region(RegionError::ResolutionNotAvailable { .. })
        ));

        // Valid request, but nothing cached and no mirror
        let err = client
            .point_data()
            .location(PROVIDENCE)
            .year(2012)
            .params(&params)
            .region("conus")
            .resolution("5min")
            .call()
            .await
            .err()
            .expect("nothing cached");
        assert!(matches!(err, AlbatrossError::Archive(ArchiveError::NotCached(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_locate() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write_archive_file(dir.path(), "/nrel/wtk/canada/wtk_canada_2014.h5")?;
        write_archive_file(dir.path(), "/nrel/wtk/conus/wtk_conus_2014.h5")?;
        let client = client(dir.path()).await?;

        let located = client.locate().location(PROVIDENCE).call().await?;
        let regions: Vec<&str> = located.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(regions, vec!["canada", "conus"]);
        for (_, meta) in &located {
            assert_eq!(meta.height(), 1);
            assert_eq!(meta.column("gid")?.i64()?.get(0), Some(1));
        }

        let err = client
            .locate()
            .location(LatLon(0.0, 0.0))
            .call()
            .await
            .err()
            .expect("no region");
        assert!(matches!(err, AlbatrossError::Region(RegionError::NoRegionForPoint)));
        Ok(())
    }
}

use crate::analysis::columns::TIME_INDEX_COLUMN;
use crate::archive::error::ArchiveError;
use crate::archive::site_locator::{Site, SiteLocator};
use crate::types::lat_lon::LatLon;
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::{fs, task};
use tokio_util::io::StreamReader;

pub const META_FILE_NAME: &str = "meta.parquet";
const SITES_DIR_NAME: &str = "sites";

/// Params answered by the metadata table rather than a site data column.
const NON_DATA_PARAMS: [&str; 3] = [TIME_INDEX_COLUMN, "meta", "coordinates"];

/// Time series and site metadata read for a single point.
#[derive(Debug, Clone)]
pub struct PointData {
    /// `time_index` followed by the requested columns.
    pub data: DataFrame,
    /// One row describing the grid site the data was read from.
    pub meta: DataFrame,
}

/// Reads WTK point data from a parquet mirror of the archive.
///
/// A file at `/nrel/wtk/conus/wtk_conus_2007.h5` is stored under the stem
/// `nrel/wtk/conus/wtk_conus_2007/` as a `meta.parquet` site table and one
/// `sites/{gid}.parquet` time series per grid site. Files are looked up in the
/// cache directory first and fetched from the mirror on a miss.
pub struct WtkArchive {
    cache_dir: PathBuf,
    mirror_url: Option<String>,
    download_client: Client,
}

impl WtkArchive {
    pub fn new(cache_dir: &Path, mirror_url: Option<String>) -> WtkArchive {
        let download_client = Client::new();
        WtkArchive {
            cache_dir: cache_dir.to_path_buf(),
            mirror_url,
            download_client,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn mirror_url(&self) -> Option<&str> {
        self.mirror_url.as_deref()
    }

    /// Reads `params` at the grid site nearest to `location` from the archive
    /// file `wtk_path` (as built by [`crate::build_wtk_filepath`]).
    ///
    /// `time_index` is always returned; `meta` and `coordinates` are answered by
    /// [`PointData::meta`]. Repeated params are read once.
    ///
    /// # Errors
    ///
    /// * [`ArchiveError::EmptyParams`] if `params` is empty.
    /// * [`ArchiveError::NotCached`] if a file is missing and no mirror is set.
    /// * [`ArchiveError::MissingColumn`] if a param is not a column of the site file.
    /// * Download, parquet and task errors as they occur.
    pub async fn read_point_data(
        &self,
        wtk_path: &str,
        location: LatLon,
        params: &[String],
    ) -> Result<PointData, ArchiveError> {
        if params.is_empty() {
            return Err(ArchiveError::EmptyParams);
        }
        let location = location.validate()?;
        let stem = archive_stem(wtk_path);

        let (meta, site) = self.nearest_site(&stem, location).await?;
        info!(
            "Nearest site to {} in {} is gid {} ({:.2} km away)",
            location,
            wtk_path,
            site.gid,
            site.distance_km(location)
        );

        let site_file = format!("{}/{}/{}.parquet", stem, SITES_DIR_NAME, site.gid);
        let site_path = self.ensure_file(&site_file).await?;
        let columns = data_columns(params);
        let data = task::spawn_blocking(move || select_columns(&site_path, &columns)).await??;

        Ok(PointData {
            data,
            meta: meta.slice(site.row as i64, 1),
        })
    }

    /// Loads the site table of an archive file and picks the site closest to `location`.
    pub async fn nearest_site(
        &self,
        stem: &str,
        location: LatLon,
    ) -> Result<(DataFrame, Site), ArchiveError> {
        let meta_path = self.ensure_file(&format!("{}/{}", stem, META_FILE_NAME)).await?;
        task::spawn_blocking(move || {
            let meta = read_parquet(&meta_path)?;
            let locator = SiteLocator::from_meta(&meta, &meta_path)?;
            let site = locator
                .nearest(location)
                .cloned()
                .ok_or_else(|| ArchiveError::NoSites(meta_path.clone()))?;
            Ok::<_, ArchiveError>((meta, site))
        })
        .await?
    }

    /// Returns the local path of `relative`, downloading it from the mirror on a cache miss.
    async fn ensure_file(&self, relative: &str) -> Result<PathBuf, ArchiveError> {
        let local = self.cache_dir.join(relative);
        if fs::metadata(&local).await.is_ok() {
            debug!("Cache hit for {:?}", local);
            return Ok(local);
        }

        let Some(mirror) = &self.mirror_url else {
            return Err(ArchiveError::NotCached(local));
        };
        warn!("Cache miss for {}. Downloading from mirror.", relative);

        let url = format!("{}/{}", mirror.trim_end_matches('/'), relative);
        self.download(&url, &local).await?;
        info!("Cached {} to {:?}", url, local);
        Ok(local)
    }

    /// Streams `url` into a temporary file next to `path` and renames it into
    /// place once complete, so a partial download never looks like a cache hit.
    async fn download(&self, url: &str, path: &Path) -> Result<(), ArchiveError> {
        info!("Downloading data from {}", url);
        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(|e| ArchiveError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    ArchiveError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    ArchiveError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parent)
            .await
            .map_err(|e| ArchiveError::CacheDirCreation(parent.clone(), e))?;

        // The temp path is removed on drop unless persisted
        let (file, temp_path) = NamedTempFile::new_in(&parent)
            .map_err(|e| ArchiveError::CacheWrite(path.to_path_buf(), e))?
            .into_parts();
        let mut file = fs::File::from_std(file);

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let mut reader = StreamReader::new(stream);
        let written = tokio::io::copy(&mut reader, &mut file)
            .await
            .map_err(|e| ArchiveError::DownloadIo(url.to_string(), e))?;
        file.flush()
            .await
            .map_err(|e| ArchiveError::CacheWrite(path.to_path_buf(), e))?;
        drop(file);

        temp_path
            .persist(path)
            .map_err(|e| ArchiveError::CacheWrite(path.to_path_buf(), e.error))?;
        debug!("Wrote {} bytes to {:?}", written, path);
        Ok(())
    }
}

/// `/nrel/wtk/conus/wtk_conus_2007.h5` → `nrel/wtk/conus/wtk_conus_2007`
pub fn archive_stem(wtk_path: &str) -> String {
    let trimmed = wtk_path.trim_start_matches('/');
    trimmed.strip_suffix(".h5").unwrap_or(trimmed).to_string()
}

/// `time_index` followed by the distinct data params, in request order.
fn data_columns(params: &[String]) -> Vec<String> {
    let mut columns = vec![TIME_INDEX_COLUMN.to_string()];
    for param in params {
        if NON_DATA_PARAMS.contains(&param.as_str()) {
            continue;
        }
        if !columns.contains(param) {
            columns.push(param.clone());
        }
    }
    columns
}

fn read_parquet(path: &Path) -> Result<DataFrame, ArchiveError> {
    let file = std::fs::File::open(path)
        .map_err(|e| ArchiveError::ParquetRead(path.to_path_buf(), PolarsError::from(e)))?;
    ParquetReader::new(file)
        .finish()
        .map_err(|e| ArchiveError::ParquetRead(path.to_path_buf(), e))
}

fn select_columns(path: &Path, columns: &[String]) -> Result<DataFrame, ArchiveError> {
    let mut frame = LazyFrame::scan_parquet(path, Default::default())
        .map_err(|e| ArchiveError::ParquetScan(path.to_path_buf(), e))?;
    let schema = frame
        .collect_schema()
        .map_err(|e| ArchiveError::ParquetScan(path.to_path_buf(), e))?;

    if let Some(missing) = columns.iter().find(|c| schema.get(c.as_str()).is_none()) {
        return Err(ArchiveError::MissingColumn {
            path: path.to_path_buf(),
            column: missing.clone(),
        });
    }

    let exprs: Vec<Expr> = columns.iter().map(|c| col(c.as_str())).collect();
    Ok(frame.select(exprs).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::fixtures::{serve_directory, write_archive_file};

    #[test]
    fn test_archive_stem() {
        assert_eq!(
            archive_stem("/nrel/wtk/conus/wtk_conus_2007.h5"),
            "nrel/wtk/conus/wtk_conus_2007"
        );
        assert_eq!(
            archive_stem("/nrel/wtk/hawaii-5min/Hawaii_2019.h5"),
            "nrel/wtk/hawaii-5min/Hawaii_2019"
        );
    }

    #[test]
    fn test_data_columns() {
        let params: Vec<String> = ["windspeed_100m", "meta", "windspeed_100m", "time_index"]
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(data_columns(&params), vec!["time_index", "windspeed_100m"]);
    }

    #[tokio::test]
    async fn test_read_point_data() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = "/nrel/wtk/conus/wtk_conus_2012.h5";
        write_archive_file(dir.path(), path)?;

        let archive = WtkArchive::new(dir.path(), None);
        assert_eq!(archive.mirror_url(), None);
        assert_eq!(archive.cache_dir(), dir.path());
        let point = archive
            .read_point_data(
                path,
                LatLon(41.96364, -71.79364),
                &["windspeed_100m".to_string()],
            )
            .await?;

        assert_eq!(point.data.width(), 2);
        assert_eq!(point.data.height(), 48);
        assert_eq!(point.meta.height(), 1);
        let gid = point.meta.column("gid")?.i64()?.get(0);
        assert_eq!(gid, Some(1));

        // Site 1 stores speeds offset by 100
        let first = point.data.column("windspeed_100m")?.f64()?.get(0);
        assert_eq!(first, Some(100.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_read_point_data_errors() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = "/nrel/wtk/conus/wtk_conus_2012.h5";
        write_archive_file(dir.path(), path)?;
        let archive = WtkArchive::new(dir.path(), None);
        let location = LatLon(41.96364, -71.79364);

        let err = archive.read_point_data(path, location, &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "\"params\" must not be empty");

        let err = archive
            .read_point_data(path, location, &["pressure_0m".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::MissingColumn { column, .. } if column == "pressure_0m"));

        let err = archive
            .read_point_data(
                "/nrel/wtk/conus/wtk_conus_2013.h5",
                location,
                &["windspeed_100m".to_string()],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::NotCached(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_read_point_data_from_mirror() -> Result<(), Box<dyn std::error::Error>> {
        let mirror_dir = tempfile::tempdir()?;
        let cache_dir = tempfile::tempdir()?;
        let path = "/nrel/wtk/conus/wtk_conus_2012.h5";
        write_archive_file(mirror_dir.path(), path)?;
        let mirror_url = serve_directory(mirror_dir.path().to_path_buf()).await?;

        let archive = WtkArchive::new(cache_dir.path(), Some(mirror_url));
        let point = archive
            .read_point_data(path, LatLon(41.96364, -71.79364), &["windspeed_100m".to_string()])
            .await?;
        assert_eq!(point.data.height(), 48);
        assert_eq!(point.data.column("windspeed_100m")?.f64()?.get(0), Some(100.0));

        let stem = cache_dir.path().join("nrel/wtk/conus/wtk_conus_2012");
        assert!(stem.join(META_FILE_NAME).is_file());
        assert!(stem.join("sites").join("1.parquet").is_file());
        // Only the completed files are left in the cache directory
        assert_eq!(std::fs::read_dir(stem.join("sites"))?.count(), 1);

        let err = archive
            .read_point_data(
                "/nrel/wtk/conus/wtk_conus_2013.h5",
                LatLon(41.96364, -71.79364),
                &["windspeed_100m".to_string()],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::HttpStatus { status, .. } if status == reqwest::StatusCode::NOT_FOUND
        ));
        assert!(!cache_dir.path().join("nrel/wtk/conus/wtk_conus_2013").exists());
        Ok(())
    }
}

use crate::app::ports::MovieCatalogPort;
use crate::config::TmdbConfig;
use crate::constants::{DISCOVER_MOVIE_PATH, GENRE_LIST_PATH};
use crate::error::{InsightsError, Result};
use crate::infra::http_client::RetryingHttpClient;
use crate::observability::metrics;
use crate::types::{GenreMap, RawMovieData};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize)]
struct DiscoverPage {
    results: Vec<RawMovieData>,
    #[serde(default = "default_total_pages")]
    total_pages: u32,
}

fn default_total_pages() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<GenreEntry>,
}

#[derive(Debug, Deserialize)]
struct GenreEntry {
    id: i64,
    name: String,
}

/// Calendar quarters of `year` as inclusive date windows.
///
/// Discover queries are split per quarter to stay under the API's page cap.
pub fn quarter_windows(year: i32) -> Result<Vec<(NaiveDate, NaiveDate)>> {
    [(1, 1, 3, 31), (4, 1, 6, 30), (7, 1, 9, 30), (10, 1, 12, 31)]
        .iter()
        .map(|&(sm, sd, em, ed)| {
            let start = NaiveDate::from_ymd_opt(year, sm, sd).ok_or(InsightsError::InvalidYear(year))?;
            let end = NaiveDate::from_ymd_opt(year, em, ed).ok_or(InsightsError::InvalidYear(year))?;
            Ok((start, end))
        })
        .collect()
}

/// TMDB implementation of the movie catalog
pub struct TmdbCatalogAdapter {
    http: RetryingHttpClient,
    api_key: String,
    config: TmdbConfig,
}

impl TmdbCatalogAdapter {
    pub fn new(api_key: impl Into<String>, config: TmdbConfig) -> Result<Self> {
        let http = RetryingHttpClient::new(
            Duration::from_secs(config.timeout_seconds),
            Duration::from_millis(config.rate_limit_backoff_ms),
            config.max_rate_limit_retries,
        )?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Every page of discover results released within `[start, end]`.
    #[instrument(skip(self))]
    pub async fn fetch_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawMovieData>> {
        let url = self.url(DISCOVER_MOVIE_PATH);
        let mut movies = Vec::new();
        let mut page: u32 = 1;

        loop {
            let query = [
                ("api_key", self.api_key.clone()),
                ("language", self.config.language.clone()),
                ("sort_by", "release_date.desc".to_string()),
                ("include_adult", "false".to_string()),
                ("include_video", "false".to_string()),
                ("primary_release_date.gte", start.format("%Y-%m-%d").to_string()),
                ("primary_release_date.lte", end.format("%Y-%m-%d").to_string()),
                ("with_original_language", self.config.original_language.clone()),
                ("page", page.to_string()),
            ];
            let body = self.http.get_json("discover", &url, &query).await?;
            let data: DiscoverPage = serde_json::from_value(body)?;

            if data.results.is_empty() {
                break;
            }
            debug!("Page {}/{}: {} movies", page, data.total_pages, data.results.len());
            movies.extend(data.results);

            if page < data.total_pages {
                page += 1;
                if self.config.page_delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
                }
            } else {
                break;
            }
        }

        Ok(movies)
    }
}

#[async_trait]
impl MovieCatalogPort for TmdbCatalogAdapter {
    #[instrument(skip(self))]
    async fn fetch_movies(&self, year: i32) -> Result<Vec<RawMovieData>> {
        let mut movies = Vec::new();
        for (start, end) in quarter_windows(year)? {
            let quarter = self.fetch_date_range(start, end).await?;
            info!("Fetched {} movies released {}..{}", quarter.len(), start, end);
            movies.extend(quarter);
        }
        metrics::sources::records_fetched(movies.len());
        Ok(movies)
    }

    #[instrument(skip(self))]
    async fn fetch_genre_map(&self) -> Result<GenreMap> {
        let url = self.url(GENRE_LIST_PATH);
        let query = [
            ("api_key", self.api_key.clone()),
            ("language", self.config.language.clone()),
        ];
        let body = self.http.get_json("genres", &url, &query).await?;
        let list: GenreList = serde_json::from_value(body)?;
        Ok(list.genres.into_iter().map(|g| (g.id, g.name)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_windows_cover_the_year() {
        let windows = quarter_windows(2024).unwrap();
        let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
        let rendered: Vec<(String, String)> = windows.into_iter().map(|(s, e)| (fmt(s), fmt(e))).collect();
        assert_eq!(
            rendered,
            vec![
                ("2024-01-01".to_string(), "2024-03-31".to_string()),
                ("2024-04-01".to_string(), "2024-06-30".to_string()),
                ("2024-07-01".to_string(), "2024-09-30".to_string()),
                ("2024-10-01".to_string(), "2024-12-31".to_string()),
            ]
        );
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let config = TmdbConfig {
            base_url: "http://localhost:8080/3/".to_string(),
            ..TmdbConfig::default()
        };
        let adapter = TmdbCatalogAdapter::new("key", config).unwrap();
        assert_eq!(adapter.url(DISCOVER_MOVIE_PATH), "http://localhost:8080/3/discover/movie");
    }
}

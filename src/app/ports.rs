use crate::error::Result;
use crate::types::{GenreMap, MovieInsightRow, OutputFormat, RawMovieData};
use async_trait::async_trait;
use std::path::Path;

/// Source of raw movie records and genre names
#[async_trait]
pub trait MovieCatalogPort: Send + Sync {
    /// All movies released in `year`, fully materialized.
    async fn fetch_movies(&self, year: i32) -> Result<Vec<RawMovieData>>;

    async fn fetch_genre_map(&self) -> Result<GenreMap>;
}

/// Persists the final report table
pub trait ReportOutputPort: Send + Sync {
    fn format(&self) -> OutputFormat;

    fn write_report(&self, rows: &[MovieInsightRow], path: &Path) -> Result<()>;
}

//! Shared literals used across ingestion, pipeline, and output layers.

// Catalog API
pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";
pub const DISCOVER_MOVIE_PATH: &str = "/discover/movie";
pub const GENRE_LIST_PATH: &str = "/genre/movie/list";

// CLI defaults
pub const DEFAULT_YEAR: i32 = 2023;
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_CONFIG_PATH: &str = "movie_insights.toml";

// Pipeline
pub const UNAVAILABLE_GENRE: &str = "Unavailable";
pub const GENRE_SEPARATOR: &str = ", ";
pub const HIGH_POPULARITY_PERCENTILE: f64 = 99.0;
pub const LOW_VOTE_PERCENTILE: f64 = 25.0;

// Output
pub const OUTPUT_FILE_PREFIX: &str = "movie_insights";
pub const FLAGGED_ROW_FILL: u32 = 0xFFB3BA;

/// Column order of the final report
pub const REPORT_COLUMNS: [&str; 5] = [
    "title",
    "popularity",
    "vote_count",
    "genres",
    "flagged_as_unreliable",
];

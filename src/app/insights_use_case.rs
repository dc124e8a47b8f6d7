use crate::app::ports::{MovieCatalogPort, ReportOutputPort};
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::{FlagReport, ValidationReport};
use crate::pipeline::Pipeline;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub year: i32,
    pub raw_records: usize,
    pub genres: usize,
    pub validation: ValidationReport,
    pub flags: FlagReport,
    pub rows_written: usize,
    pub output_file: PathBuf,
}

/// Use case for producing the yearly movie insights report:
/// fetch from the catalog, run the pipeline, write the report.
pub struct InsightsUseCase {
    catalog: Box<dyn MovieCatalogPort>,
    output: Box<dyn ReportOutputPort>,
    output_dir: PathBuf,
}

impl InsightsUseCase {
    pub fn new(
        catalog: Box<dyn MovieCatalogPort>,
        output: Box<dyn ReportOutputPort>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            output,
            output_dir: output_dir.into(),
        }
    }

    /// Nothing is written unless every stage succeeds.
    #[instrument(skip(self))]
    pub async fn run(&self, year: i32) -> Result<RunSummary> {
        let pipeline = Pipeline::new(year)?;

        info!("📡 Fetching movies for {}...", year);
        let movies = self.catalog.fetch_movies(year).await?;
        let genre_map = self.catalog.fetch_genre_map().await?;
        info!("✅ Fetched {} raw movies and {} genres", movies.len(), genre_map.len());
        let raw_records = movies.len();

        let output = pipeline.run(movies, &genre_map)?;

        let output_file = pipeline.output_path(&self.output_dir, self.output.format());
        self.output.write_report(&output.rows, &output_file)?;
        metrics::pipeline::rows_written(output.rows.len());
        info!("💾 Saved {} rows to {}", output.rows.len(), output_file.display());

        Ok(RunSummary {
            year,
            raw_records,
            genres: genre_map.len(),
            rows_written: output.rows.len(),
            validation: output.validation,
            flags: output.flags,
            output_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InsightsError;
    use crate::types::{GenreMap, MovieInsightRow, OutputFormat, RawMovieData};
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    struct MockCatalog {
        movies: Vec<RawMovieData>,
        fail_genres: bool,
    }

    #[async_trait]
    impl MovieCatalogPort for MockCatalog {
        async fn fetch_movies(&self, _year: i32) -> Result<Vec<RawMovieData>> {
            Ok(self.movies.clone())
        }

        async fn fetch_genre_map(&self) -> Result<GenreMap> {
            if self.fail_genres {
                return Err(InsightsError::Api {
                    status: 500,
                    url: "http://catalog/genre/movie/list".to_string(),
                });
            }
            Ok([(28, "Action"), (18, "Drama")].into_iter().collect())
        }
    }

    #[derive(Clone, Default)]
    struct MockOutput {
        written: Arc<Mutex<Vec<(PathBuf, Vec<MovieInsightRow>)>>>,
    }

    impl ReportOutputPort for MockOutput {
        fn format(&self) -> OutputFormat {
            OutputFormat::Json
        }

        fn write_report(&self, rows: &[MovieInsightRow], path: &Path) -> Result<()> {
            self.written.lock().unwrap().push((path.to_path_buf(), rows.to_vec()));
            Ok(())
        }
    }

    fn movies() -> Vec<RawMovieData> {
        vec![
            json!({"id": 1, "title": "A", "popularity": 3.0, "vote_count": 10, "release_date": "2023-01-05", "genre_ids": [28, 18]}),
            json!({"id": 2, "title": "B", "popularity": null, "vote_count": 10, "release_date": "2023-01-05", "genre_ids": []}),
            json!({"id": 3, "title": "C", "popularity": 9.0, "vote_count": 1, "release_date": "2023-03-05", "genre_ids": []}),
        ]
    }

    #[tokio::test]
    async fn test_run_writes_projected_rows() {
        let output = MockOutput::default();
        let written = output.written.clone();
        let use_case = InsightsUseCase::new(
            Box::new(MockCatalog { movies: movies(), fail_genres: false }),
            Box::new(output),
            "reports",
        );

        let summary = use_case.run(2023).await.unwrap();
        assert_eq!(summary.raw_records, 3);
        assert_eq!(summary.rows_written, 2);
        assert_eq!(summary.validation.missing_popularity, 1);
        assert_eq!(summary.output_file, PathBuf::from("reports/movie_insights_2023.json"));

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        let rows = &written[0].1;
        assert_eq!(rows[0].title, "C");
        assert_eq!(rows[0].genres, "Unavailable");
        assert_eq!(rows[1].title, "A");
        assert_eq!(rows[1].genres, "Action, Drama");
    }

    #[tokio::test]
    async fn test_ingestion_failure_writes_nothing() {
        let output = MockOutput::default();
        let written = output.written.clone();
        let use_case = InsightsUseCase::new(
            Box::new(MockCatalog { movies: movies(), fail_genres: true }),
            Box::new(output),
            "reports",
        );

        let err = use_case.run(2023).await.unwrap_err();
        assert!(err.is_transport());
        assert!(written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_records_write_nothing() {
        let output = MockOutput::default();
        let written = output.written.clone();
        let use_case = InsightsUseCase::new(
            Box::new(MockCatalog { movies: vec![json!([1, 2, 3])], fail_genres: false }),
            Box::new(output),
            "reports",
        );

        let err = use_case.run(2023).await.unwrap_err();
        assert!(matches!(err, InsightsError::InputFormat { .. }));
        assert!(written.lock().unwrap().is_empty());
    }
}

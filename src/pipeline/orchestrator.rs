use crate::constants::OUTPUT_FILE_PREFIX;
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::{FlagReport, GenreEnricher, ReliabilityFlagger, ValidationReport, Validator};
use crate::types::{EnrichedMovieRecord, GenreMap, MovieInsightRow, OutputFormat, RawMovieData};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument};

/// Final table of a pipeline run plus per-stage diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub rows: Vec<MovieInsightRow>,
    pub validation: ValidationReport,
    pub flags: FlagReport,
}

/// Runs validate, flag, and enrich in that fixed order for one year, then
/// projects the result to the report columns.
#[derive(Debug, Clone)]
pub struct Pipeline {
    validator: Validator,
    flagger: ReliabilityFlagger,
}

impl Pipeline {
    pub fn new(year: i32) -> Result<Self> {
        Ok(Self {
            validator: Validator::new(year)?,
            flagger: ReliabilityFlagger::new(),
        })
    }

    pub fn year(&self) -> i32 {
        self.validator.year()
    }

    /// Run every stage. Any failure aborts the run with no partial rows.
    #[instrument(skip(self, raw, genre_map), fields(year = self.year(), raw_records = raw.len()))]
    pub fn run(&self, raw: Vec<RawMovieData>, genre_map: &GenreMap) -> Result<PipelineOutput> {
        info!("🚀 Running pipeline for year: {}", self.year());

        let t_stage = Instant::now();
        let validated = self.validator.validate(raw)?;
        metrics::pipeline::stage_duration("validate", t_stage.elapsed().as_secs_f64());

        let t_stage = Instant::now();
        let flagged = self.flagger.flag(validated.records);
        metrics::pipeline::stage_duration("flag", t_stage.elapsed().as_secs_f64());

        let t_stage = Instant::now();
        let enriched = GenreEnricher::new(genre_map).enrich(flagged.records);
        metrics::pipeline::stage_duration("enrich", t_stage.elapsed().as_secs_f64());

        let rows = project(enriched);
        info!("Pipeline produced {} rows", rows.len());

        Ok(PipelineOutput {
            rows,
            validation: validated.report,
            flags: flagged.report,
        })
    }

    /// `<output_dir>/movie_insights_<year>.<json|xlsx>`
    pub fn output_path(&self, output_dir: &Path, format: OutputFormat) -> PathBuf {
        output_path(output_dir, self.year(), format)
    }
}

/// Keep only the report columns: title, popularity, vote_count, genres, flagged_as_unreliable.
pub fn project(records: Vec<EnrichedMovieRecord>) -> Vec<MovieInsightRow> {
    records.into_iter().map(MovieInsightRow::from).collect()
}

pub fn output_path(output_dir: &Path, year: i32, format: OutputFormat) -> PathBuf {
    output_dir.join(format!("{}_{}.{}", OUTPUT_FILE_PREFIX, year, format.extension()))
}

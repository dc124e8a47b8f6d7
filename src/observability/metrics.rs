//! Metrics for the movie insights pipeline
//!
//! Every stage records through the `metrics` facade. Without an installed
//! recorder the calls are no-ops, so the pipeline stays a pure function of its
//! inputs in tests. The binary installs a Prometheus recorder when a metrics
//! snapshot file is requested and renders it after the run.

use crate::error::{InsightsError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Sources metrics
    SourcesRequestsSuccess,
    SourcesRequestsError,
    SourcesRateLimitRetries,
    SourcesRequestDuration,
    SourcesRecordsFetched,

    // Validate metrics
    ValidateRawRecords,
    ValidateRecordsDropped,
    ValidateDuplicatesRemoved,
    ValidateUnknownVoteCounts,
    ValidateCleanRecords,

    // Flag metrics
    FlagHighPopularityThreshold,
    FlagLowVoteThreshold,
    FlagTopSubsetSize,
    FlagRecordsFlagged,

    // Enrich metrics
    EnrichRecordsProcessed,
    EnrichUnresolvedGenres,

    // Pipeline metrics
    PipelineStageDuration,
    PipelineRowsWritten,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SourcesRequestsSuccess => "movie_insights_sources_requests_success_total",
            MetricName::SourcesRequestsError => "movie_insights_sources_requests_error_total",
            MetricName::SourcesRateLimitRetries => "movie_insights_sources_rate_limit_retries_total",
            MetricName::SourcesRequestDuration => "movie_insights_sources_request_duration_seconds",
            MetricName::SourcesRecordsFetched => "movie_insights_sources_records_fetched_total",

            MetricName::ValidateRawRecords => "movie_insights_validate_raw_records_total",
            MetricName::ValidateRecordsDropped => "movie_insights_validate_records_dropped_total",
            MetricName::ValidateDuplicatesRemoved => "movie_insights_validate_duplicates_removed_total",
            MetricName::ValidateUnknownVoteCounts => "movie_insights_validate_unknown_vote_counts_total",
            MetricName::ValidateCleanRecords => "movie_insights_validate_clean_records",

            MetricName::FlagHighPopularityThreshold => "movie_insights_flag_high_popularity_threshold",
            MetricName::FlagLowVoteThreshold => "movie_insights_flag_low_vote_threshold",
            MetricName::FlagTopSubsetSize => "movie_insights_flag_top_subset_size",
            MetricName::FlagRecordsFlagged => "movie_insights_flag_records_flagged",

            MetricName::EnrichRecordsProcessed => "movie_insights_enrich_records_processed_total",
            MetricName::EnrichUnresolvedGenres => "movie_insights_enrich_unresolved_genres_total",

            MetricName::PipelineStageDuration => "movie_insights_pipeline_stage_duration_seconds",
            MetricName::PipelineRowsWritten => "movie_insights_pipeline_rows_written",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the Prometheus recorder and return the handle used to render it.
pub fn init() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| InsightsError::Config(format!("Failed to install Prometheus recorder: {}", e)))?;
    info!("Metrics recorder installed");
    Ok(handle)
}

/// Write the current Prometheus text exposition to `path`.
pub fn write_snapshot(handle: &PrometheusHandle, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, handle.render())?;
    info!("Wrote metrics snapshot to {}", path.display());
    Ok(())
}

// ============================================================================
// Sources Metrics
// ============================================================================

pub mod sources {
    use super::MetricName;

    pub fn request_success(endpoint: &'static str) {
        ::metrics::counter!(MetricName::SourcesRequestsSuccess.as_str(), "endpoint" => endpoint).increment(1);
    }

    pub fn request_error(endpoint: &'static str, status: u16) {
        ::metrics::counter!(
            MetricName::SourcesRequestsError.as_str(),
            "endpoint" => endpoint,
            "status" => status.to_string()
        )
        .increment(1);
    }

    /// A 429 response was answered with a backoff and retry
    pub fn rate_limit_retry(endpoint: &'static str) {
        ::metrics::counter!(MetricName::SourcesRateLimitRetries.as_str(), "endpoint" => endpoint).increment(1);
    }

    pub fn request_duration(endpoint: &'static str, secs: f64) {
        ::metrics::histogram!(MetricName::SourcesRequestDuration.as_str(), "endpoint" => endpoint).record(secs);
    }

    pub fn records_fetched(count: usize) {
        ::metrics::counter!(MetricName::SourcesRecordsFetched.as_str()).increment(count as u64);
    }
}

// ============================================================================
// Validate Metrics
// ============================================================================

pub mod validate {
    use super::MetricName;

    pub fn raw_records(count: usize) {
        ::metrics::counter!(MetricName::ValidateRawRecords.as_str()).increment(count as u64);
    }

    /// Rows removed by a validation rule, labelled by the rule
    pub fn records_dropped(reason: &'static str, count: usize) {
        ::metrics::counter!(MetricName::ValidateRecordsDropped.as_str(), "reason" => reason)
            .increment(count as u64);
    }

    pub fn duplicates_removed(count: usize) {
        ::metrics::counter!(MetricName::ValidateDuplicatesRemoved.as_str()).increment(count as u64);
    }

    pub fn unknown_vote_counts(count: usize) {
        ::metrics::counter!(MetricName::ValidateUnknownVoteCounts.as_str()).increment(count as u64);
    }

    pub fn clean_records(count: usize) {
        ::metrics::gauge!(MetricName::ValidateCleanRecords.as_str()).set(count as f64);
    }
}

// ============================================================================
// Flag Metrics
// ============================================================================

pub mod flag {
    use super::MetricName;

    pub fn thresholds(high_popularity: Option<f64>, low_vote: Option<f64>) {
        if let Some(v) = high_popularity {
            ::metrics::gauge!(MetricName::FlagHighPopularityThreshold.as_str()).set(v);
        }
        if let Some(v) = low_vote {
            ::metrics::gauge!(MetricName::FlagLowVoteThreshold.as_str()).set(v);
        }
    }

    pub fn top_subset_size(count: usize) {
        ::metrics::gauge!(MetricName::FlagTopSubsetSize.as_str()).set(count as f64);
    }

    pub fn records_flagged(count: usize) {
        ::metrics::gauge!(MetricName::FlagRecordsFlagged.as_str()).set(count as f64);
    }
}

// ============================================================================
// Enrich Metrics
// ============================================================================

pub mod enrich {
    use super::MetricName;

    pub fn records_processed(count: usize) {
        ::metrics::counter!(MetricName::EnrichRecordsProcessed.as_str()).increment(count as u64);
    }

    /// Genre ids that had no entry in the genre map
    pub fn unresolved_genres(count: usize) {
        ::metrics::counter!(MetricName::EnrichUnresolvedGenres.as_str()).increment(count as u64);
    }
}

// ============================================================================
// Pipeline Metrics
// ============================================================================

pub mod pipeline {
    use super::MetricName;

    pub fn stage_duration(stage: &'static str, secs: f64) {
        ::metrics::histogram!(MetricName::PipelineStageDuration.as_str(), "stage" => stage).record(secs);
    }

    pub fn rows_written(count: usize) {
        ::metrics::gauge!(MetricName::PipelineRowsWritten.as_str()).set(count as f64);
    }
}

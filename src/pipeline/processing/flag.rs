use crate::constants::{HIGH_POPULARITY_PERCENTILE, LOW_VOTE_PERCENTILE};
use crate::observability::metrics;
use crate::pipeline::processing::stats::percentile;
use crate::types::{CleanMovieRecord, FlaggedMovieRecord};
use serde::Serialize;
use tracing::{info, instrument};

/// Thresholds computed for one batch and how many rows they flagged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlagReport {
    pub high_pop_threshold: Option<f64>,
    pub top_subset_size: usize,
    pub low_vote_threshold: Option<f64>,
    pub flagged: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedMovies {
    pub records: Vec<FlaggedMovieRecord>,
    pub report: FlagReport,
}

/// Marks titles that are suspiciously popular but under-voted.
///
/// A single global cutoff would flag every blockbuster, so the vote count
/// check only runs inside the extreme-popularity subset:
///
/// 1. `high_pop_threshold` is the 99th popularity percentile of the batch.
/// 2. The top subset holds rows strictly above it.
/// 3. `low_vote_threshold` is the 25th vote count percentile of that subset,
///    ignoring unknown vote counts.
/// 4. A row is flagged when it is in the top subset and its vote count is
///    below `low_vote_threshold`.
///
/// There is no minimum batch size; small batches still interpolate a 99th
/// percentile and may flag a large share of rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReliabilityFlagger;

impl ReliabilityFlagger {
    pub fn new() -> Self {
        Self
    }

    /// Compute both thresholds without touching the records.
    pub fn thresholds(&self, records: &[CleanMovieRecord]) -> FlagReport {
        let popularity: Vec<f64> = records.iter().map(|r| r.popularity).collect();
        let Some(high) = percentile(&popularity, HIGH_POPULARITY_PERCENTILE) else {
            return FlagReport::default();
        };

        let top_subset: Vec<&CleanMovieRecord> =
            records.iter().filter(|r| r.popularity > high).collect();
        let top_votes: Vec<f64> = top_subset
            .iter()
            .filter_map(|r| r.vote_count.known())
            .map(|v| v as f64)
            .collect();
        let low = percentile(&top_votes, LOW_VOTE_PERCENTILE);

        FlagReport {
            high_pop_threshold: Some(high),
            top_subset_size: top_subset.len(),
            low_vote_threshold: low,
            flagged: 0,
        }
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn flag(&self, records: Vec<CleanMovieRecord>) -> FlaggedMovies {
        info!("📊 Flagging unreliable popularity scores...");
        let mut report = self.thresholds(&records);

        let flagged: Vec<FlaggedMovieRecord> = records
            .into_iter()
            .map(|movie| {
                let flagged_as_unreliable = match (report.high_pop_threshold, report.low_vote_threshold) {
                    (Some(high), Some(low)) => movie.popularity > high && movie.vote_count.is_below(low),
                    _ => false,
                };
                FlaggedMovieRecord {
                    movie,
                    flagged_as_unreliable,
                }
            })
            .collect();
        report.flagged = flagged.iter().filter(|r| r.flagged_as_unreliable).count();

        match report.high_pop_threshold {
            Some(high) => info!("High popularity threshold (99th percentile): {:.2}", high),
            None => info!("High popularity threshold undefined: no records"),
        }
        match report.low_vote_threshold {
            Some(low) => info!("Low vote threshold (25th percentile in top 1%): {:.0}", low),
            None => info!(
                "Low vote threshold undefined: {} records above popularity threshold, none with a known vote count",
                report.top_subset_size
            ),
        }
        info!("🔎 Flagged {} movies as potentially unreliable.", report.flagged);

        metrics::flag::thresholds(report.high_pop_threshold, report.low_vote_threshold);
        metrics::flag::top_subset_size(report.top_subset_size);
        metrics::flag::records_flagged(report.flagged);

        FlaggedMovies {
            records: flagged,
            report,
        }
    }
}

/// Convenience entry point using the default percentiles.
pub fn flag(records: Vec<CleanMovieRecord>) -> Vec<FlaggedMovieRecord> {
    ReliabilityFlagger::new().flag(records).records
}

use crate::constants::{GENRE_SEPARATOR, UNAVAILABLE_GENRE};
use crate::observability::metrics;
use crate::types::{EnrichedMovieRecord, FlaggedMovieRecord, GenreMap};
use tracing::{debug, info, instrument};

/// Convert genre ids to a comma separated string of genre names.
///
/// Unmapped ids render as "Unavailable" in place; an empty id list is
/// "Unavailable" on its own.
pub fn genre_names(genre_ids: &[i64], genre_map: &GenreMap) -> String {
    if genre_ids.is_empty() {
        return UNAVAILABLE_GENRE.to_string();
    }

    genre_ids
        .iter()
        .map(|id| genre_map.resolve(*id))
        .collect::<Vec<_>>()
        .join(GENRE_SEPARATOR)
}

/// Joins genre ids against a genre map to produce display strings
pub struct GenreEnricher<'a> {
    genre_map: &'a GenreMap,
}

impl<'a> GenreEnricher<'a> {
    pub fn new(genre_map: &'a GenreMap) -> Self {
        Self { genre_map }
    }

    pub fn enrich_record(&self, record: FlaggedMovieRecord) -> EnrichedMovieRecord {
        let genres = genre_names(&record.movie.genre_ids, self.genre_map);
        EnrichedMovieRecord {
            flagged: record,
            genres,
        }
    }

    #[instrument(skip(self, records), fields(records = records.len(), genres = self.genre_map.len()))]
    pub fn enrich(&self, records: Vec<FlaggedMovieRecord>) -> Vec<EnrichedMovieRecord> {
        info!("🎭 Enriching movies with genre names...");

        let unresolved = records
            .iter()
            .flat_map(|r| r.movie.genre_ids.iter())
            .filter(|id| !self.genre_map.contains(**id))
            .count();
        if unresolved > 0 {
            debug!("{} genre ids have no entry in the genre map", unresolved);
        }

        let enriched: Vec<EnrichedMovieRecord> =
            records.into_iter().map(|r| self.enrich_record(r)).collect();

        metrics::enrich::records_processed(enriched.len());
        metrics::enrich::unresolved_genres(unresolved);
        enriched
    }
}

/// Convenience entry point for a one-off enrichment pass.
pub fn enrich(records: Vec<FlaggedMovieRecord>, genre_map: &GenreMap) -> Vec<EnrichedMovieRecord> {
    GenreEnricher::new(genre_map).enrich(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CleanMovieRecord, VoteCount};
    use chrono::NaiveDate;

    fn genre_map() -> GenreMap {
        [(28, "Action"), (12, "Adventure"), (35, "Comedy")].into_iter().collect()
    }

    fn flagged(genre_ids: Vec<i64>) -> FlaggedMovieRecord {
        FlaggedMovieRecord {
            movie: CleanMovieRecord {
                id: 1,
                title: "Movie".to_string(),
                popularity: 1.0,
                vote_count: VoteCount::Known(1),
                release_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                genre_ids,
            },
            flagged_as_unreliable: false,
        }
    }

    #[test]
    fn test_names_joined_in_input_order() {
        assert_eq!(genre_names(&[35, 28], &genre_map()), "Comedy, Action");
        assert_eq!(genre_names(&[28], &genre_map()), "Action");
    }

    #[test]
    fn test_unmapped_ids_render_unavailable_in_place() {
        assert_eq!(genre_names(&[28, 999, 12], &genre_map()), "Action, Unavailable, Adventure");
        assert_eq!(genre_names(&[999], &genre_map()), "Unavailable");
    }

    #[test]
    fn test_empty_ids_yield_unavailable() {
        assert_eq!(genre_names(&[], &genre_map()), "Unavailable");
        assert_eq!(genre_names(&[], &GenreMap::default()), "Unavailable");
    }

    #[test]
    fn test_enrich_keeps_flag_and_movie() {
        let mut record = flagged(vec![12]);
        record.flagged_as_unreliable = true;

        let enriched = enrich(vec![record.clone()], &genre_map());
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].genres, "Adventure");
        assert_eq!(enriched[0].flagged, record);
    }

    #[test]
    fn test_genres_never_empty() {
        let records = vec![flagged(vec![]), flagged(vec![1, 2]), flagged(vec![28])];
        for record in enrich(records, &GenreMap::default()) {
            assert!(!record.genres.is_empty());
        }
    }
}

use crate::error::{InsightsError, Result};
use crate::observability::metrics;
use crate::types::{CleanMovieRecord, RawMovieData, RawMovieRecord, VoteCount};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Counts gathered while validating one batch. Diagnostic only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub raw_records: usize,
    pub missing_popularity: usize,
    pub negative_popularity: usize,
    pub unknown_vote_counts: usize,
    pub duplicates_removed: usize,
    pub invalid_release_dates: usize,
    pub outside_year: usize,
    pub clean_records: usize,
}

impl ValidationReport {
    pub fn dropped(&self) -> usize {
        self.raw_records - self.clean_records
    }
}

/// Validator output: the clean table plus what was removed along the way
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMovies {
    pub records: Vec<CleanMovieRecord>,
    pub report: ValidationReport,
}

/// Filters and normalizes raw catalog records for a single release year.
#[derive(Debug, Clone)]
pub struct Validator {
    year: i32,
    window: (NaiveDate, NaiveDate),
}

/// Intermediate row between coercion and date parsing
struct Candidate {
    raw: RawMovieRecord,
    popularity: f64,
    vote_count: VoteCount,
}

impl Validator {
    pub fn new(year: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(InsightsError::InvalidYear(year))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or(InsightsError::InvalidYear(year))?;
        Ok(Self {
            year,
            window: (start, end),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Inclusive `[Jan 1, Dec 31]` window of the target year
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        self.window
    }

    /// Decode untyped catalog payload elements into raw records.
    ///
    /// Fails on the first element that is not a JSON object, lacks an
    /// integer `id`, or carries a non-numeric `popularity`.
    pub fn decode(raw: Vec<RawMovieData>) -> Result<Vec<RawMovieRecord>> {
        raw.into_iter()
            .enumerate()
            .map(|(index, value)| {
                if !value.is_object() {
                    return Err(InsightsError::InputFormat {
                        index,
                        message: format!("expected a JSON object, found {}", json_kind(&value)),
                    });
                }
                serde_json::from_value(value).map_err(|e| InsightsError::InputFormat {
                    index,
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// Decode and validate a raw catalog payload.
    #[instrument(skip(self, raw), fields(year = self.year, raw_records = raw.len()))]
    pub fn validate(&self, raw: Vec<RawMovieData>) -> Result<ValidatedMovies> {
        let records = Self::decode(raw)?;
        Ok(self.validate_records(records))
    }

    /// Apply the validation rules in order; each one narrows the set.
    pub fn validate_records(&self, records: Vec<RawMovieRecord>) -> ValidatedMovies {
        info!("🔍 Starting data cleaning and validation for {}...", self.year);
        let mut report = ValidationReport {
            raw_records: records.len(),
            ..Default::default()
        };
        metrics::validate::raw_records(report.raw_records);

        // 1) Missing popularity
        let with_popularity: Vec<(RawMovieRecord, f64)> = records
            .into_iter()
            .filter_map(|r| {
                let popularity = r.popularity.filter(|p| !p.is_nan())?;
                Some((r, popularity))
            })
            .collect();
        report.missing_popularity = report.raw_records - with_popularity.len();
        info!("Missing popularity values: {}", report.missing_popularity);

        // 2) Negative popularity
        let before = with_popularity.len();
        let non_negative: Vec<(RawMovieRecord, f64)> = with_popularity
            .into_iter()
            .filter(|(_, popularity)| *popularity >= 0.0)
            .collect();
        report.negative_popularity = before - non_negative.len();

        // 3) Vote count coercion; failures are kept as unknown
        let coerced: Vec<Candidate> = non_negative
            .into_iter()
            .map(|(raw, popularity)| {
                let vote_count = VoteCount::coerce(&raw.vote_count);
                Candidate {
                    raw,
                    popularity,
                    vote_count,
                }
            })
            .collect();
        report.unknown_vote_counts = coerced
            .iter()
            .filter(|c| c.vote_count == VoteCount::Unknown)
            .count();

        // 4) Deduplicate by id, first encountered wins
        let before = coerced.len();
        let mut seen = HashSet::with_capacity(before);
        let unique: Vec<Candidate> = coerced
            .into_iter()
            .filter(|c| seen.insert(c.raw.id))
            .collect();
        report.duplicates_removed = before - unique.len();
        info!("Removed {} duplicate records.", report.duplicates_removed);

        // 5) Release date inside the target year
        let (start, end) = self.window;
        let mut clean = Vec::with_capacity(unique.len());
        for candidate in unique {
            match parse_release_date(&candidate.raw.release_date) {
                None => {
                    debug!("Dropping movie {}: unparseable release date", candidate.raw.id);
                    report.invalid_release_dates += 1;
                }
                Some(date) if date < start || date > end => {
                    debug!("Dropping movie {}: released {} outside {}", candidate.raw.id, date, self.year);
                    report.outside_year += 1;
                }
                Some(date) => clean.push(CleanMovieRecord {
                    id: candidate.raw.id,
                    title: candidate.raw.title,
                    popularity: candidate.popularity,
                    vote_count: candidate.vote_count,
                    release_date: date,
                    genre_ids: candidate.raw.genre_ids,
                }),
            }
        }

        // 6) Popularity descending; stable so ties keep ingestion order
        clean.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));

        report.clean_records = clean.len();
        metrics::validate::records_dropped("missing_popularity", report.missing_popularity);
        metrics::validate::records_dropped("negative_popularity", report.negative_popularity);
        metrics::validate::records_dropped("invalid_release_date", report.invalid_release_dates);
        metrics::validate::records_dropped("outside_year", report.outside_year);
        metrics::validate::duplicates_removed(report.duplicates_removed);
        metrics::validate::unknown_vote_counts(report.unknown_vote_counts);
        metrics::validate::clean_records(report.clean_records);
        info!("✅ Cleaned dataset contains {} movies for {}", report.clean_records, self.year);

        ValidatedMovies {
            records: clean,
            report,
        }
    }
}

/// Convenience entry point: validate `raw` for `year` and return the clean table.
pub fn validate(raw: Vec<RawMovieData>, year: i32) -> Result<Vec<CleanMovieRecord>> {
    Ok(Validator::new(year)?.validate(raw)?.records)
}

/// Parse an ISO date, also accepting full ISO timestamps. Anything else is `None`.
pub fn parse_release_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn movie(id: i64, popularity: Value, vote_count: Value, release_date: &str) -> Value {
        json!({
            "id": id,
            "title": format!("Movie {}", id),
            "popularity": popularity,
            "vote_count": vote_count,
            "release_date": release_date,
            "genre_ids": [28]
        })
    }

    #[test]
    fn test_drops_missing_and_negative_popularity() {
        let validator = Validator::new(2023).unwrap();
        let raw = vec![
            movie(1, json!(null), json!(10), "2023-01-10"),
            movie(2, json!(-1.0), json!(10), "2023-01-10"),
            movie(3, json!(0.0), json!(10), "2023-01-10"),
            json!({"id": 4, "vote_count": 3, "release_date": "2023-02-02"}),
        ];

        let result = validator.validate(raw).unwrap();
        let ids: Vec<i64> = result.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(result.report.missing_popularity, 2);
        assert_eq!(result.report.negative_popularity, 1);
        assert_eq!(result.report.dropped(), 3);
    }

    #[test]
    fn test_malformed_vote_count_becomes_unknown() {
        let validator = Validator::new(2023).unwrap();
        let raw = vec![
            movie(1, json!(5.0), json!("n/a"), "2023-03-01"),
            movie(2, json!(4.0), json!("120"), "2023-03-01"),
        ];

        let result = validator.validate(raw).unwrap();
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].vote_count, VoteCount::Unknown);
        assert_eq!(result.records[1].vote_count, VoteCount::Known(120));
        assert_eq!(result.report.unknown_vote_counts, 1);
    }

    #[test]
    fn test_duplicate_ids_keep_first_encountered() {
        let validator = Validator::new(2023).unwrap();
        let raw = vec![
            movie(1, json!(10.0), json!(5), "2023-05-01"),
            movie(1, json!(10.0), json!(999), "2023-05-01"),
        ];

        let result = validator.validate(raw).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].id, 1);
        assert_eq!(result.records[0].vote_count, VoteCount::Known(5));
        assert_eq!(result.report.duplicates_removed, 1);
    }

    #[test]
    fn test_dedup_happens_before_date_filter() {
        let validator = Validator::new(2023).unwrap();
        let raw = vec![
            movie(1, json!(10.0), json!(5), "2022-05-01"),
            movie(1, json!(10.0), json!(5), "2023-05-01"),
        ];

        let result = validator.validate(raw).unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.report.duplicates_removed, 1);
        assert_eq!(result.report.outside_year, 1);
    }

    #[test]
    fn test_year_window_is_inclusive() {
        let validator = Validator::new(2023).unwrap();
        let raw = vec![
            movie(1, json!(1.0), json!(1), "2022-12-31"),
            movie(2, json!(2.0), json!(1), "2023-01-01"),
            movie(3, json!(3.0), json!(1), "2023-12-31"),
            movie(4, json!(4.0), json!(1), "2024-01-01"),
            movie(5, json!(5.0), json!(1), "not a date"),
            movie(6, json!(6.0), json!(1), ""),
        ];

        let result = validator.validate(raw).unwrap();
        let ids: Vec<i64> = result.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(result.report.outside_year, 2);
        assert_eq!(result.report.invalid_release_dates, 2);
    }

    #[test]
    fn test_sorted_by_popularity_descending() {
        let validator = Validator::new(2023).unwrap();
        let raw = vec![
            movie(1, json!(3.5), json!(1), "2023-06-01"),
            movie(2, json!(90.1), json!(1), "2023-06-01"),
            movie(3, json!(12.0), json!(1), "2023-06-01"),
        ];

        let result = validator.validate(raw).unwrap();
        let popularity: Vec<f64> = result.records.iter().map(|r| r.popularity).collect();
        assert_eq!(popularity, vec![90.1, 12.0, 3.5]);
    }

    #[test]
    fn test_non_object_input_is_rejected() {
        let validator = Validator::new(2023).unwrap();
        let raw = vec![movie(1, json!(1.0), json!(1), "2023-06-01"), json!("oops")];

        match validator.validate(raw) {
            Err(InsightsError::InputFormat { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InputFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_id_and_bad_popularity_are_rejected() {
        assert!(matches!(
            Validator::decode(vec![json!({"popularity": 1.0})]),
            Err(InsightsError::InputFormat { index: 0, .. })
        ));
        assert!(matches!(
            Validator::decode(vec![json!({"id": 1, "popularity": "high"})]),
            Err(InsightsError::InputFormat { index: 0, .. })
        ));
    }

    #[test]
    fn test_loose_title_and_genre_ids_do_not_fail_decode() {
        let decoded = Validator::decode(vec![
            json!({"id": 1, "title": 1917, "popularity": 3.0, "genre_ids": [18, "war", 10752.5, 36]}),
            json!({"id": 2, "title": null, "popularity": 2.0, "genre_ids": "18"}),
        ])
        .unwrap();

        assert_eq!(decoded[0].title, "1917");
        assert_eq!(decoded[0].genre_ids, vec![18, 36]);
        assert_eq!(decoded[1].title, "");
        assert!(decoded[1].genre_ids.is_empty());
    }

    #[test]
    fn test_release_date_formats() {
        assert_eq!(
            parse_release_date(&json!("2023-07-04")),
            NaiveDate::from_ymd_opt(2023, 7, 4)
        );
        assert_eq!(
            parse_release_date(&json!("2023-07-04T10:00:00Z")),
            NaiveDate::from_ymd_opt(2023, 7, 4)
        );
        assert_eq!(parse_release_date(&json!("2023-02-30")), None);
        assert_eq!(parse_release_date(&json!(20230704)), None);
        assert_eq!(parse_release_date(&Value::Null), None);
    }

    #[test]
    fn test_unrepresentable_year() {
        assert!(matches!(Validator::new(i32::MAX), Err(InsightsError::InvalidYear(_))));
    }

    #[test]
    fn test_validating_own_output_is_noop() {
        let validator = Validator::new(2023).unwrap();
        let raw = vec![
            movie(1, json!(3.0), json!("x"), "2023-06-01"),
            movie(2, json!(9.0), json!(4), "2023-02-01"),
            movie(2, json!(9.0), json!(4), "2023-02-01"),
            movie(3, json!(null), json!(4), "2023-02-01"),
        ];
        let first = validator.validate(raw).unwrap().records;

        let again: Vec<RawMovieRecord> = first.iter().cloned().map(RawMovieRecord::from).collect();
        let second = validator.validate_records(again).records;
        assert_eq!(first, second);
    }
}

use chrono::{Datelike, NaiveDate};
use movie_insights::pipeline::processing::enrich::genre_names;
use movie_insights::pipeline::processing::{ReliabilityFlagger, Validator};
use movie_insights::types::{GenreMap, RawMovieRecord};
use movie_insights::{enrich, flag, validate};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;

fn vote_count_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0u64..5_000).prop_map(|v| json!(v)),
        (0u64..5_000).prop_map(|v| json!(v.to_string())),
        Just(Value::Null),
        Just(json!("unknown")),
        Just(json!(-3)),
    ]
}

fn release_date_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        8 => (2022i32..=2024, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| json!(format!("{:04}-{:02}-{:02}", y, m, d))),
        1 => Just(Value::Null),
        1 => Just(json!("")),
    ]
}

fn raw_movie_strategy() -> impl Strategy<Value = Value> {
    (
        0i64..20,
        proptest::option::of(-5.0f64..100.0),
        vote_count_strategy(),
        release_date_strategy(),
        proptest::collection::vec(1i64..6, 0..3),
    )
        .prop_map(|(id, popularity, vote_count, release_date, genre_ids)| {
            json!({
                "id": id,
                "title": format!("Movie {}", id),
                "popularity": popularity,
                "vote_count": vote_count,
                "release_date": release_date,
                "genre_ids": genre_ids
            })
        })
}

fn genre_map() -> GenreMap {
    [(1, "Action"), (2, "Comedy"), (3, "Drama")].into_iter().collect()
}

proptest! {
    #[test]
    fn prop_clean_records_satisfy_validity(raw in proptest::collection::vec(raw_movie_strategy(), 0..60)) {
        let clean = validate(raw, 2023).unwrap();

        let mut seen = HashSet::new();
        for record in &clean {
            prop_assert!(record.popularity >= 0.0);
            prop_assert_eq!(record.release_date.year(), 2023);
            prop_assert!(seen.insert(record.id));
        }
        for pair in clean.windows(2) {
            prop_assert!(pair[0].popularity >= pair[1].popularity);
        }
    }

    #[test]
    fn prop_validation_is_idempotent(raw in proptest::collection::vec(raw_movie_strategy(), 0..60)) {
        let validator = Validator::new(2023).unwrap();
        let once = validator.validate(raw).unwrap().records;
        let again = validator
            .validate_records(once.iter().cloned().map(RawMovieRecord::from).collect())
            .records;
        prop_assert_eq!(once, again);
    }

    #[test]
    fn prop_every_row_has_a_genre_string(raw in proptest::collection::vec(raw_movie_strategy(), 0..60)) {
        let enriched = enrich(flag(validate(raw, 2023).unwrap()), &genre_map());
        for record in &enriched {
            prop_assert!(!record.genres.is_empty());
            if record.flagged.movie.genre_ids.is_empty() {
                prop_assert_eq!(record.genres.as_str(), "Unavailable");
            }
        }
    }

    #[test]
    fn prop_flags_need_a_low_vote_threshold(raw in proptest::collection::vec(raw_movie_strategy(), 0..60)) {
        let flagged = ReliabilityFlagger::new().flag(validate(raw, 2023).unwrap());
        let count = flagged.records.iter().filter(|r| r.flagged_as_unreliable).count();
        prop_assert_eq!(count, flagged.report.flagged);
        if flagged.report.low_vote_threshold.is_none() {
            prop_assert_eq!(count, 0);
        }
        for record in flagged.records.iter().filter(|r| r.flagged_as_unreliable) {
            prop_assert!(record.movie.vote_count.known().is_some());
        }
    }

    #[test]
    fn prop_flag_report_ignores_input_order(raw in proptest::collection::vec(raw_movie_strategy(), 0..60)) {
        let clean = validate(raw, 2023).unwrap();
        let mut reversed = clean.clone();
        reversed.reverse();

        let flagger = ReliabilityFlagger::new();
        prop_assert_eq!(flagger.flag(clean).report, flagger.flag(reversed).report);
    }
}

#[test]
fn test_empty_genre_list_is_unavailable() {
    assert_eq!(genre_names(&[], &genre_map()), "Unavailable");
    assert_eq!(genre_names(&[3, 1], &genre_map()), "Drama, Action");
}

#[test]
fn test_validator_window_covers_whole_year() {
    let validator = Validator::new(2023).unwrap();
    assert_eq!(
        validator.window(),
        (
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        )
    );
}

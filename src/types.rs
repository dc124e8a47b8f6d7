use crate::constants::UNAVAILABLE_GENRE;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// Raw movie data as returned from the catalog API
pub type RawMovieData = serde_json::Value;

/// A movie record as the catalog returns it, before any validation.
///
/// `vote_count` and `release_date` stay untyped because the source may send
/// malformed values for them; those are resolved by the validator rather
/// than rejected at decode time. A non-string `title` is kept as its JSON
/// text and non-integer `genre_ids` entries are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMovieRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_title")]
    pub title: String,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_count: Value,
    #[serde(default)]
    pub release_date: Value,
    #[serde(default, deserialize_with = "integer_entries")]
    pub genre_ids: Vec<i64>,
}

fn lenient_title<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(title) => title,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn integer_entries<'de, D>(deserializer: D) -> std::result::Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().filter_map(Value::as_i64).collect(),
        _ => Vec::new(),
    })
}

/// Vote count after coercion. Values that cannot be read as a non-negative
/// integer become `Unknown` instead of dropping the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteCount {
    Known(u64),
    Unknown,
}

impl VoteCount {
    /// Coerce a raw JSON value: integers, integral floats, and numeric strings
    /// are accepted; negatives, fractions, and everything else are `Unknown`.
    pub fn coerce(value: &Value) -> Self {
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    VoteCount::Known(v)
                } else if n.is_i64() {
                    VoteCount::Unknown
                } else {
                    n.as_f64().map_or(VoteCount::Unknown, Self::from_float)
                }
            }
            Value::String(s) => {
                let trimmed = s.trim();
                if let Ok(v) = trimmed.parse::<u64>() {
                    VoteCount::Known(v)
                } else {
                    trimmed
                        .parse::<f64>()
                        .map_or(VoteCount::Unknown, Self::from_float)
                }
            }
            _ => VoteCount::Unknown,
        }
    }

    fn from_float(v: f64) -> Self {
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
            VoteCount::Known(v as u64)
        } else {
            VoteCount::Unknown
        }
    }

    pub fn known(&self) -> Option<u64> {
        match self {
            VoteCount::Known(v) => Some(*v),
            VoteCount::Unknown => None,
        }
    }

    /// Unknown counts are never below a threshold.
    pub fn is_below(&self, threshold: f64) -> bool {
        match self {
            VoteCount::Known(v) => (*v as f64) < threshold,
            VoteCount::Unknown => false,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            VoteCount::Known(v) => Value::from(*v),
            VoteCount::Unknown => Value::Null,
        }
    }
}

impl Serialize for VoteCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            VoteCount::Known(v) => serializer.serialize_u64(*v),
            VoteCount::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for VoteCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(VoteCount::coerce(&value))
    }
}

/// A record that passed validation: popularity present and non-negative,
/// release date inside the target year, identifier unique in its set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanMovieRecord {
    pub id: i64,
    pub title: String,
    pub popularity: f64,
    pub vote_count: VoteCount,
    pub release_date: NaiveDate,
    pub genre_ids: Vec<i64>,
}

impl From<CleanMovieRecord> for RawMovieRecord {
    fn from(record: CleanMovieRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            popularity: Some(record.popularity),
            vote_count: record.vote_count.to_value(),
            release_date: Value::String(record.release_date.format("%Y-%m-%d").to_string()),
            genre_ids: record.genre_ids,
        }
    }
}

/// A clean record carrying the reliability flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedMovieRecord {
    #[serde(flatten)]
    pub movie: CleanMovieRecord,
    pub flagged_as_unreliable: bool,
}

/// A flagged record with its display genre string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMovieRecord {
    #[serde(flatten)]
    pub flagged: FlaggedMovieRecord,
    pub genres: String,
}

/// One row of the final report, in output column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieInsightRow {
    pub title: String,
    pub popularity: f64,
    pub vote_count: VoteCount,
    pub genres: String,
    pub flagged_as_unreliable: bool,
}

impl From<EnrichedMovieRecord> for MovieInsightRow {
    fn from(record: EnrichedMovieRecord) -> Self {
        let EnrichedMovieRecord { flagged, genres } = record;
        Self {
            title: flagged.movie.title,
            popularity: flagged.movie.popularity,
            vote_count: flagged.movie.vote_count,
            genres,
            flagged_as_unreliable: flagged.flagged_as_unreliable,
        }
    }
}

/// Genre id to display name lookup, fixed for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreMap {
    names: HashMap<i64, String>,
}

impl GenreMap {
    pub fn new(names: HashMap<i64, String>) -> Self {
        Self { names }
    }

    /// Name for `id`, or "Unavailable" when the id is not mapped.
    pub fn resolve(&self, id: i64) -> &str {
        self.names.get(&id).map(String::as_str).unwrap_or(UNAVAILABLE_GENRE)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.names.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(i64, S)> for GenreMap {
    fn from_iter<I: IntoIterator<Item = (i64, S)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }
}

/// Report file format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Excel,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Excel => "xlsx",
        }
    }
}

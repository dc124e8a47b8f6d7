//! Movie insights pipeline: fetch a year of TMDB movies, validate them, flag
//! suspiciously popular but under-voted titles, attach genre names, and write
//! a JSON or spreadsheet report.

pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod types;

// Application and infrastructure layers
pub mod app;
pub mod infra;

pub use error::{InsightsError, Result};
pub use pipeline::processing::enrich::enrich;
pub use pipeline::processing::flag::flag;
pub use pipeline::processing::validate::validate;

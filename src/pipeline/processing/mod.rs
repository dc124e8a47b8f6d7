// Pipeline processing: validation, reliability flagging, and genre enrichment

pub mod enrich;
pub mod flag;
pub mod stats;
pub mod validate;

pub use enrich::GenreEnricher;
pub use flag::{FlagReport, FlaggedMovies, ReliabilityFlagger};
pub use validate::{ValidatedMovies, ValidationReport, Validator};

// Application layer: use cases and the ports they depend on

pub mod insights_use_case;
pub mod ports;

pub use insights_use_case::{InsightsUseCase, RunSummary};

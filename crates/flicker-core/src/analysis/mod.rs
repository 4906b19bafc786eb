pub mod aggregate;
pub mod fluctuation;
pub mod summary;

pub use aggregate::{aggregate, aggregate_from_repository, DatasetAggregate, ImageSummary};
pub use fluctuation::{analyze, decompose, FluctuationStats};
pub use summary::{summarize, BatchSummary, DatasetSummary};

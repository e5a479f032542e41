//! Record ingestion, aggregation and the pipeline driver

pub mod source;
pub mod parser;
pub mod aggregator;
pub mod pipeline;

pub use source::{SourceError, WigleCsvSource};
pub use parser::{parse_record, RawRecord, RecordOutcome, SkipReason};
pub use aggregator::{aggregate, Aggregation, ObservationAggregator, ObservationGroup, SkipTally};
pub use pipeline::{PipelineOutcome, RunSummary, TriangulationPipeline};

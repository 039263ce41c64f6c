pub mod isnad;
pub mod processing;
pub mod store;

// Re-export main types for convenient access
pub use isnad::{
    normalize_arabic, normalize_english,
    BoundaryRule, BoundaryRules, ChainSegmenter, Segmentation
};

// Re-export batch pipeline types
pub use processing::{
    ProcessedRecord, ProcessingConfig, RunStats,
    process_record, process_records_parallel, write_stats
};
pub use store::{HadithRecord, HadithStore, RecordKey, StoreConfig};

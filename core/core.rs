pub mod config;
pub mod error;
pub mod filter;
pub mod gather;
pub mod output_formats;
pub mod report;
pub mod strip;

pub use config::{ConfigFormat, ConfigOverrides, OutputFormatConfig, RuleSet};
pub use error::{AppError, Result};
pub use filter::{Decision, FileCandidate, decide};
pub use gather::{AggregationResult, AggregationStats, Aggregator, FileRecord, aggregate, run};
pub use output_formats::{DEFAULT_DELIMITER, default_config_json, render_records};
pub use report::{AggregationEvent, LogSink, MemorySink, NullSink, ReportSink};
pub use strip::{strip, strip_line_comments};

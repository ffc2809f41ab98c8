//! Ranks a folder of photos for social media using a vision oracle, keeping
//! only the best shot out of each set of near-duplicates.

pub mod encode;
pub mod grouping;
pub mod oracle;
pub mod pipeline;
pub mod ranking;
pub mod record;
pub mod report;
pub mod scan;

pub use grouping::{GroupLimits, GroupingStats};
pub use oracle::{Assessment, OllamaOracle, OpenAiOracle, Oracle, OracleError};
pub use pipeline::{Evaluator, EvaluatorConfig};
pub use record::PhotoRecord;

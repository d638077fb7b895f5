pub mod config;
pub mod error;
pub mod schema;
pub mod table;
pub mod parse;
pub mod derive;
pub mod aggregate;
pub mod report;
pub mod tool;
pub mod run;

pub use config::Config;
pub use error::{EvalError, Result};
pub use aggregate::{aggregate, EvaluationReport, Summary};
pub use run::{execute, EvaluationRun, OutputSource};
pub use schema::{MetricSchema, SchemaKind};
pub use table::{MetricTable, QueryMetrics};

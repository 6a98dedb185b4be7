pub mod columns;
pub mod problem;
pub mod report;

pub use problem::{problem_documents, NewProblem, Problem, ProblemContext, ProblemOutcome, ProblemType};
pub use report::{FeatureRecord, FeatureReport, FeatureRow, MetricRecord, FIXED_COLUMNS};

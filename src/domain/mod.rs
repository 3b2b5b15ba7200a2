//! Domain layer - Test cases, classifier seam and evaluation rules

pub mod classifier;
pub mod error;
pub mod evaluation;
pub mod test_case;

pub use classifier::{Approach, Classification, ClassifierAdapter};
pub use error::DomainError;
pub use evaluation::{
    CaseEvaluation, EvaluationResult, EvaluationRun, Evaluator, FailureReason, Outcome,
    RunSummary,
};
pub use test_case::{QueryType, Selection, TestCase, TestCaseRegistry};

//! Test case domain - Test case definitions, validation and selection

mod entity;
mod registry;
mod selection;
mod validation;

pub use entity::{QueryType, TestCase};
pub use registry::{SelectedCase, TestCaseQuery, TestCaseRegistry};
pub use selection::{Selection, SelectionError, SelectionExpr};
pub use validation::{validate_test_case, TestCaseValidationError};

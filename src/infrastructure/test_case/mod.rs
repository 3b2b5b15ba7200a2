//! Test case sources - built-in dataset and dataset files

mod builtin;
mod loader;

pub use builtin::{builtin_registry, builtin_test_cases, BENCHMARK_MARKER};
pub use loader::{load_registry, load_test_cases, parse_json, parse_toml, TestCaseFileError};

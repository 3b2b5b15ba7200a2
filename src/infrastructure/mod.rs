//! Infrastructure layer - Classifier adapters, datasets, reports and services

pub mod classifier;
pub mod logging;
pub mod observability;
pub mod report;
pub mod services;
pub mod test_case;

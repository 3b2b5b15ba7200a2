//! Infrastructure services

mod evaluation_service;

pub use evaluation_service::{
    resolve_workers, EvaluationOptions, EvaluationService, FailureInspector,
};

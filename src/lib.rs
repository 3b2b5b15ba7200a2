//! Category classification evaluation harness
//!
//! Compares two category classification strategies for search queries:
//! - OLD: confidence derived from the share of matching results
//! - RAG: LLM classification over retrieved context
//!
//! Each declarative test case is sent to both classifiers, the responses are
//! judged against the expected category, filter decision and confidence, and
//! the run is reported as console text, HTML, JSON or JUnit XML.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use domain::evaluation::Evaluator;
use domain::DomainError;
use infrastructure::classifier::ClassifierFactory;
use tracing::info;

/// Create the evaluator for a configuration
pub fn create_evaluator(config: &AppConfig) -> Result<Evaluator, DomainError> {
    let pair = ClassifierFactory::create(&config.adapters)?;

    match config.adapters.replay_file {
        Some(ref path) => info!(replay = %path.display(), "Using replayed classifications"),
        None => info!(
            old = config.adapters.old.base_url.as_deref().unwrap_or_default(),
            rag = config.adapters.rag.base_url.as_deref().unwrap_or_default(),
            "Using search service classifiers"
        ),
    }

    Ok(Evaluator::new(pair.old, pair.rag)?
        .with_slow_threshold_ms(config.evaluation.slow_threshold_ms))
}

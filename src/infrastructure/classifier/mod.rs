//! Classifier adapters - search service over HTTP and recorded replays

mod factory;
mod http_client;
mod replay;
mod search_api;

pub use factory::{ClassifierFactory, ClassifierPair};
pub use http_client::{HttpClient, HttpClientTrait};
pub use replay::{ReplayClassifier, ReplayFixtureSet};
pub use search_api::{SearchApiClassifier, DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_PATH};

//! Classifier domain - the adapter seam to the classification strategies

mod adapter;

pub use adapter::{Approach, Classification, ClassifierAdapter};

#[cfg(test)]
pub use adapter::MockClassifierAdapter;

use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Adapter error: {adapter} - {message}")]
    Adapter { adapter: String, message: String },

    #[error("Report error: {message}")]
    Report { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn adapter(adapter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Adapter {
            adapter: adapter.into(),
            message: message.into(),
        }
    }

    pub fn report(message: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
        }
    }

    /// Whether this error belongs to the configuration taxonomy (aborts a run
    /// before any adapter is invoked)
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let error = DomainError::configuration("duplicate test case 'filters'");
        assert_eq!(
            error.to_string(),
            "Configuration error: duplicate test case 'filters'"
        );
        assert!(error.is_configuration());
    }

    #[test]
    fn test_adapter_error() {
        let error = DomainError::adapter("rag", "HTTP 503: unavailable");
        assert_eq!(error.to_string(), "Adapter error: rag - HTTP 503: unavailable");
        assert!(!error.is_configuration());
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input");
        assert_eq!(error.to_string(), "Validation error: Invalid input");
    }
}

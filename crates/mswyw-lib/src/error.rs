//! Error taxonomy shared by every scoring stage
//!
//! Every failure aborts the current run; there is no recoverable subset.

use thiserror::Error;

/// Errors raised while resolving inputs, extracting metrics or scoring
#[derive(Debug, Error)]
pub enum MswywError {
    #[error("missing coefficient {name}")]
    MissingCoefficient { name: String },

    #[error("{name} is set to {value}, which is not a valid number")]
    InvalidCoefficientValue { name: String, value: String },

    #[error("cannot resolve {descriptor}: {reason}")]
    UnresolvableDescriptor { descriptor: String, reason: String },

    #[error("malformed data from {origin}: {reason}")]
    MalformedData { origin: String, reason: String },

    #[error("no apps found under the parameters provided")]
    EmptyAppList,

    /// Connection, timeout, decode and non-success status failures all land here
    #[error("backend unavailable at {url}: {reason}")]
    BackendUnavailable { url: String, reason: String },

    #[error("cannot aggregate an empty list of metric records")]
    EmptyInput,
}

impl MswywError {
    pub fn unresolvable(descriptor: impl Into<String>, reason: impl ToString) -> Self {
        Self::UnresolvableDescriptor {
            descriptor: descriptor.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedData {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub fn backend(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::BackendUnavailable {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MswywError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_carries_url() {
        let err = MswywError::backend("http://kibana:5601/s/apm", "status 503");
        assert!(err.to_string().contains("http://kibana:5601/s/apm"));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_invalid_coefficient_message() {
        let err = MswywError::InvalidCoefficientValue {
            name: "cpu".to_string(),
            value: "\"lots\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cpu is set to \"lots\", which is not a valid number"
        );
    }
}

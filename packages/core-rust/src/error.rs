use http::header::{HeaderName, InvalidHeaderValue};

/// Errors reported by identifier strategies.
///
/// None of these abort request processing: the injector logs them and
/// continues with whatever identifier it already has.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("entropy source failed: {reason}")]
    Entropy { reason: String },
    #[error("identifier is not a valid value for header {header}")]
    InvalidHeaderValue {
        header: HeaderName,
        #[source]
        source: InvalidHeaderValue,
    },
    #[error("{0}")]
    Custom(String),
}

//! Error types for pool operations
use thiserror::Error;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for pool operations
#[derive(Error, Debug)]
pub enum Error {
    /// The constructor failed to produce a resource
    #[error("Construction failed: {message}")]
    Construction {
        /// The failure reason
        message: String,
        /// The underlying error
        #[source]
        source: Option<BoxError>,
    },

    /// A resource was released although the pool holds no acquisition for it
    #[error("Trying to reuse unacquired resource {resource}")]
    UnacquiredResource {
        /// Description of the offending resource
        resource: String,
    },

    /// A capability call on a resource failed
    #[error("Resource {operation} failed: {message}")]
    Resource {
        /// The capability that failed (`viable`, `reusable`, `close`)
        operation: &'static str,
        /// The failure reason
        message: String,
        /// The underlying error
        #[source]
        source: Option<BoxError>,
    },

    /// No resource was obtained within the configured acquire timeout
    #[error("Acquire timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// The pool's owning scope has ended; no more resources are handed out
    #[error("Pool scope has ended")]
    ScopeEnded,

    /// Pool configuration is invalid
    #[error("Configuration error: {message}")]
    Configuration {
        /// The error message
        message: String,
    },

    /// A pool policy hook failed
    #[error("Policy failed: {message}")]
    Policy {
        /// The failure reason
        message: String,
        /// The underlying error
        #[source]
        source: Option<BoxError>,
    },
}

impl Error {
    /// Create a construction error
    pub fn construction<S: Into<String>>(message: S) -> Self {
        Self::Construction {
            message: message.into(),
            source: None,
        }
    }

    /// Create a construction error wrapping an underlying cause
    pub fn construction_from<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Construction {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Create a resource capability error
    pub fn resource<S: Into<String>>(operation: &'static str, message: S) -> Self {
        Self::Resource {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a policy error
    pub fn policy<S: Into<String>>(message: S) -> Self {
        Self::Policy {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn unacquired(resource: impl Into<String>) -> Self {
        Self::UnacquiredResource {
            resource: resource.into(),
        }
    }

    /// Check if retrying the failed operation may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Construction { .. } | Self::Timeout { .. })
    }

    /// Check if this error reports the release of an unacquired resource
    #[must_use]
    pub fn is_unacquired(&self) -> bool {
        matches!(self, Self::UnacquiredResource { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unacquired_message_names_the_resource() {
        let err = Error::unacquired("#3");
        assert!(err.is_unacquired());
        assert!(err.to_string().contains("unacquired resource #3"));
    }

    #[test]
    fn retryable_classification() {
        assert!(Error::construction("refused").is_retryable());
        assert!(Error::Timeout { timeout_ms: 10 }.is_retryable());
        assert!(!Error::unacquired("#1").is_retryable());
        assert!(!Error::configuration("limit").is_retryable());
        assert!(!Error::ScopeEnded.is_retryable());
    }

    #[test]
    fn construction_from_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::construction_from(io);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "Construction failed: refused");
    }
}

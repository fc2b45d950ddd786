//! Result and error types for wayfinder.

use thiserror::Error;

/// Result type for wayfinder operations
pub type NavResult<T> = Result<T, NavError>;

/// Errors that can occur while registering or resolving navigation steps
#[derive(Debug, Error)]
pub enum NavError {
    /// No step registered under the requested key
    #[error("No navigation step '{step}' registered for {subject_type}")]
    UnknownStep {
        /// Subject type name
        subject_type: String,
        /// Requested step name
        step: String,
    },

    /// A step is already registered under this key
    #[error("Navigation step '{step}' is already registered for {subject_type}")]
    DuplicateStep {
        /// Subject type name
        subject_type: String,
        /// Step name
        step: String,
    },

    /// Registration attempted after the registry was sealed
    #[error("Cannot register '{step}' for {subject_type}: registry is sealed")]
    RegistrySealed {
        /// Subject type name
        subject_type: String,
        /// Step name
        step: String,
    },

    /// The prerequisite graph loops back on itself
    #[error("Cyclic navigation detected: {}", chain.join(" -> "))]
    CyclicNavigation {
        /// Visited steps, ending with the repeated one
        chain: Vec<String>,
    },

    /// A parent prerequisite was requested on a subject without a parent
    #[error("Step '{step}' needs the parent of '{subject}', which has none")]
    MissingParent {
        /// Subject key
        subject: String,
        /// Step declaring the prerequisite
        step: String,
    },

    /// The view never became displayed, even after the retry
    #[error("Navigation to '{step}' for '{subject}' failed; observed state: {observed}")]
    NavigationFailed {
        /// Step that could not be reached
        step: String,
        /// Subject key
        subject: String,
        /// Last observed session state
        observed: String,
    },

    /// The target object does not exist in the remote application
    #[error("Object '{subject}' not found: {message}")]
    ObjectNotFound {
        /// Subject key
        subject: String,
        /// Error message
        message: String,
    },

    /// A step transition could not be performed
    #[error("Step '{step}' failed: {message}")]
    StepFailed {
        /// Step name
        step: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl NavError {
    /// Create an [`NavError::ObjectNotFound`] error
    #[must_use]
    pub fn not_found(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Create a [`NavError::StepFailed`] error
    #[must_use]
    pub fn step_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StepFailed {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Misconfiguration errors that must stop the run
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnknownStep { .. }
                | Self::DuplicateStep { .. }
                | Self::RegistrySealed { .. }
                | Self::CyclicNavigation { .. }
                | Self::MissingParent { .. }
        )
    }

    /// True when the object is confirmed absent, as opposed to unreachable
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_step_display() {
        let err = NavError::UnknownStep {
            subject_type: "Domain".to_string(),
            step: "Details".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No navigation step 'Details' registered for Domain"
        );
    }

    #[test]
    fn test_cyclic_display_joins_chain() {
        let err = NavError::CyclicNavigation {
            chain: vec!["A::One".into(), "A::Two".into(), "A::One".into()],
        };
        assert_eq!(
            err.to_string(),
            "Cyclic navigation detected: A::One -> A::Two -> A::One"
        );
    }

    #[test]
    fn test_navigation_failed_carries_observed_state() {
        let err = NavError::NavigationFailed {
            step: "Details".into(),
            subject: "zone-a".into(),
            observed: "page=all".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Details"));
        assert!(msg.contains("zone-a"));
        assert!(msg.contains("page=all"));
    }

    #[test]
    fn test_classification() {
        assert!(NavError::CyclicNavigation { chain: vec![] }.is_fatal());
        assert!(NavError::DuplicateStep {
            subject_type: "W".into(),
            step: "Show".into()
        }
        .is_fatal());
        assert!(!NavError::not_found("zone", "gone").is_fatal());
        assert!(NavError::not_found("zone", "gone").is_not_found());
        assert!(!NavError::step_failed("Edit", "no button").is_not_found());
        assert!(!NavError::Timeout { ms: 10 }.is_fatal());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: NavError = io.into();
        assert!(matches!(err, NavError::Io(_)));
    }
}

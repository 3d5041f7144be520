use crate::domain::model::{ActorId, ParentRef, ResourceKind};
use crate::domain::ports::StoreError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("{message}: {kind} '{resource}' still has active {}", .kind.child_label())]
    DependencyBlocked {
        kind: ResourceKind,
        resource: String,
        message: &'static str,
    },

    #[error("{operation} failed for {resource}: {source}")]
    Infrastructure {
        operation: &'static str,
        resource: String,
        #[source]
        source: StoreError,
    },

    #[error("Request is not authenticated")]
    Unauthenticated,

    #[error("Actor {actor} is not allowed to delete {kind} '{resource}'")]
    Forbidden {
        actor: ActorId,
        kind: ResourceKind,
        resource: String,
    },

    #[error("Deleting {kind} '{resource}' timed out after {elapsed:?}")]
    Timeout {
        kind: ResourceKind,
        resource: String,
        elapsed: Duration,
    },

    #[error("{kind} '{name}' not found")]
    UnknownResource { kind: ResourceKind, name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Dependency,
    Infrastructure,
    Access,
    Configuration,
}

impl GuardError {
    pub fn blocked(kind: ResourceKind, resource: impl Into<String>) -> Self {
        GuardError::DependencyBlocked {
            kind,
            resource: resource.into(),
            message: kind.blocked_message(),
        }
    }

    pub fn infrastructure(operation: &'static str, parent: ParentRef, source: StoreError) -> Self {
        GuardError::Infrastructure {
            operation,
            resource: parent.to_string(),
            source,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, GuardError::DependencyBlocked { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GuardError::DependencyBlocked { .. } => ErrorCategory::Dependency,
            GuardError::Infrastructure { .. } | GuardError::Timeout { .. } => {
                ErrorCategory::Infrastructure
            }
            GuardError::Unauthenticated | GuardError::Forbidden { .. } => ErrorCategory::Access,
            GuardError::UnknownResource { .. }
            | GuardError::IoError(_)
            | GuardError::TomlError(_)
            | GuardError::TomlSerializeError(_)
            | GuardError::SerializationError(_)
            | GuardError::ConfigError { .. }
            | GuardError::InvalidConfigValueError { .. }
            | GuardError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            GuardError::DependencyBlocked { kind, .. } => format!(
                "Delete or deactivate the remaining {} first, then retry",
                kind.child_label()
            ),
            GuardError::Infrastructure { .. } => {
                "Check storage connectivity and retry the request".to_string()
            }
            GuardError::Timeout { .. } => {
                "Retry later or raise request_timeout_ms in the configuration".to_string()
            }
            GuardError::Unauthenticated => "Log in and pass a valid actor id".to_string(),
            GuardError::Forbidden { .. } => {
                "Ask an administrator for delete permission on this resource".to_string()
            }
            GuardError::UnknownResource { .. } => {
                "Check the resource name against the inventory".to_string()
            }
            _ => "Check the configuration file".to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Dependency => 2,
            ErrorCategory::Infrastructure => 1,
            ErrorCategory::Access | ErrorCategory::Configuration => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;

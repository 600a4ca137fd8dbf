use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification.
/// Every area error (`RecordError`, `ModelError`, `RegistryError`,
/// `EntityError`, `IdentityKeyError`, `SourceError`, `SessionError`,
/// `ConfigError`) converts into this type at the public boundary.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub kind: ErrorKind,
    pub message: String,
}

impl InternalError {
    /// Construct an InternalError from its classification parts.
    pub fn new(
        class: ErrorClass,
        origin: ErrorOrigin,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            class,
            origin,
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorKind
///
/// Closed set of failure kinds a caller can match on.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    MissingIdentityField,
    InvalidIdentityKey,
    UnknownEntityType,
    DuplicateEntityType,
    MissingFieldDeclaration,
    DuplicateFieldDeclaration,
    UnsupportedRecordShape,
    UndeclaredRelation,
    UnsupportedFormat,
    IndexOutOfRange,
    SourceUnavailable,
    RecordNotFound,
    MissingSource,
    RelationDepthExceeded,
    InvalidConfig,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::MissingIdentityField => "missing_identity_field",
            Self::InvalidIdentityKey => "invalid_identity_key",
            Self::UnknownEntityType => "unknown_entity_type",
            Self::DuplicateEntityType => "duplicate_entity_type",
            Self::MissingFieldDeclaration => "missing_field_declaration",
            Self::DuplicateFieldDeclaration => "duplicate_field_declaration",
            Self::UnsupportedRecordShape => "unsupported_record_shape",
            Self::UndeclaredRelation => "undeclared_relation",
            Self::UnsupportedFormat => "unsupported_format",
            Self::IndexOutOfRange => "index_out_of_range",
            Self::SourceUnavailable => "source_unavailable",
            Self::RecordNotFound => "record_not_found",
            Self::MissingSource => "missing_source",
            Self::RelationDepthExceeded => "relation_depth_exceeded",
            Self::InvalidConfig => "invalid_config",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    Unsupported,
    Unavailable,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Unsupported => "unsupported",
            Self::Unavailable => "unavailable",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Record,
    Model,
    Entity,
    Cache,
    Source,
    Session,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Record => "record",
            Self::Model => "model",
            Self::Entity => "entity",
            Self::Cache => "cache",
            Self::Source => "source",
            Self::Session => "session",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

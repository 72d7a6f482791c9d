use crate::entity::EntityId;

/// Alias for `Result<T, PtError>`.
pub type PtResult<T> = Result<T, PtError>;

/// Errors that can occur while reading, converting or editing properties.
#[derive(Debug, thiserror::Error)]
pub enum PtError {
    /// No object in scope matches the selector.
    #[error("object not found: \"{0}\"")]
    SelectorNotFound(String),

    /// More than one object in scope matches the selector.
    #[error("object is not unique: \"{selector}\" matches {count} objects")]
    SelectorAmbiguous {
        /// The selector as typed.
        selector: String,
        /// How many objects matched.
        count: usize,
    },

    /// The property has never held a value, so its kind cannot be inferred.
    #[error("property {0} is not set")]
    PropertyUnset(String),

    /// A registered-kind value names a type the registry does not know.
    #[error("type not registered: {0}")]
    TypeNotRegistered(String),

    /// Input text could not be read as the expected kind.
    #[error("cannot read {input:?} as {kind}: {reason}")]
    DecodeFailed {
        /// Display form of the expected kind.
        kind: String,
        /// The offending input.
        input: String,
        /// Why decoding failed.
        reason: String,
    },

    /// A reference names an identifier with no live entity behind it.
    #[error("reference not found: {0}")]
    ReferenceNotFound(String),

    /// The property's kind has no decode path from free text.
    #[error("setting property {property} of kind {kind} is not supported")]
    UnsupportedKind {
        /// The canonical property name.
        property: String,
        /// Display form of the property's kind.
        kind: String,
    },

    /// A checked write tried to change the kind a property already holds.
    #[error("property {property} holds {expected}, refusing {found}")]
    KindMismatch {
        /// The canonical property name.
        property: String,
        /// The kind currently stored.
        expected: String,
        /// The kind that was offered.
        found: String,
    },

    /// A converter was handed a value of a kind it does not encode.
    #[error("expected a {expected} value, found {found}")]
    UnexpectedKind {
        /// The kind the converter handles.
        expected: String,
        /// The kind it received.
        found: String,
    },

    /// A type name was registered twice.
    #[error("type already registered: {0}")]
    DuplicateType(String),

    /// The process-wide registry was already built when install was attempted.
    #[error("the process-wide type registry is already installed")]
    RegistryInstalled,

    /// An enum or flags family declaration is unusable.
    #[error("invalid family {name}: {reason}")]
    InvalidFamily {
        /// The family's type name.
        name: String,
        /// What is wrong with the declaration.
        reason: String,
    },

    /// An identifier is held by a live entity or belonged to a destroyed one.
    #[error("identifier already in use or retired: {0}")]
    DuplicateId(EntityId),

    /// The requested entity is not held by the realm.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The wire document itself is malformed.
    #[error("wire format error: {0}")]
    Wire(#[from] serde_json::Error),

    /// The command was not shaped like its usage line.
    #[error("usage: {0}")]
    Usage(String),
}

impl PtError {
    /// Shorthand for a [`PtError::DecodeFailed`].
    pub fn decode(kind: impl ToString, input: &str, reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            kind: kind.to_string(),
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

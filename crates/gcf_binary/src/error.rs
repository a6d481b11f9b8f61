//! Error types that can be emitted from this library
//!
//! Decoding and encoding only ever fail in two ways: the input ran out of bytes
//! ([`Error::OutOfBounds`]) or a record declaration, or a value checked against it,
//! is not valid ([`Error::Schema`]).

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// A read needed more bytes than the buffer had left
    #[error("{field}: needed {requested} bytes at offset {position} but only {remaining} remain")]
    #[diagnostic(
        code(gcf_binary::out_of_bounds),
        help("the input is truncated or does not match the declared layout")
    )]
    OutOfBounds {
        /// Dotted path of the field being decoded, empty when raised by a bare cursor
        field: String,
        /// Cursor position at the failing read
        position: usize,
        /// Bytes the read required
        requested: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// Transparent wrapper for [`SchemaError`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    /// Transparent wrapper for [`std::io::Error`], only raised while loading a byte source
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

impl Error {
    /// Prefix the field path carried by this error with `segment`, the name of an enclosing
    /// field (`drops`) or element index (`[2]`). Errors raised by a declaration pass through.
    pub(crate) fn within(mut self, segment: &str) -> Self {
        let field = match &mut self {
            Error::OutOfBounds { field, .. } => Some(field),
            Error::Schema(schema) => schema.field_mut(),
            Error::IOError(_) => None,
        };
        if let Some(field) = field {
            *field = if field.is_empty() {
                segment.to_owned()
            } else if field.starts_with('[') {
                format!("{segment}{field}")
            } else {
                format!("{segment}.{field}")
            };
        }
        self
    }

    /// Whether this error was caused by truncated input
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Error::OutOfBounds { .. })
    }

    /// Whether this error was caused by an invalid declaration or value
    pub fn is_schema(&self) -> bool {
        matches!(self, Error::Schema(_))
    }

    /// Dotted path of the field the error was raised for, if it concerns a value
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::OutOfBounds { field, .. } => Some(field.as_str()),
            Error::Schema(schema) => schema.field(),
            Error::IOError(_) => None,
        }
    }
}

/// A record declaration is incomplete or inconsistent, or a value violates it
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// string field declared without an encoding mode
    #[error("{record}.{field}: string field has no encoding mode")]
    MissingEncoding { record: String, field: String },

    /// sequence field declared without a count source
    #[error("{record}.{field}: sequence field has no count source")]
    MissingCount { record: String, field: String },

    /// two fields share a name
    #[error("{record}.{field}: field is declared more than once")]
    DuplicateField { record: String, field: String },

    /// a count or presence rule references a field that does not exist
    #[error("{record}.{field}: references unknown field `{target}`")]
    UnknownReference {
        record: String,
        field: String,
        target: String,
    },

    /// a count or presence rule references a field declared after it
    #[error("{record}.{field}: references `{target}` which is declared later")]
    ForwardReference {
        record: String,
        field: String,
        target: String,
    },

    /// a count or presence rule references a field that is not an integer
    #[error("{record}.{field}: referenced field `{target}` is not an integer")]
    ReferenceNotInteger {
        record: String,
        field: String,
        target: String,
    },

    /// a sequence element declares a count that depends on its surroundings
    #[error("{record}.{field}: sequence elements may only use constant counts")]
    ElementCount { record: String, field: String },

    /// a field is declared after one that consumes the rest of the buffer
    #[error("{record}.{field}: declared after `{previous}` which consumes the remaining bytes")]
    FieldAfterRemainder {
        record: String,
        field: String,
        previous: String,
    },

    /// a fixed length of zero
    #[error("{record}.{field}: fixed length must be greater than zero")]
    ZeroLength { record: String, field: String },

    /// a field required for writing is not present on the record
    #[error("{field}: missing from record")]
    MissingField { field: String },

    /// a record carries a field its schema does not declare
    #[error("{field}: not declared by record `{record}`")]
    UndeclaredField { record: String, field: String },

    /// a value does not match the declared field kind
    #[error("{field}: expected {expected} but found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// a value is longer than its fixed length
    #[error("{field}: {length} units exceeds the fixed length of {capacity}")]
    FixedLengthExceeded {
        field: String,
        length: usize,
        capacity: usize,
    },

    /// a blob does not exactly fill its fixed length
    #[error("{field}: blob of {length} bytes does not match the fixed length of {capacity}")]
    BlobLength {
        field: String,
        length: usize,
        capacity: usize,
    },

    /// a length prefixed value is too long for its prefix
    #[error("{field}: {length} units cannot be represented by a {width} byte prefix")]
    PrefixOverflow {
        field: String,
        length: usize,
        width: usize,
    },

    /// a zero terminated or zero padded string contains a zero unit
    #[error("{field}: string contains an embedded zero")]
    EmbeddedZero { field: String },

    /// a sequence length disagrees with its declared count
    #[error("{field}: sequence holds {actual} elements but its count says {expected}")]
    CountMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// a value was given or omitted against the field's presence rule
    #[error("{field}: value presence disagrees with its presence rule (expected present: {expected})")]
    PresenceMismatch { field: String, expected: bool },

    /// decoded bytes are not valid in the declared text encoding
    #[error("{field}: bytes are not valid {encoding} text")]
    InvalidText { field: String, encoding: String },

    /// a remaining count sequence whose elements consume no bytes would never end
    #[error("{field}: elements consume no bytes and cannot fill the remaining buffer")]
    EmptyElement { field: String },

    /// a count field holds a value that cannot be an element count
    #[error("{field}: count field holds {count} which is not a valid element count")]
    InvalidCount { field: String, count: String },

    /// a modifier was applied to a field kind it does not apply to
    #[error("{record}.{field}: `{modifier}` does not apply to this field kind")]
    InvalidModifier {
        record: String,
        field: String,
        modifier: &'static str,
    },
}

impl SchemaError {
    /// Path of the value this error was raised for. Declaration errors name their
    /// record and field separately and are not extended by enclosing fields.
    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaError::MissingField { field }
            | SchemaError::UndeclaredField { field, .. }
            | SchemaError::TypeMismatch { field, .. }
            | SchemaError::FixedLengthExceeded { field, .. }
            | SchemaError::BlobLength { field, .. }
            | SchemaError::PrefixOverflow { field, .. }
            | SchemaError::EmbeddedZero { field }
            | SchemaError::CountMismatch { field, .. }
            | SchemaError::PresenceMismatch { field, .. }
            | SchemaError::InvalidText { field, .. }
            | SchemaError::EmptyElement { field }
            | SchemaError::InvalidCount { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        match self {
            SchemaError::MissingField { field }
            | SchemaError::UndeclaredField { field, .. }
            | SchemaError::TypeMismatch { field, .. }
            | SchemaError::FixedLengthExceeded { field, .. }
            | SchemaError::BlobLength { field, .. }
            | SchemaError::PrefixOverflow { field, .. }
            | SchemaError::EmbeddedZero { field }
            | SchemaError::CountMismatch { field, .. }
            | SchemaError::PresenceMismatch { field, .. }
            | SchemaError::InvalidText { field, .. }
            | SchemaError::EmptyElement { field }
            | SchemaError::InvalidCount { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;

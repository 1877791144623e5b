use derive_more::Display;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Records all errors reported by this library.
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Errors encountered while parsing a package URL string.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    /// Errors encountered while normalizing a package URL.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    /// Errors encountered while building a qualifier set.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Qualifier(#[from] QualifierError),

    /// Errors encountered while percent-decoding a component.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Escape(#[from] EscapeError),
}

impl Error {
    /// The kind of failure, independent of where it was raised.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse(err) => err.kind(),
            Error::Validation(err) => err.kind(),
            Error::Qualifier(err) => err.kind(),
            Error::Escape(err) => err.kind(),
        }
    }
}

/// The flat taxonomy of failures this library reports.
///
/// Each concrete error type maps onto exactly one of these through its `kind` method,
/// which is convenient when callers only care about _what_ went wrong.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The input does not use the `pkg` scheme.
    InvalidScheme,
    /// No `/` separates the type from the rest of the input.
    MissingTypeOrName,
    /// The name is empty after decoding.
    MissingName,
    /// A `%` escape is malformed or decodes to invalid UTF-8.
    MalformedEscape,
    /// A qualifier key does not match the key pattern.
    InvalidQualifierKey,
    /// A qualifier key occurs more than once.
    DuplicateQualifierKey,
    /// A type-specific mandatory field rule was violated.
    InvalidStructure,
    /// The subpath contains a `.` or `..` segment.
    InvalidSubpathSegment,
    /// The type is empty or contains characters outside the type grammar.
    InvalidType,
}

/// Errors encountered when parsing a [`PackageUrl`](crate::PackageUrl) from a string.
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// The input does not start with `pkg:`.
    #[error("input '{input}' does not use the 'pkg' scheme")]
    #[diagnostic(code(packageurl::invalid_scheme))]
    InvalidScheme {
        /// The input originally provided.
        #[source_code]
        input: String,

        /// The location of the scheme.
        #[label("expected 'pkg'")]
        span: SourceSpan,
    },

    /// No `/` separates the type from the rest of the input.
    #[error("input '{input}' is missing a type or name")]
    #[diagnostic(code(packageurl::missing_type_or_name))]
    MissingTypeOrName {
        /// The input originally provided.
        #[source_code]
        input: String,

        /// The location of the path.
        #[label("expected a type, a slash, and a name")]
        span: SourceSpan,
    },

    /// The name was empty after decoding.
    #[error("input '{input}' is missing a name")]
    #[diagnostic(code(packageurl::missing_name))]
    MissingName {
        /// The input originally provided.
        #[source_code]
        input: String,

        /// The location where the name was expected.
        #[label("name")]
        span: SourceSpan,
    },

    /// A component contained an invalid percent-encoded sequence.
    #[error("invalid percent-encoding in {field} of '{input}': {error}")]
    #[diagnostic(code(packageurl::malformed_escape))]
    MalformedEscape {
        /// The component that failed to decode.
        field: &'static str,

        /// The input originally provided.
        #[source_code]
        input: String,

        /// The error encountered while decoding.
        #[source]
        error: EscapeError,

        /// The location of the component.
        #[label("field")]
        span: SourceSpan,
    },

    /// The qualifiers could not be turned into a qualifier set.
    #[error("invalid qualifiers in '{input}': {error}")]
    #[diagnostic(code(packageurl::qualifier))]
    Qualifier {
        /// The input originally provided.
        #[source_code]
        input: String,

        /// The error encountered while building the qualifier set.
        #[source]
        error: QualifierError,

        /// The location of the offending qualifier.
        #[label("qualifier")]
        span: SourceSpan,
    },

    /// The components parsed, but the resulting package URL is not valid.
    #[error("invalid package url '{input}': {error}")]
    #[diagnostic(code(packageurl::invalid))]
    Invalid {
        /// The input originally provided.
        #[source_code]
        input: String,

        /// The validation failure.
        #[source]
        error: ValidationError,
    },
}

impl ParseError {
    /// The kind of failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::InvalidScheme { .. } => ErrorKind::InvalidScheme,
            ParseError::MissingTypeOrName { .. } => ErrorKind::MissingTypeOrName,
            ParseError::MissingName { .. } => ErrorKind::MissingName,
            ParseError::MalformedEscape { .. } => ErrorKind::MalformedEscape,
            ParseError::Qualifier { error, .. } => error.kind(),
            ParseError::Invalid { error, .. } => error.kind(),
        }
    }
}

/// Errors encountered when normalizing a [`PackageUrl`](crate::PackageUrl).
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum ValidationError {
    /// The type is empty or uses characters outside of `[A-Za-z0-9.+-]`.
    #[error("invalid package type '{package_type}'")]
    InvalidType {
        /// The type that was rejected.
        package_type: String,
    },

    /// The name is empty.
    #[error("package name is required")]
    MissingName,

    /// A type-specific mandatory field rule was violated.
    #[error("invalid '{package_type}' package url: {reason}")]
    InvalidStructure {
        /// The type whose rule was violated.
        package_type: String,

        /// Which rule was violated.
        reason: &'static str,
    },

    /// The subpath contains a traversal segment.
    #[error("subpath '{subpath}' contains the disallowed segment '{segment}'")]
    InvalidSubpathSegment {
        /// The subpath that was rejected.
        subpath: String,

        /// The offending segment.
        segment: String,
    },
}

impl ValidationError {
    /// The kind of failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::InvalidType { .. } => ErrorKind::InvalidType,
            ValidationError::MissingName => ErrorKind::MissingName,
            ValidationError::InvalidStructure { .. } => ErrorKind::InvalidStructure,
            ValidationError::InvalidSubpathSegment { .. } => ErrorKind::InvalidSubpathSegment,
        }
    }
}

/// Errors encountered when building [`Qualifiers`](crate::Qualifiers).
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum QualifierError {
    /// The key does not match `^[A-Za-z.\-_][0-9A-Za-z.\-_]*$`.
    #[error("invalid qualifier key '{key}'")]
    InvalidKey {
        /// The key as provided.
        key: String,
    },

    /// The key (after lower-casing) was already seen.
    #[error("duplicate qualifier key '{key}'")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },
}

impl QualifierError {
    /// The kind of failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QualifierError::InvalidKey { .. } => ErrorKind::InvalidQualifierKey,
            QualifierError::DuplicateKey { .. } => ErrorKind::DuplicateQualifierKey,
        }
    }

    /// The key that caused the failure.
    pub fn key(&self) -> &str {
        match self {
            QualifierError::InvalidKey { key } | QualifierError::DuplicateKey { key } => key,
        }
    }
}

/// Errors encountered when percent-decoding a component.
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum EscapeError {
    /// A `%` is not followed by two hex digits.
    #[error("'%' at byte {position} of '{text}' is not followed by two hex digits")]
    Sequence {
        /// The text being decoded.
        text: String,

        /// Byte offset of the offending `%`.
        position: usize,
    },

    /// The decoded bytes are not valid UTF-8.
    #[error("'{text}' does not decode to valid UTF-8")]
    Utf8 {
        /// The text being decoded.
        text: String,
    },
}

impl EscapeError {
    /// The kind of failure.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedEscape
    }
}

/// Return the span of `fragment` inside `text`.
///
/// Fragments handed to this function are normally slices of `text`,
/// in which case the span is exact even when the same substring occurs earlier.
pub(crate) fn span(text: &str, fragment: &str) -> SourceSpan {
    let offset = (fragment.as_ptr() as usize).wrapping_sub(text.as_ptr() as usize);
    if offset <= text.len() && offset + fragment.len() <= text.len() {
        return (offset, fragment.len()).into();
    }

    text.find(fragment)
        .map(|start| (start, fragment.len()))
        .unwrap_or((0, text.len()))
        .into()
}

/// Construct and return a new [`ParseError::MalformedEscape`].
///
/// Provide the input, the name of the component, the part of the input that failed, and the error.
///
/// ```ignore
/// error::escape!(input, "name" => fragment, err);
/// ```
macro_rules! escape {
    ($input:expr, $field:expr => $fragment:expr, $error:expr) => {
        $crate::ParseError::MalformedEscape {
            input: $input.into(),
            field: $field,
            span: $crate::error::span($input, $fragment),
            error: $error,
        }
    };
}
pub(crate) use escape;

/// Construct and return a new [`ParseError::Qualifier`].
///
/// ```ignore
/// error::qualifier!(input => fragment, err);
/// ```
macro_rules! qualifier {
    ($input:expr => $fragment:expr, $error:expr) => {
        $crate::ParseError::Qualifier {
            input: $input.into(),
            span: $crate::error::span($input, $fragment),
            error: $error,
        }
    };
}
pub(crate) use qualifier;

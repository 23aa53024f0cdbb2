use std::ops::Range;

use strum::EnumIs;
use thiserror::Error;

/// Malformed program text, reported by the parser.
///
/// Every variant carries the byte range of the offending input so that
/// callers can point at it in a report.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum SyntaxError {
    /// The input is empty or only contains whitespace.
    #[error("Expected an expression but the input is empty.")]
    Empty { span: Range<usize> },

    /// A closing parenthesis appears where an expression was expected.
    #[error("Unexpected `)` at offset {}: no expression is open at this point.", .span.start)]
    UnexpectedClose { span: Range<usize> },

    /// `()` does not denote any expression.
    #[error("Empty application `()` at offset {}.", .span.start)]
    EmptyList { span: Range<usize> },

    /// End of input reached while a parenthesis is still open.
    #[error("Parenthesis opened at offset {} is never closed.", .span.start)]
    Unclosed { span: Range<usize> },

    /// Content follows the top-level expression.
    #[error("Unexpected trailing characters after the expression, starting at offset {}.", .span.start)]
    TrailingCharacters { span: Range<usize> },

    /// A `#` that neither opens an inline abstraction nor starts a positional parameter `#k`.
    #[error("Marker at offset {} must be followed by `(` or start a positional parameter `#k`.", .span.start)]
    DanglingMarker { span: Range<usize> },

    /// Parentheses are nested deeper than the parser accepts.
    #[error("Parenthesis at offset {} exceeds the maximum nesting depth of {limit}.", .span.start)]
    TooDeep { limit: usize, span: Range<usize> },
}

impl SyntaxError {
    /// Byte range of the input this error refers to.
    pub fn span(&self) -> Range<usize> {
        match self {
            SyntaxError::Empty { span }
            | SyntaxError::UnexpectedClose { span }
            | SyntaxError::EmptyList { span }
            | SyntaxError::Unclosed { span }
            | SyntaxError::TrailingCharacters { span }
            | SyntaxError::DanglingMarker { span }
            | SyntaxError::TooDeep { span, .. } => span.clone(),
        }
    }
}

/// An abstraction body that cannot be expressed in the target convention.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum InvalidAbstraction {
    /// A variable escapes every binder of the abstraction.
    #[error(
        "Variable `${index}` at binder depth {depth} escapes all {arity} parameter(s) of the abstraction."
    )]
    UnboundVariable { index: usize, depth: usize, arity: usize },

    /// A positional parameter is outside the declared arity.
    #[error("Parameter `#{index}` is out of range for an abstraction of arity {arity}.")]
    ParameterOutOfRange { index: usize, arity: usize },

    /// A declared parameter never occurs in the body.
    #[error("Parameter `#{index}` of an abstraction of arity {arity} is never referenced.")]
    UnusedParameter { index: usize, arity: usize },

    /// A token looks like a variable but its index cannot be read.
    #[error("Malformed variable reference `{0}`.")]
    MalformedVariable(String),

    /// The text is not a marker-prefixed inline abstraction.
    #[error("Expected an inline abstraction `#(...)`, found `{0}`.")]
    NotAnAbstraction(String),

    /// The body still contains an inline abstraction that no mapping entry names.
    #[error("Nested inline abstraction `{0}` has no name in the mapping.")]
    NestedMarker(String),
}

/// An internal consistency check failed, almost always because the mapping
/// handed to the translator does not match the text being translated.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum InvariantViolation {
    /// An inline-abstraction marker survived a forward translation.
    #[error("Inline-abstraction marker left in `{0}` after naming; the mapping does not cover it.")]
    ResidualMarker(String),

    /// A name survived as a standalone token after being replaced.
    #[error("Name `{name}` is still present as a standalone token in `{text}`.")]
    ResidualName { name: String, text: String },

    /// A name appears as a leading or trailing bare token outside of any parenthesis.
    #[error("Name `{name}` appears as a bare token outside parentheses in `{text}`.")]
    BareTopLevelName { name: String, text: String },

    /// The whole text equals the name but was left untouched.
    #[error("Text consisting solely of `{0}` was not replaced.")]
    UnreplacedWhole(String),

    /// Two mappings would be concatenated out of generation order.
    #[error(
        "Cannot append mapping starting at generation {next} after a mapping ending at generation {last}."
    )]
    InterleavedMappings { last: u64, next: u64 },

    /// The same name would be registered twice.
    #[error("Name `{0}` is already registered in the mapping.")]
    DuplicateName(String),

    /// A name was looked up but is not registered.
    #[error("Name `{0}` is not registered in the mapping.")]
    UnknownName(String),
}

/// Any error surfaced by this crate.
#[derive(Debug, EnumIs, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    InvalidAbstraction(#[from] InvalidAbstraction),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParse {
        source: toml::de::Error,
        file: String,
    },

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Compression engine failed: {0}")]
    Engine(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

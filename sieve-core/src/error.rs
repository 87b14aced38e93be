//! Error types for conversions with actionable messages.
//!
//! Every failure carries an [`ErrorCode`] for programmatic handling and an
//! [`ErrorContext`] naming the query type, criteria type, field and method
//! involved.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: S{category}{number}
//! - 1xxx: Metadata errors (ambiguous markers, unresolvable types)
//! - 2xxx: Invocation errors (criteria method failures, construction)
//! - 7xxx: Configuration errors
//!
//! ```rust
//! use sieve_core::{ConvertError, ErrorCode};
//!
//! let err = ConvertError::new(ErrorCode::InvalidConfiguration, "bad wildcard");
//! assert_eq!(err.code, ErrorCode::InvalidConfiguration);
//! assert_eq!(err.code.code(), "S7001");
//! ```

use std::fmt;
use thiserror::Error;

use crate::taxonomy::ComparisonKind;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Metadata errors (1xxx)
    /// More than one comparison marker on a field (S1001).
    AmbiguousMarker = 1001,
    /// The query type could not be recovered from a type witness (S1002).
    UnresolvableQueryType = 1002,

    // Invocation errors (2xxx)
    /// A criteria method failed (S2001).
    Invocation = 2001,
    /// A filter value did not fit the criteria method's argument (S2002).
    TypeMismatch = 2002,
    /// The criteria instance could not be constructed (S2003).
    Instantiation = 2003,

    // Configuration errors (7xxx)
    /// Invalid configuration (S7001).
    InvalidConfiguration = 7001,
    /// Configuration file could not be read (S7002).
    ConfigurationIo = 7002,
}

impl ErrorCode {
    /// Get the error code string (e.g., "S1001").
    pub fn code(&self) -> String {
        format!("S{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::AmbiguousMarker => "Ambiguous comparison marker",
            Self::UnresolvableQueryType => "Unresolvable query type",
            Self::Invocation => "Criteria method failed",
            Self::TypeMismatch => "Filter value type mismatch",
            Self::Instantiation => "Criteria construction failed",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::ConfigurationIo => "Configuration file unreadable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The query type involved.
    pub query_type: Option<String>,
    /// The criteria type involved.
    pub criteria_type: Option<String>,
    /// The query field involved.
    pub field: Option<String>,
    /// The criteria method key involved.
    pub method: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

/// Errors raised while building converters or converting queries.
#[derive(Error, Debug)]
pub struct ConvertError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl ConvertError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Set the query type.
    pub fn with_query_type(mut self, name: impl Into<String>) -> Self {
        self.context.query_type = Some(name.into());
        self
    }

    /// Set the criteria type.
    pub fn with_criteria_type(mut self, name: impl Into<String>) -> Self {
        self.context.criteria_type = Some(name.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.context.method = Some(method.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// A declared field carries more than one comparison marker.
    pub fn ambiguous_marker(
        query_type: impl Into<String>,
        field: impl Into<String>,
        kinds: &[ComparisonKind],
    ) -> Self {
        let field = field.into();
        let names: Vec<&str> = kinds.iter().map(|k| k.name()).collect();
        Self::new(
            ErrorCode::AmbiguousMarker,
            format!(
                "Field `{}` carries {} comparison markers: {}",
                field,
                kinds.len(),
                names.join(", ")
            ),
        )
        .with_query_type(query_type)
        .with_field(field)
        .with_suggestion("Keep a single marker per field; split the filter into two fields")
    }

    /// The type witness did not yield the converter's query type.
    pub fn unresolvable_query_type(owner: impl Into<String>, contract: impl Into<String>) -> Self {
        let owner = owner.into();
        let contract = contract.into();
        Self::new(
            ErrorCode::UnresolvableQueryType,
            format!("Cannot resolve the query type bound by `{}` to `{}`", owner, contract),
        )
        .with_context("Resolving type witness")
        .with_suggestion(format!("Register `{}` and its ancestors in the type hierarchy", owner))
        .with_suggestion("Construct the converter with an explicit query type instead")
    }

    /// A criteria method failed while applying a field.
    pub fn invocation(field: impl Into<String>, method: impl Into<String>, source: InvokeError) -> Self {
        let field = field.into();
        let method = method.into();
        let code = match source {
            InvokeError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            InvokeError::Method(_) => ErrorCode::Invocation,
        };
        Self::new(
            code,
            format!("Applying field `{}` through `{}` failed: {}", field, method, source),
        )
        .with_context("Populating criteria")
        .with_field(field)
        .with_method(method)
        .with_source(source)
    }

    /// The criteria type could not be constructed.
    pub fn instantiation(criteria_type: impl Into<String>, source: InvokeError) -> Self {
        let criteria_type = criteria_type.into();
        Self::new(
            ErrorCode::Instantiation,
            format!("Cannot construct criteria `{}`: {}", criteria_type, source),
        )
        .with_criteria_type(criteria_type)
        .with_source(source)
    }

    /// Configuration could not be parsed or validated.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message).with_context("Loading configuration")
    }

    // ============== Error Type Checks ==============

    /// Check if a criteria method or value conversion failed.
    pub fn is_invocation(&self) -> bool {
        matches!(self.code, ErrorCode::Invocation | ErrorCode::TypeMismatch)
    }

    /// Check if the error is a metadata problem detected at build time.
    pub fn is_metadata(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::AmbiguousMarker | ErrorCode::UnresolvableQueryType
        )
    }

    /// Check if the error came from configuration loading.
    pub fn is_config(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidConfiguration | ErrorCode::ConfigurationIo
        )
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref query_type) = self.context.query_type {
            output.push_str(&format!("  → Query: {}\n", query_type));
        }
        if let Some(ref criteria_type) = self.context.criteria_type {
            output.push_str(&format!("  → Criteria: {}\n", criteria_type));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }
        if let Some(ref method) = self.context.method {
            output.push_str(&format!("  → Method: {}\n", method));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

/// Failure raised by a single criteria method invocation or construction.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The filter value could not be converted into the method's argument type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Argument type the method accepts.
        expected: &'static str,
        /// Kind of value that was supplied.
        found: &'static str,
    },

    /// The criteria method itself reported an error.
    #[error("{0}")]
    Method(Box<dyn std::error::Error + Send + Sync>),
}

impl InvokeError {
    /// Wrap an error returned by a criteria method.
    pub fn method<E: Into<Box<dyn std::error::Error + Send + Sync>>>(err: E) -> Self {
        Self::Method(err.into())
    }

    /// Build a type mismatch error.
    pub fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }
}

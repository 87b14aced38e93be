//! # sieve-core
//!
//! Runtime for translating query objects into criteria builder calls.
//!
//! A *query* is a struct of optional filter inputs. A *criteria* is a
//! builder exposing one `and_*` method per (field, comparison) pair, the way
//! generated example/criteria classes of SQL mappers do. This crate connects
//! the two without per-entity mapping code:
//!
//! - [`taxonomy`]: comparison kinds, field markers and method naming
//! - [`value`]: filter values and conversions in and out of them
//! - [`meta`]: the [`QueryType`] and [`CriteriaType`] traits
//! - [`witness`]: recovery of a converter's bound query type
//! - [`index`]: the per-pair field/method index
//! - [`convert`]: the [`Converter`] itself
//!
//! ## Method naming
//!
//! ```rust
//! use sieve_core::taxonomy::{ComparisonKind, Marker, target_method};
//!
//! // Unmarked fields compare for equality.
//! assert_eq!(target_method("status", None), "andStatusEqualTo");
//!
//! // A kind suffix already present on the field name is not repeated.
//! let like = Marker::new(ComparisonKind::Like);
//! assert_eq!(target_method("cust_name_like", Some(&like)), "andCustNameLike");
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use sieve_core::{ConvertError, ErrorCode};
//!
//! let err = ConvertError::unresolvable_query_type("UserConverter", "QueryConverterContract");
//! assert_eq!(err.code, ErrorCode::UnresolvableQueryType);
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod index;
pub mod logging;
pub mod meta;
pub mod taxonomy;
pub mod value;
pub mod witness;

pub use config::{ConvertConfig, FailurePolicy};
pub use convert::{
    AppliedCall, ConversionReport, Converter, FieldFailure, QueryConverterContract, SkipReason,
    SkippedField,
};
pub use error::{ConvertError, ConvertResult, ErrorCode, ErrorContext, InvokeError};
pub use index::{FieldMethodIndex, FieldPlan};
pub use meta::{
    CriteriaType, FieldDescriptor, Invoker, MethodDescriptor, Property, QueryDescriptor, QueryType,
};
pub use taxonomy::{ComparisonKind, Marker};
pub use value::{FilterValue, FromFilterValue, IntoProperty};
pub use witness::{Parameterized, TypeArg, TypeDescriptor, TypeHierarchy, TypeNode};

/// Common imports.
pub mod prelude {
    pub use crate::config::{ConvertConfig, FailurePolicy};
    pub use crate::convert::{ConversionReport, Converter, SkipReason};
    pub use crate::error::{ConvertError, ConvertResult, InvokeError};
    pub use crate::meta::{CriteriaType, QueryType};
    pub use crate::taxonomy::{ComparisonKind, Marker};
    pub use crate::value::{FilterValue, FromFilterValue, IntoProperty};
}

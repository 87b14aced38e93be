//! # Sieve
//!
//! Translate query objects into criteria builder calls by naming convention.
//!
//! A *query* is a struct of optional filter inputs, typically deserialized
//! from a request. A *criteria* is a builder with one `and_*` method per
//! (field, comparison) pair, like the example/criteria types generated for
//! SQL mappers. Sieve fills a criteria from a query without per-entity
//! mapping code:
//!
//! - Unmarked fields compare for equality: `status` calls `andStatusEqualTo`
//! - A comparison marker picks the method suffix: `#[sieve(like)]` on
//!   `cust_name_like` calls `andCustNameLike` with `"%value%"`
//! - A marker can target another name: `#[sieve(gte = "age")]` on `min_age`
//!   calls `andAgeGreaterThanOrEqualTo`
//! - Absent values and `#[sieve(except)]` fields are skipped
//!
//! ## Quick Start
//!
//! ```rust
//! use sieve::prelude::*;
//!
//! #[derive(Query, Default)]
//! struct CustomerQuery {
//!     status: Option<String>,
//!     #[sieve(like)]
//!     cust_name_like: Option<String>,
//!     #[sieve(gte = "age")]
//!     min_age: Option<i32>,
//!     #[sieve(except)]
//!     page: Option<i64>,
//! }
//!
//! #[derive(Default)]
//! struct CustomerCriteria {
//!     clauses: Vec<String>,
//! }
//!
//! #[criteria]
//! impl CustomerCriteria {
//!     pub fn and_status_equal_to(&mut self, status: String) -> &mut Self {
//!         self.clauses.push(format!("status = '{}'", status));
//!         self
//!     }
//!
//!     pub fn and_cust_name_like(&mut self, pattern: String) -> &mut Self {
//!         self.clauses.push(format!("cust_name like '{}'", pattern));
//!         self
//!     }
//!
//!     pub fn and_age_greater_than_or_equal_to(&mut self, age: i32) -> &mut Self {
//!         self.clauses.push(format!("age >= {}", age));
//!         self
//!     }
//! }
//!
//! # fn main() -> Result<(), sieve::ConvertError> {
//! let converter = Converter::<CustomerQuery, CustomerCriteria>::new()?;
//!
//! let query = CustomerQuery {
//!     cust_name_like: Some("Bob".into()),
//!     min_age: Some(30),
//!     page: Some(2),
//!     ..Default::default()
//! };
//!
//! let criteria = converter.convert(&query)?;
//! assert_eq!(criteria.clauses, vec!["cust_name like '%Bob%'", "age >= 30"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Handling
//!
//! By default a failing criteria method aborts the conversion and the error
//! names the field and method. [`FailurePolicy::BestEffort`] keeps going and
//! collects failures in the [`ConversionReport`] instead:
//!
//! ```rust,ignore
//! let config = ConvertConfig::new().failure_policy(FailurePolicy::BestEffort);
//! let converter = Converter::<CustomerQuery, CustomerCriteria>::with_config(config)?;
//! let (criteria, report) = converter.convert_with_report(&query)?;
//! for failure in report.failures() {
//!     tracing::warn!(field = %failure.field, "filter not applied");
//! }
//! ```
//!
//! ## Logging
//!
//! Sieve logs through `tracing`. Set `SIEVE_DEBUG=true` or
//! `SIEVE_LOG_LEVEL=debug` and call [`logging::init`] (with the
//! `subscriber` feature) to see per-field decisions.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use sieve_core::*;

// Re-export proc macros
pub use sieve_codegen::{Query, criteria};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sieve_core::prelude::*;
    pub use sieve_core::{QueryConverterContract, TypeDescriptor, TypeHierarchy};

    pub use crate::{Query, criteria};
}

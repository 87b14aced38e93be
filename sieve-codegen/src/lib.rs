//! Procedural macros for Sieve.
//!
//! This crate generates the [`QueryType`] and [`CriteriaType`] impls that the
//! Sieve runtime works from, so neither side needs hand-written metadata.
//!
//! # Macros
//!
//! - [`Query`] - Derive macro declaring a query type's fields and markers
//! - [`criteria`] - Attribute macro registering a criteria type's `and_*` methods
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(sieve::Query)]
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
//! struct CustomerCriteria { /* ... */ }
//!
//! #[sieve::criteria]
//! impl CustomerCriteria {
//!     pub fn and_status_equal_to(&mut self, status: String) -> &mut Self { /* ... */ }
//!     pub fn and_cust_name_like(&mut self, pattern: String) -> &mut Self { /* ... */ }
//!     pub fn and_age_greater_than_or_equal_to(&mut self, age: i32) -> &mut Self { /* ... */ }
//! }
//! ```
//!
//! [`QueryType`]: https://docs.rs/sieve-core/latest/sieve_core/meta/trait.QueryType.html
//! [`CriteriaType`]: https://docs.rs/sieve-core/latest/sieve_core/meta/trait.CriteriaType.html

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemImpl, parse_macro_input};

mod generators;

/// Derive macro for query types.
///
/// Every named field is a declared query field unless marked otherwise.
/// Field values are read through `IntoProperty`, so `Option<T>` fields that
/// are `None` are skipped during conversion.
///
/// # Attributes
///
/// ## Struct-level
/// - `#[sieve(crate = "path")]` - Path to the runtime, `::sieve` by default
///
/// ## Field-level
/// - `#[sieve(<kind>)]` - Compare with `<kind>` instead of equality
/// - `#[sieve(<kind> = "name")]` - Same, targeting `name` instead of the field name
/// - `#[sieve(name = "name")]` - Target `name` with the field's kind
/// - `#[sieve(except)]` - Never convert this field
/// - `#[sieve(base)]` - Embedded base query; its properties are read but
///   its fields are not declared on this type
/// - `#[sieve(skip)]` - Not part of the query at all
///
/// Kinds are `equal_to` (`eq`), `like`, `in`, `not_in`, `greater_than` (`gt`),
/// `less_than` (`lt`), `greater_than_or_equal_to` (`gte`),
/// `less_than_or_equal_to` (`lte`), `is_null` and `is_not_null`. A field may
/// carry at most one kind.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(sieve::Query)]
/// struct OrderQuery {
///     #[sieve(base)]
///     base: TenantQuery,
///     #[sieve(in)]
///     status: Vec<String>,
///     #[sieve(lte = "total")]
///     max_total: Option<i64>,
/// }
/// ```
#[proc_macro_derive(Query, attributes(sieve))]
pub fn derive_query(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generators::derive_query_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Attribute macro for criteria types.
///
/// Place it on the inherent impl block holding the criteria's `and_*`
/// methods. Methods taking `&mut self` and one argument are registered under
/// their camelCase name (`and_cust_name_like` becomes `andCustNameLike`).
/// Arguments are decoded with `FromFilterValue`; shared references such as
/// `&str` are decoded into their owned form first. Methods returning a
/// `Result` have their error reported as an invocation failure.
///
/// # Options
///
/// - `#[criteria(crate = "path")]` - Path to the runtime
/// - `#[criteria(constructor = "new")]` - Build instances with `Self::new()`
///   instead of `Default`
/// - `#[criteria(try_constructor = "connect")]` - Build instances with a
///   fallible `Self::connect()`
///
/// On methods:
///
/// - `#[criteria(skip)]` - Do not register the method
/// - `#[criteria(rename = "andCustNameLike")]` - Register under an exact key
#[proc_macro_attribute]
pub fn criteria(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemImpl);

    match generators::criteria_impl(args.into(), item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

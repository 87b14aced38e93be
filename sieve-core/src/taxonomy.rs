//! Comparison kinds and the markers that attach them to query fields.
//!
//! A query field either carries exactly one [`Marker`] or none at all, in
//! which case it compares with [`ComparisonKind::EqualTo`]. The marker's kind
//! decides which criteria method the field targets:
//!
//! ```rust
//! use sieve_core::taxonomy::{ComparisonKind, Marker, target_method};
//!
//! let like = Marker::new(ComparisonKind::Like);
//! assert_eq!(target_method("cust_name_like", Some(&like)), "andCustNameLike");
//!
//! let min_age = Marker::named(ComparisonKind::GreaterThanOrEqualTo, "age");
//! assert_eq!(target_method("min_age", Some(&min_age)), "andAgeGreaterThanOrEqualTo");
//!
//! assert_eq!(target_method("status", None), "andStatusEqualTo");
//! ```

use std::fmt;
use std::str::FromStr;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// How a query field's value is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonKind {
    /// Equality; the default for unmarked fields.
    EqualTo,
    /// Partial match; the value is wrapped in wildcards.
    Like,
    /// Membership in a list.
    In,
    /// Non-membership in a list.
    NotIn,
    /// Strictly greater than.
    GreaterThan,
    /// Strictly less than.
    LessThan,
    /// Greater than or equal.
    GreaterThanOrEqualTo,
    /// Less than or equal.
    LessThanOrEqualTo,
    /// Null check.
    IsNull,
    /// Not-null check.
    IsNotNull,
    /// Never converted.
    Except,
}

impl ComparisonKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::EqualTo,
        Self::Like,
        Self::In,
        Self::NotIn,
        Self::GreaterThan,
        Self::LessThan,
        Self::GreaterThanOrEqualTo,
        Self::LessThanOrEqualTo,
        Self::IsNull,
        Self::IsNotNull,
        Self::Except,
    ];

    /// The PascalCase name used as the criteria method suffix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::EqualTo => "EqualTo",
            Self::Like => "Like",
            Self::In => "In",
            Self::NotIn => "NotIn",
            Self::GreaterThan => "GreaterThan",
            Self::LessThan => "LessThan",
            Self::GreaterThanOrEqualTo => "GreaterThanOrEqualTo",
            Self::LessThanOrEqualTo => "LessThanOrEqualTo",
            Self::IsNull => "IsNull",
            Self::IsNotNull => "IsNotNull",
            Self::Except => "Except",
        }
    }

    /// The snake_case keyword accepted in `#[sieve(...)]` attributes.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::EqualTo => "equal_to",
            Self::Like => "like",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::GreaterThanOrEqualTo => "greater_than_or_equal_to",
            Self::LessThanOrEqualTo => "less_than_or_equal_to",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::Except => "except",
        }
    }

    /// Short alias accepted alongside the keyword.
    pub const fn alias(self) -> &'static str {
        match self {
            Self::EqualTo => "eq",
            Self::Like => "like",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::GreaterThan => "gt",
            Self::LessThan => "lt",
            Self::GreaterThanOrEqualTo => "gte",
            Self::LessThanOrEqualTo => "lte",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::Except => "except",
        }
    }

    /// Whether fields of this kind are left out of the conversion.
    #[inline]
    pub const fn is_excluded(self) -> bool {
        matches!(self, Self::Except)
    }
}

impl fmt::Display for ComparisonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no comparison kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown comparison kind `{0}`")]
pub struct UnknownKind(pub String);

impl FromStr for ComparisonKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s || kind.keyword() == s || kind.alias() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Comparison metadata attached to one query field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    kind: ComparisonKind,
    override_name: Option<SmolStr>,
}

impl Marker {
    /// Marker that targets the field's own name.
    pub const fn new(kind: ComparisonKind) -> Self {
        Self {
            kind,
            override_name: None,
        }
    }

    /// Marker that targets `name` instead of the field's name.
    pub fn named(kind: ComparisonKind, name: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            override_name: Some(name.into()),
        }
    }

    /// The comparison kind.
    #[inline]
    pub const fn kind(&self) -> ComparisonKind {
        self.kind
    }

    /// The override name, if one is set and not blank.
    pub fn override_name(&self) -> Option<&str> {
        self.override_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// More than one marker was attached to the same field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} comparison markers attached to one field", .kinds.len())]
pub struct MarkerConflict {
    /// Kinds of the conflicting markers, in declaration order.
    pub kinds: Vec<ComparisonKind>,
}

/// Pick the single active marker from a field's declared markers.
///
/// Returns `Ok(None)` when the field is unmarked.
pub fn resolve_marker(markers: &[Marker]) -> Result<Option<&Marker>, MarkerConflict> {
    match markers {
        [] => Ok(None),
        [marker] => Ok(Some(marker)),
        _ => Err(MarkerConflict {
            kinds: markers.iter().map(Marker::kind).collect(),
        }),
    }
}

/// The kind a field compares with; unmarked fields compare for equality.
#[inline]
pub fn effective_kind(marker: Option<&Marker>) -> ComparisonKind {
    marker.map_or(ComparisonKind::EqualTo, Marker::kind)
}

/// Normalise a field or override name to camelCase.
pub fn camel_name(name: &str) -> String {
    name.to_case(Case::Camel)
}

/// Uppercase the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip the kind's name from the end of a camelCase field name.
///
/// `custNameLike` with `Like` becomes `custName`. A name equal to the suffix
/// is left alone.
pub fn strip_kind_suffix(name: &str, kind: ComparisonKind) -> &str {
    let suffix = kind.name();
    if name.len() > suffix.len() && name.ends_with(suffix) {
        &name[..name.len() - suffix.len()]
    } else {
        name
    }
}

/// The base name a field targets: the override, or its stripped own name.
pub fn base_name(field: &str, marker: Option<&Marker>) -> String {
    let kind = effective_kind(marker);
    match marker.and_then(Marker::override_name) {
        Some(name) => camel_name(name),
        None => strip_kind_suffix(&camel_name(field), kind).to_string(),
    }
}

/// Build `and{Base}{Kind}`, skipping the kind suffix when already present.
pub fn method_name(base: &str, kind: ComparisonKind) -> String {
    let mut name = format!("and{}", capitalize(base));
    if !name.ends_with(kind.name()) {
        name.push_str(kind.name());
    }
    name
}

/// The criteria method key a field with the given marker targets.
pub fn target_method(field: &str, marker: Option<&Marker>) -> String {
    method_name(&base_name(field, marker), effective_kind(marker))
}

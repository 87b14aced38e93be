//! Filter values passed from query properties to criteria methods.
//!
//! Query fields produce [`FilterValue`]s through [`IntoProperty`]; criteria
//! methods take their argument back out through [`FromFilterValue`].
//!
//! ```rust
//! use sieve_core::value::{FilterValue, FromFilterValue, IntoProperty};
//!
//! let field: Option<String> = Some("Bob".into());
//! let value = field.to_property().unwrap();
//! assert_eq!(value.wrap_wildcard("%"), FilterValue::String("%Bob%".into()));
//!
//! let arg = String::from_filter_value(value).unwrap();
//! assert_eq!(arg, "Bob");
//!
//! let absent: Option<i64> = None;
//! assert!(absent.to_property().is_none());
//! ```

use std::fmt;

use serde::Serialize;

use crate::error::InvokeError;

/// A filter value that can be handed to a criteria method.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// JSON value.
    Json(serde_json::Value),
    /// List of values.
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the variant, used in type mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::Json(_) => "Json",
            Self::List(_) => "List",
        }
    }

    /// Wrap the string form of the value in `wildcard` on both sides.
    pub fn wrap_wildcard(&self, wildcard: &str) -> Self {
        Self::String(format!("{wildcard}{self}{wildcard}"))
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Json(v) => write!(f, "{v}"),
            Self::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i16> for FilterValue {
    fn from(v: i16) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for FilterValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

/// Values above `i64::MAX` are kept exact as a JSON number.
impl From<u64> for FilterValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Self::Int(v),
            Err(_) => Self::Json(v.into()),
        }
    }
}

impl From<f32> for FilterValue {
    fn from(v: f32) -> Self {
        Self::Float(v as f64)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<serde_json::Value> for FilterValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// Read a query field as a filter input.
///
/// `None` means the filter is absent and the field is skipped.
pub trait IntoProperty {
    /// The field's current value, if present.
    fn to_property(&self) -> Option<FilterValue>;
}

impl<T: IntoProperty> IntoProperty for Option<T> {
    fn to_property(&self) -> Option<FilterValue> {
        self.as_ref().and_then(IntoProperty::to_property)
    }
}

impl<T: IntoProperty> IntoProperty for Vec<T> {
    fn to_property(&self) -> Option<FilterValue> {
        Some(FilterValue::List(
            self.iter()
                .map(|item| item.to_property().unwrap_or(FilterValue::Null))
                .collect(),
        ))
    }
}

impl IntoProperty for FilterValue {
    fn to_property(&self) -> Option<FilterValue> {
        (!self.is_null()).then(|| self.clone())
    }
}

impl IntoProperty for serde_json::Value {
    fn to_property(&self) -> Option<FilterValue> {
        (!self.is_null()).then(|| FilterValue::Json(self.clone()))
    }
}

macro_rules! impl_into_property {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoProperty for $ty {
                fn to_property(&self) -> Option<FilterValue> {
                    Some(FilterValue::from(self.clone()))
                }
            }
        )*
    };
}

impl_into_property!(bool, i16, i32, i64, u32, u64, f32, f64, String);

impl IntoProperty for &str {
    fn to_property(&self) -> Option<FilterValue> {
        Some(FilterValue::from(*self))
    }
}

/// Convert a filter value into a criteria method argument.
pub trait FromFilterValue: Sized {
    /// Name of the accepted type, used in mismatch errors.
    const EXPECTED: &'static str;

    /// Perform the conversion.
    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError>;
}

impl FromFilterValue for FilterValue {
    const EXPECTED: &'static str = "FilterValue";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        Ok(value)
    }
}

impl FromFilterValue for String {
    const EXPECTED: &'static str = "String";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::String(v) => Ok(v),
            other => Err(InvokeError::mismatch(Self::EXPECTED, other.type_name())),
        }
    }
}

impl FromFilterValue for bool {
    const EXPECTED: &'static str = "Bool";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::Bool(v) => Ok(v),
            other => Err(InvokeError::mismatch(Self::EXPECTED, other.type_name())),
        }
    }
}

impl FromFilterValue for i64 {
    const EXPECTED: &'static str = "Int";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::Int(v) => Ok(v),
            other => Err(InvokeError::mismatch(Self::EXPECTED, other.type_name())),
        }
    }
}

impl FromFilterValue for i32 {
    const EXPECTED: &'static str = "Int (32-bit)";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::Int(v) => {
                i32::try_from(v).map_err(|_| InvokeError::mismatch(Self::EXPECTED, "Int (out of range)"))
            }
            other => Err(InvokeError::mismatch(Self::EXPECTED, other.type_name())),
        }
    }
}

impl FromFilterValue for u32 {
    const EXPECTED: &'static str = "Int (unsigned 32-bit)";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::Int(v) => {
                u32::try_from(v).map_err(|_| InvokeError::mismatch(Self::EXPECTED, "Int (out of range)"))
            }
            other => Err(InvokeError::mismatch(Self::EXPECTED, other.type_name())),
        }
    }
}

impl FromFilterValue for i16 {
    const EXPECTED: &'static str = "Int (16-bit)";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::Int(v) => {
                i16::try_from(v).map_err(|_| InvokeError::mismatch(Self::EXPECTED, "Int (out of range)"))
            }
            other => Err(InvokeError::mismatch(Self::EXPECTED, other.type_name())),
        }
    }
}

impl FromFilterValue for u64 {
    const EXPECTED: &'static str = "Int (unsigned 64-bit)";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::Int(v) => {
                u64::try_from(v).map_err(|_| InvokeError::mismatch(Self::EXPECTED, "Int (out of range)"))
            }
            FilterValue::Json(v) => v
                .as_u64()
                .ok_or_else(|| InvokeError::mismatch(Self::EXPECTED, "Json")),
            other => Err(InvokeError::mismatch(Self::EXPECTED, other.type_name())),
        }
    }
}

impl FromFilterValue for f32 {
    const EXPECTED: &'static str = "Float (32-bit)";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::Float(v) => Ok(v as f32),
            FilterValue::Int(v) => Ok(v as f32),
            other => Err(InvokeError::mismatch(Self::EXPECTED, other.type_name())),
        }
    }
}

impl FromFilterValue for f64 {
    const EXPECTED: &'static str = "Float";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::Float(v) => Ok(v),
            FilterValue::Int(v) => Ok(v as f64),
            other => Err(InvokeError::mismatch(Self::EXPECTED, other.type_name())),
        }
    }
}

impl FromFilterValue for serde_json::Value {
    const EXPECTED: &'static str = "Json";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::Json(v) => Ok(v),
            other => serde_json::to_value(&other).map_err(InvokeError::method),
        }
    }
}

impl<T: FromFilterValue> FromFilterValue for Vec<T> {
    const EXPECTED: &'static str = "List";

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::List(values) => values.into_iter().map(T::from_filter_value).collect(),
            other => Err(InvokeError::mismatch(Self::EXPECTED, other.type_name())),
        }
    }
}

impl<T: FromFilterValue> FromFilterValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_filter_value(value: FilterValue) -> Result<Self, InvokeError> {
        match value {
            FilterValue::Null => Ok(None),
            other => T::from_filter_value(other).map(Some),
        }
    }
}

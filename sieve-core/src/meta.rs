//! Metadata traits describing query and criteria types.
//!
//! [`QueryType`] stands in for field introspection: it lists the fields a
//! type declares (with their markers) and enumerates the readable properties
//! of an instance. [`CriteriaType`] publishes a registration table of the
//! criteria's `and_*` methods. Both are normally generated by
//! `#[derive(Query)]` and `#[criteria]`, but can be written by hand:
//!
//! ```rust
//! use sieve_core::meta::{CriteriaType, FieldDescriptor, MethodDescriptor, Property, QueryDescriptor, QueryType};
//! use sieve_core::taxonomy::{ComparisonKind, Marker};
//! use sieve_core::value::{FromFilterValue, IntoProperty};
//! use sieve_core::InvokeError;
//!
//! struct UserQuery {
//!     name_like: Option<String>,
//! }
//!
//! impl QueryType for UserQuery {
//!     fn descriptor() -> QueryDescriptor {
//!         QueryDescriptor::new::<Self>()
//!             .field(FieldDescriptor::new("name_like").marker(Marker::new(ComparisonKind::Like)))
//!     }
//!
//!     fn properties(&self) -> Vec<Property> {
//!         vec![Property::new("name_like", self.name_like.to_property())]
//!     }
//! }
//!
//! #[derive(Default)]
//! struct UserCriteria {
//!     conditions: Vec<String>,
//! }
//!
//! impl CriteriaType for UserCriteria {
//!     fn methods() -> Vec<MethodDescriptor<Self>> {
//!         vec![MethodDescriptor::<Self>::from_ident("and_name_like", |criteria: &mut Self, value| {
//!             let pattern = String::from_filter_value(value)?;
//!             criteria.conditions.push(format!("name like {pattern}"));
//!             Ok(())
//!         })]
//!     }
//!
//!     fn instantiate() -> Result<Self, InvokeError> {
//!         Ok(Self::default())
//!     }
//! }
//!
//! assert_eq!(UserCriteria::methods()[0].key(), "andNameLike");
//! ```

use std::fmt;

use smol_str::SmolStr;

use crate::error::InvokeError;
use crate::taxonomy::{camel_name, Marker};
use crate::value::FilterValue;
use crate::witness::TypeDescriptor;

/// A field declared directly on a query type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: SmolStr,
    markers: Vec<Marker>,
}

impl FieldDescriptor {
    /// Unmarked field.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
        }
    }

    /// Attach a marker.
    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// The field name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All attached markers, in declaration order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

/// Declared fields of a query type.
#[derive(Debug, Clone)]
pub struct QueryDescriptor {
    ty: TypeDescriptor,
    fields: Vec<FieldDescriptor>,
}

impl QueryDescriptor {
    /// Descriptor for `Q` with no fields.
    pub fn new<Q: ?Sized + 'static>() -> Self {
        Self {
            ty: TypeDescriptor::of::<Q>(),
            fields: Vec::new(),
        }
    }

    /// Add a declared field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// The described type.
    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// One readable property of a query instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name.
    pub name: SmolStr,
    /// Current value; `None` means absent.
    pub value: Option<FilterValue>,
}

impl Property {
    /// Create a property.
    pub fn new(name: impl Into<SmolStr>, value: Option<FilterValue>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A query type: a struct of optional filter inputs.
pub trait QueryType: 'static {
    /// Fields declared directly on this type.
    fn descriptor() -> QueryDescriptor;

    /// Every readable property of `self`, in a stable order.
    ///
    /// This includes properties of composed base queries, which are not
    /// declared fields and therefore never reach the criteria. Names are
    /// unique: a base property redeclared on this type is listed once, with
    /// this type's value.
    fn properties(&self) -> Vec<Property>;
}

/// Function that applies one filter value to a criteria instance.
pub type Invoker<C> = fn(&mut C, FilterValue) -> Result<(), InvokeError>;

/// A registered criteria method.
pub struct MethodDescriptor<C> {
    key: SmolStr,
    invoker: Invoker<C>,
}

impl<C> MethodDescriptor<C> {
    /// Register `invoker` under an exact method key such as `andNameLike`.
    pub fn new(key: impl Into<SmolStr>, invoker: Invoker<C>) -> Self {
        Self {
            key: key.into(),
            invoker,
        }
    }

    /// Register `invoker` under the key derived from a Rust method name.
    ///
    /// `and_cust_name_like` is registered as `andCustNameLike`.
    pub fn from_ident(ident: &str, invoker: Invoker<C>) -> Self {
        Self::new(camel_name(ident), invoker)
    }

    /// The method key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Apply `value` to `criteria`.
    #[inline]
    pub fn invoke(&self, criteria: &mut C, value: FilterValue) -> Result<(), InvokeError> {
        (self.invoker)(criteria, value)
    }
}

impl<C> Clone for MethodDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            invoker: self.invoker,
        }
    }
}

impl<C> fmt::Debug for MethodDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor").field("key", &self.key).finish()
    }
}

/// A criteria builder with per-field comparison methods.
pub trait CriteriaType: Sized + 'static {
    /// The registration table of `and_*` methods.
    fn methods() -> Vec<MethodDescriptor<Self>>;

    /// Construct an empty criteria.
    fn instantiate() -> Result<Self, InvokeError>;

    /// Runtime descriptor of this type.
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }
}

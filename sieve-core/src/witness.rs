//! Runtime recovery of a generic contract's bound type argument.
//!
//! Rust keeps generic parameters explicit, so converters normally name their
//! query type directly. This module covers the other construction path: a
//! converter type declares, through a registered [`TypeHierarchy`], which
//! query type it binds to a contract, possibly through intermediate generic
//! ancestors whose own binding is still a free type variable.
//!
//! ```rust
//! use sieve_core::witness::{Parameterized, TypeArg, TypeDescriptor, TypeHierarchy, TypeNode};
//!
//! struct Contract;
//! struct Base;
//! struct Leaf;
//! struct UserQuery;
//!
//! let contract = TypeDescriptor::of::<Contract>();
//! let mut hierarchy = TypeHierarchy::new();
//! // Base<T> implements Contract<T>
//! hierarchy.register(
//!     TypeNode::new(TypeDescriptor::of::<Base>())
//!         .implements(Parameterized::new(contract).arg(TypeArg::variable("T"))),
//! );
//! // Leaf extends Base<UserQuery>
//! hierarchy.register(
//!     TypeNode::new(TypeDescriptor::of::<Leaf>())
//!         .extends(Parameterized::new(TypeDescriptor::of::<Base>()).arg(TypeArg::of::<UserQuery>())),
//! );
//!
//! let resolved = hierarchy.resolve(&TypeDescriptor::of::<Leaf>(), &contract);
//! assert_eq!(resolved, Some(TypeDescriptor::of::<UserQuery>()));
//! ```

use std::any::TypeId;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use tracing::{debug, trace};

/// Runtime descriptor of a concrete type.
#[derive(Debug, Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    /// Descriptor for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The type's identity.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, without generic arguments.
    pub fn short_name(&self) -> &'static str {
        let name = self.name.split('<').next().unwrap_or(self.name);
        name.rsplit("::").next().unwrap_or(name)
    }

    /// Check whether this describes `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A type argument in a parameterized supertype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArg {
    /// A concrete type.
    Concrete(TypeDescriptor),
    /// A parameterized type such as `Vec<UserQuery>`.
    Parameterized(Box<Parameterized>),
    /// A free type variable; the binding was erased at this level.
    Variable(&'static str),
}

impl TypeArg {
    /// Concrete argument `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Concrete(TypeDescriptor::of::<T>())
    }

    /// Free type variable.
    pub fn variable(name: &'static str) -> Self {
        Self::Variable(name)
    }

    /// Whether the argument is bound to a type.
    pub fn is_bound(&self) -> bool {
        !matches!(self, Self::Variable(_))
    }
}

/// A supertype with its type arguments, such as `Contract<UserQuery>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameterized {
    raw: TypeDescriptor,
    args: Vec<TypeArg>,
}

impl Parameterized {
    /// Supertype `raw` with no arguments yet.
    pub fn new(raw: TypeDescriptor) -> Self {
        Self {
            raw,
            args: Vec::new(),
        }
    }

    /// Append a type argument.
    pub fn arg(mut self, arg: TypeArg) -> Self {
        self.args.push(arg);
        self
    }

    /// The raw (unparameterized) type.
    pub fn raw(&self) -> &TypeDescriptor {
        &self.raw
    }

    /// The type arguments in declaration order.
    pub fn args(&self) -> &[TypeArg] {
        &self.args
    }

    fn first_arg(&self) -> Option<&TypeArg> {
        self.args.first()
    }
}

/// Declared supertypes of one type.
#[derive(Debug, Clone)]
pub struct TypeNode {
    descriptor: TypeDescriptor,
    interfaces: Vec<Parameterized>,
    superclass: Option<Parameterized>,
}

impl TypeNode {
    /// Node for `descriptor` with no supertypes.
    pub fn new(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            interfaces: Vec::new(),
            superclass: None,
        }
    }

    /// Declare an implemented contract.
    pub fn implements(mut self, contract: Parameterized) -> Self {
        self.interfaces.push(contract);
        self
    }

    /// Declare the parent type.
    pub fn extends(mut self, parent: Parameterized) -> Self {
        self.superclass = Some(parent);
        self
    }

    /// The described type.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }
}

/// Registry of type nodes walked by [`TypeHierarchy::resolve`].
///
/// Types that were never registered behave as the hierarchy root: they
/// implement nothing and have no parent.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    nodes: IndexMap<TypeId, TypeNode>,
}

impl TypeHierarchy {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, replacing any earlier node for the same type.
    pub fn register(&mut self, node: TypeNode) -> &mut Self {
        self.nodes.insert(node.descriptor.id(), node);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, node: TypeNode) -> Self {
        self.register(node);
        self
    }

    /// Look up a registered node.
    pub fn node(&self, ty: &TypeDescriptor) -> Option<&TypeNode> {
        self.nodes.get(&ty.id())
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Recover the first type argument `concrete` binds to `contract`.
    ///
    /// Only the first argument of a multi-parameter supertype is ever
    /// considered.
    pub fn resolve_arg(&self, concrete: &TypeDescriptor, contract: &TypeDescriptor) -> Option<TypeArg> {
        self.binding(concrete, contract, &mut HashSet::new())
            .filter(TypeArg::is_bound)
    }

    /// Like [`resolve_arg`](Self::resolve_arg), but only for concrete bindings.
    pub fn resolve(&self, concrete: &TypeDescriptor, contract: &TypeDescriptor) -> Option<TypeDescriptor> {
        match self.resolve_arg(concrete, contract)? {
            TypeArg::Concrete(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    /// Resolve to a class witness: parameterized bindings yield their raw type.
    pub fn resolve_class(
        &self,
        concrete: &TypeDescriptor,
        contract: &TypeDescriptor,
    ) -> Option<TypeDescriptor> {
        match self.resolve_arg(concrete, contract)? {
            TypeArg::Concrete(descriptor) => Some(descriptor),
            TypeArg::Parameterized(parameterized) => Some(parameterized.raw),
            TypeArg::Variable(_) => None,
        }
    }

    fn binding(
        &self,
        ty: &TypeDescriptor,
        contract: &TypeDescriptor,
        visited: &mut HashSet<TypeId>,
    ) -> Option<TypeArg> {
        if !visited.insert(ty.id()) {
            debug!(ty = ty.name(), "Supertype cycle, stopping the walk");
            return None;
        }
        let node = self.nodes.get(&ty.id())?;

        if let Some(direct) = node.interfaces.iter().find(|i| i.raw == *contract) {
            trace!(ty = ty.name(), contract = contract.name(), "Contract implemented directly");
            return direct.first_arg().cloned();
        }

        let parent = node.superclass.as_ref()?;
        match self.binding(&parent.raw, contract, visited) {
            Some(arg) if arg.is_bound() => Some(arg),
            _ => {
                // Erased further up: read the binding from our own declaration of the parent.
                trace!(ty = ty.name(), parent = parent.raw.name(), "Falling back to parent arguments");
                parent.first_arg().cloned()
            }
        }
    }
}

//! Field/method index built once per (query, criteria) pair.
//!
//! The index holds the declared fields of the query type, the registered
//! methods of the criteria type, and a precomputed [`FieldPlan`] per
//! declared field so that conversions only do map lookups.

use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::error::{ConvertError, ConvertResult};
use crate::meta::{CriteriaType, FieldDescriptor, MethodDescriptor, QueryType};
use crate::taxonomy::{self, ComparisonKind};
use crate::witness::TypeDescriptor;

/// How one declared query field is applied to the criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    field: SmolStr,
    kind: ComparisonKind,
    base_name: String,
    method_key: String,
    method_slot: Option<usize>,
}

impl FieldPlan {
    /// The query field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The comparison kind in effect.
    pub fn kind(&self) -> ComparisonKind {
        self.kind
    }

    /// Override name or stripped field name, in camelCase.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// The criteria method key the field targets.
    pub fn method_key(&self) -> &str {
        &self.method_key
    }

    /// Whether the field is excluded from conversion.
    pub fn is_excluded(&self) -> bool {
        self.kind.is_excluded()
    }

    /// Whether the target method is registered on the criteria type.
    pub fn is_mapped(&self) -> bool {
        self.method_slot.is_some()
    }
}

/// Name-keyed lookups of query fields and criteria methods.
pub struct FieldMethodIndex<C> {
    query_type: TypeDescriptor,
    criteria_type: TypeDescriptor,
    fields: IndexMap<SmolStr, FieldDescriptor>,
    methods: IndexMap<SmolStr, MethodDescriptor<C>>,
    plans: IndexMap<SmolStr, FieldPlan>,
}

impl<C: CriteriaType> FieldMethodIndex<C> {
    /// Build the index for query type `Q`.
    ///
    /// Members with blank or duplicate names are skipped. A field with more
    /// than one marker fails the build.
    pub fn build<Q: QueryType>() -> ConvertResult<Self> {
        let descriptor = Q::descriptor();
        let query_type = *descriptor.type_descriptor();
        let criteria_type = C::type_descriptor();

        let mut fields = IndexMap::new();
        for field in descriptor.fields() {
            insert_member(&mut fields, field.name(), field.clone(), "field");
        }

        let mut methods = IndexMap::new();
        for method in C::methods() {
            let key = method.key().to_owned();
            insert_member(&mut methods, &key, method, "method");
        }

        let mut plans = IndexMap::with_capacity(fields.len());
        for (name, field) in &fields {
            let marker = taxonomy::resolve_marker(field.markers()).map_err(|conflict| {
                ConvertError::ambiguous_marker(query_type.short_name(), name.as_str(), &conflict.kinds)
                    .with_criteria_type(criteria_type.short_name())
            })?;

            let kind = taxonomy::effective_kind(marker);
            let base_name = taxonomy::base_name(name, marker);
            let method_key = taxonomy::method_name(&base_name, kind);
            let method_slot = methods.get_index_of(method_key.as_str());

            if method_slot.is_none() && !kind.is_excluded() {
                warn!(
                    query = query_type.short_name(),
                    criteria = criteria_type.short_name(),
                    field = name.as_str(),
                    method = method_key.as_str(),
                    "No criteria method for query field"
                );
            }

            plans.insert(
                name.clone(),
                FieldPlan {
                    field: name.clone(),
                    kind,
                    base_name,
                    method_key,
                    method_slot,
                },
            );
        }

        debug!(
            query = query_type.short_name(),
            criteria = criteria_type.short_name(),
            fields = fields.len(),
            methods = methods.len(),
            "Built field/method index"
        );

        Ok(Self {
            query_type,
            criteria_type,
            fields,
            methods,
            plans,
        })
    }
}

impl<C> FieldMethodIndex<C> {
    /// The indexed query type.
    pub fn query_type(&self) -> &TypeDescriptor {
        &self.query_type
    }

    /// The indexed criteria type.
    pub fn criteria_type(&self) -> &TypeDescriptor {
        &self.criteria_type
    }

    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Look up a criteria method by key.
    pub fn method(&self, key: &str) -> Option<&MethodDescriptor<C>> {
        self.methods.get(key)
    }

    /// The dispatch plan of a declared field.
    pub fn plan(&self, field: &str) -> Option<&FieldPlan> {
        self.plans.get(field)
    }

    /// The method a plan targets, if registered.
    pub fn target(&self, plan: &FieldPlan) -> Option<&MethodDescriptor<C>> {
        plan.method_slot
            .and_then(|slot| self.methods.get_index(slot))
            .map(|(_, method)| method)
    }

    /// Plans in declaration order.
    pub fn plans(&self) -> impl Iterator<Item = &FieldPlan> {
        self.plans.values()
    }

    /// Non-excluded fields whose target method is not registered.
    pub fn unmapped(&self) -> impl Iterator<Item = &FieldPlan> {
        self.plans().filter(|plan| !plan.is_excluded() && !plan.is_mapped())
    }

    /// Number of declared fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Number of registered methods.
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Whether the query type declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<C> Clone for FieldMethodIndex<C> {
    fn clone(&self) -> Self {
        Self {
            query_type: self.query_type,
            criteria_type: self.criteria_type,
            fields: self.fields.clone(),
            methods: self.methods.clone(),
            plans: self.plans.clone(),
        }
    }
}

impl<C> fmt::Debug for FieldMethodIndex<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMethodIndex")
            .field("query_type", &self.query_type.name())
            .field("criteria_type", &self.criteria_type.name())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn insert_member<T>(map: &mut IndexMap<SmolStr, T>, name: &str, member: T, what: &'static str) {
    let name = name.trim();
    if name.is_empty() {
        debug!(member = what, "Skipping member with a blank name");
        return;
    }
    match map.entry(SmolStr::new(name)) {
        Entry::Occupied(_) => debug!(member = what, name, "Skipping duplicate member"),
        Entry::Vacant(slot) => {
            slot.insert(member);
        }
    }
}

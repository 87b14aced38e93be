//! The conversion engine.
//!
//! A [`Converter`] owns the [`FieldMethodIndex`] for one (query, criteria)
//! pair and applies query instances to criteria instances:
//!
//! - [`Converter::populate`] applies a query to an existing criteria.
//! - [`Converter::convert`] constructs a fresh criteria and populates it.
//!
//! For each readable property, in enumeration order, the engine skips absent
//! values, undeclared properties and `Except` fields, wraps `Like` values in
//! wildcards, and invokes the target method. A missing target method skips
//! only that field. Method failures follow the configured [`FailurePolicy`].

use std::fmt;
use std::marker::PhantomData;

use smol_str::SmolStr;
use tracing::{debug, error, trace, warn};

use crate::config::{ConvertConfig, FailurePolicy};
use crate::error::{ConvertError, ConvertResult, InvokeError};
use crate::index::FieldMethodIndex;
use crate::meta::{CriteriaType, QueryType};
use crate::taxonomy::ComparisonKind;
use crate::value::FilterValue;
use crate::witness::{TypeDescriptor, TypeHierarchy};

/// Contract a converter type binds its query type to when constructed
/// through a [`TypeHierarchy`].
#[derive(Debug, Clone, Copy)]
pub struct QueryConverterContract;

/// Why a property did not reach the criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The property had no value.
    Absent,
    /// The property is not a field declared on the query type.
    NotDeclared,
    /// The field is marked `Except`.
    Excluded,
    /// The criteria type has no method with the target key.
    MissingMethod,
}

/// A criteria method call made during a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCall {
    /// The query field.
    pub field: SmolStr,
    /// The criteria method key.
    pub method: String,
    /// The value passed, after transforms.
    pub value: FilterValue,
}

/// A property left out of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    /// The property name.
    pub field: SmolStr,
    /// The method key it targeted, when one was resolved.
    pub method: Option<String>,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// A field whose criteria method failed under [`FailurePolicy::BestEffort`].
#[derive(Debug)]
pub struct FieldFailure {
    /// The query field.
    pub field: SmolStr,
    /// The criteria method key.
    pub method: String,
    /// What went wrong.
    pub error: InvokeError,
}

/// Outcome of one conversion.
#[derive(Debug, Default)]
pub struct ConversionReport {
    applied: Vec<AppliedCall>,
    skipped: Vec<SkippedField>,
    failures: Vec<FieldFailure>,
}

impl ConversionReport {
    /// Calls made, in order.
    pub fn applied(&self) -> &[AppliedCall] {
        &self.applied
    }

    /// Properties that were skipped, in order.
    pub fn skipped(&self) -> &[SkippedField] {
        &self.skipped
    }

    /// Method failures collected in best-effort mode.
    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    /// The method keys called, in order.
    pub fn call_sequence(&self) -> Vec<&str> {
        self.applied.iter().map(|call| call.method.as_str()).collect()
    }

    /// Skipped properties with the given reason.
    pub fn skipped_for(&self, reason: SkipReason) -> impl Iterator<Item = &SkippedField> {
        self.skipped.iter().filter(move |skip| skip.reason == reason)
    }

    /// Whether every attempted call succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn skip(&mut self, field: &SmolStr, method: Option<&str>, reason: SkipReason) {
        self.skipped.push(SkippedField {
            field: field.clone(),
            method: method.map(str::to_owned),
            reason,
        });
    }
}

/// Converts query instances of type `Q` into criteria of type `C`.
///
/// Immutable after construction; share it freely between threads.
pub struct Converter<Q, C> {
    index: FieldMethodIndex<C>,
    config: ConvertConfig,
    _query: PhantomData<fn() -> Q>,
}

impl<Q: QueryType, C: CriteriaType> Converter<Q, C> {
    /// Build a converter with the default configuration.
    pub fn new() -> ConvertResult<Self> {
        Self::with_config(ConvertConfig::default())
    }

    /// Build a converter with `config`.
    pub fn with_config(config: ConvertConfig) -> ConvertResult<Self> {
        config.validate()?;
        let index = FieldMethodIndex::build::<Q>()?;
        Ok(Self {
            index,
            config,
            _query: PhantomData,
        })
    }

    /// Build a converter whose query type is recovered from `owner`'s
    /// binding of [`QueryConverterContract`] in `hierarchy`.
    pub fn from_witness(hierarchy: &TypeHierarchy, owner: &TypeDescriptor) -> ConvertResult<Self> {
        Self::from_witness_with(
            hierarchy,
            owner,
            &TypeDescriptor::of::<QueryConverterContract>(),
            ConvertConfig::default(),
        )
    }

    /// [`from_witness`](Self::from_witness) with an explicit contract and configuration.
    ///
    /// Fails with `UnresolvableQueryType` when nothing is bound or the bound
    /// type is not `Q`.
    pub fn from_witness_with(
        hierarchy: &TypeHierarchy,
        owner: &TypeDescriptor,
        contract: &TypeDescriptor,
        config: ConvertConfig,
    ) -> ConvertResult<Self> {
        let unresolvable = || {
            ConvertError::unresolvable_query_type(owner.short_name(), contract.short_name())
                .with_criteria_type(C::type_descriptor().short_name())
        };

        let resolved = hierarchy.resolve_class(owner, contract).ok_or_else(unresolvable)?;
        if !resolved.is::<Q>() {
            return Err(unresolvable().with_query_type(resolved.name()).with_suggestion(format!(
                "`{}` binds `{}`, not `{}`",
                owner.short_name(),
                resolved.short_name(),
                std::any::type_name::<Q>()
            )));
        }

        debug!(owner = owner.short_name(), query = resolved.short_name(), "Resolved query type witness");
        Self::with_config(config)
    }

    /// Apply `query` to an existing `criteria`.
    ///
    /// Under [`FailurePolicy::Atomic`] the first failing method aborts the
    /// call; calls already made stay applied to `criteria`.
    pub fn populate(&self, query: &Q, criteria: &mut C) -> ConvertResult<ConversionReport> {
        let mut report = ConversionReport::default();

        for property in query.properties() {
            let name = property.name;

            let Some(value) = property.value else {
                trace!(field = name.as_str(), "Absent, skipping");
                report.skip(&name, None, SkipReason::Absent);
                continue;
            };

            // Properties of composed base queries are not declared here.
            let Some(plan) = self.index.plan(&name) else {
                trace!(field = name.as_str(), "Not a declared field, skipping");
                report.skip(&name, None, SkipReason::NotDeclared);
                continue;
            };

            if plan.is_excluded() {
                report.skip(&name, None, SkipReason::Excluded);
                continue;
            }

            let Some(method) = self.index.target(plan) else {
                if self.config.warn_on_missing_method {
                    warn!(
                        query = self.index.query_type().short_name(),
                        criteria = self.index.criteria_type().short_name(),
                        field = name.as_str(),
                        method = plan.method_key(),
                        "No criteria method for query field"
                    );
                }
                report.skip(&name, Some(plan.method_key()), SkipReason::MissingMethod);
                continue;
            };

            let value = transform(plan.kind(), value, &self.config.like_wildcard);
            debug!(field = name.as_str(), method = method.key(), value = %value, "Applying filter");

            match method.invoke(criteria, value.clone()) {
                Ok(()) => report.applied.push(AppliedCall {
                    field: name,
                    method: method.key().to_owned(),
                    value,
                }),
                Err(err) => match self.config.failure_policy {
                    FailurePolicy::Atomic => {
                        return Err(ConvertError::invocation(name.as_str(), method.key(), err)
                            .with_query_type(self.index.query_type().short_name())
                            .with_criteria_type(self.index.criteria_type().short_name()));
                    }
                    FailurePolicy::BestEffort => {
                        warn!(field = name.as_str(), method = method.key(), error = %err, "Criteria method failed");
                        report.failures.push(FieldFailure {
                            field: name,
                            method: method.key().to_owned(),
                            error: err,
                        });
                    }
                },
            }
        }

        Ok(report)
    }

    /// Construct a fresh criteria and apply `query` to it.
    pub fn convert(&self, query: &Q) -> ConvertResult<C> {
        self.convert_with_report(query).map(|(criteria, _)| criteria)
    }

    /// [`convert`](Self::convert), also returning the conversion report.
    pub fn convert_with_report(&self, query: &Q) -> ConvertResult<(C, ConversionReport)> {
        let mut criteria = C::instantiate().map_err(|err| {
            error!(criteria = self.index.criteria_type().short_name(), error = %err, "Cannot construct criteria");
            ConvertError::instantiation(self.index.criteria_type().short_name(), err)
        })?;
        let report = self.populate(query, &mut criteria)?;
        Ok((criteria, report))
    }

    /// The index this converter dispatches through.
    pub fn index(&self) -> &FieldMethodIndex<C> {
        &self.index
    }

    /// The active configuration.
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Names of declared fields whose target method is not registered.
    pub fn unmapped_fields(&self) -> Vec<&str> {
        self.index.unmapped().map(|plan| plan.field()).collect()
    }
}

impl<Q, C> Clone for Converter<Q, C> {
    fn clone(&self) -> Self {
        Self {
            index: self.index.clone(),
            config: self.config.clone(),
            _query: PhantomData,
        }
    }
}

impl<Q, C> fmt::Debug for Converter<Q, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("index", &self.index)
            .field("config", &self.config)
            .finish()
    }
}

/// The value a field of `kind` passes to its criteria method.
fn transform(kind: ComparisonKind, value: FilterValue, wildcard: &str) -> FilterValue {
    match kind {
        ComparisonKind::Like => value.wrap_wildcard(wildcard),
        _ => value,
    }
}

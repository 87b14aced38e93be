//! Integration tests for building converters from a type witness.
//!
//! Converter types register how they bind `QueryConverterContract`, either
//! directly or through generic ancestors whose binding is erased.

use sieve::prelude::*;
use sieve::{ErrorCode, Parameterized, TypeArg, TypeNode};

#[derive(Query, Default)]
struct UserQuery {
    status: Option<String>,
}

#[derive(Query, Default)]
struct OrderQuery {
    status: Option<String>,
}

#[derive(Debug, Default)]
struct UserCriteria {
    statuses: Vec<String>,
}

#[criteria]
impl UserCriteria {
    pub fn and_status_equal_to(&mut self, status: String) {
        self.statuses.push(status);
    }
}

/// `UserConverter implements QueryConverterContract<UserQuery>`
struct UserConverter;

/// `AbstractConverter<Q> implements QueryConverterContract<Q>`
struct AbstractConverter;

/// `AuditedConverter<Q> extends AbstractConverter<Q>`
struct AuditedConverter;

/// `AuditedUserConverter extends AuditedConverter<UserQuery>`
struct AuditedUserConverter;

/// `Unbound<Q> implements QueryConverterContract<Q>`, never specialized
struct Unbound;

fn contract() -> Parameterized {
    Parameterized::new(TypeDescriptor::of::<QueryConverterContract>())
}

fn hierarchy() -> TypeHierarchy {
    TypeHierarchy::new()
        .with(
            TypeNode::new(TypeDescriptor::of::<UserConverter>())
                .implements(contract().arg(TypeArg::of::<UserQuery>())),
        )
        .with(
            TypeNode::new(TypeDescriptor::of::<AbstractConverter>())
                .implements(contract().arg(TypeArg::variable("Q"))),
        )
        .with(
            TypeNode::new(TypeDescriptor::of::<AuditedConverter>()).extends(
                Parameterized::new(TypeDescriptor::of::<AbstractConverter>())
                    .arg(TypeArg::variable("Q")),
            ),
        )
        .with(
            TypeNode::new(TypeDescriptor::of::<AuditedUserConverter>()).extends(
                Parameterized::new(TypeDescriptor::of::<AuditedConverter>())
                    .arg(TypeArg::of::<UserQuery>()),
            ),
        )
        .with(
            TypeNode::new(TypeDescriptor::of::<Unbound>())
                .implements(contract().arg(TypeArg::variable("Q"))),
        )
}

#[test]
fn test_direct_implementation_resolves() {
    let converter = Converter::<UserQuery, UserCriteria>::from_witness(
        &hierarchy(),
        &TypeDescriptor::of::<UserConverter>(),
    )
    .unwrap();

    let criteria = converter
        .convert(&UserQuery {
            status: Some("ACTIVE".into()),
        })
        .unwrap();
    assert_eq!(criteria.statuses, vec!["ACTIVE"]);
}

#[test]
fn test_erased_intermediate_resolves_through_nearest_ancestor() {
    let hierarchy = hierarchy();
    let owner = TypeDescriptor::of::<AuditedUserConverter>();

    assert_eq!(
        hierarchy.resolve(&owner, &TypeDescriptor::of::<QueryConverterContract>()),
        Some(TypeDescriptor::of::<UserQuery>())
    );
    assert!(Converter::<UserQuery, UserCriteria>::from_witness(&hierarchy, &owner).is_ok());
}

#[test]
fn test_free_variable_is_unresolvable() {
    let err = Converter::<UserQuery, UserCriteria>::from_witness(
        &hierarchy(),
        &TypeDescriptor::of::<Unbound>(),
    )
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::UnresolvableQueryType);
    assert!(err.is_metadata());
}

#[test]
fn test_unregistered_owner_is_unresolvable() {
    struct Stranger;

    let err = Converter::<UserQuery, UserCriteria>::from_witness(
        &hierarchy(),
        &TypeDescriptor::of::<Stranger>(),
    )
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnresolvableQueryType);
}

#[test]
fn test_binding_to_another_query_type_is_rejected() {
    let err = Converter::<OrderQuery, UserCriteria>::from_witness(
        &hierarchy(),
        &TypeDescriptor::of::<UserConverter>(),
    )
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::UnresolvableQueryType);
    assert!(!err.context.suggestions.is_empty());
}

#[test]
fn test_witness_with_config() {
    let config = ConvertConfig::new().failure_policy(FailurePolicy::BestEffort);
    let converter = Converter::<UserQuery, UserCriteria>::from_witness_with(
        &hierarchy(),
        &TypeDescriptor::of::<AuditedUserConverter>(),
        &TypeDescriptor::of::<QueryConverterContract>(),
        config,
    )
    .unwrap();

    assert_eq!(converter.config().failure_policy, FailurePolicy::BestEffort);
}

//! Integration tests for query-to-criteria conversion.
//!
//! These tests drive the derive and attribute macros end to end:
//! - Method naming for unmarked, marked and renamed fields
//! - Skipping of absent, excluded, undeclared and unmapped fields
//! - Failure policies
//! - Determinism across repeated conversions

use pretty_assertions::assert_eq;
use sieve::prelude::*;
use sieve::{ErrorCode, SkippedField};

#[derive(Debug, thiserror::Error)]
#[error("total must not be negative, got {0}")]
struct NegativeTotal(i64);

#[derive(Query, Debug, Default)]
struct TenantQuery {
    tenant_id: Option<i64>,
}

#[derive(Query, Debug, Default)]
struct CustomerQuery {
    #[sieve(base)]
    base: TenantQuery,
    status: Option<String>,
    nickname: Option<String>,
    #[sieve(like)]
    cust_name_like: Option<String>,
    #[sieve(gte = "age")]
    min_age: Option<i32>,
    #[sieve(in)]
    region: Option<Vec<String>>,
    #[sieve(is_null)]
    deleted_at: Option<bool>,
    #[sieve(lt = "total")]
    max_total: Option<i64>,
    #[sieve(lte = "score")]
    max_score: Option<i64>,
    #[sieve(except)]
    page: Option<i64>,
}

#[derive(Debug, Default)]
struct CustomerCriteria {
    calls: Vec<String>,
}

#[criteria]
impl CustomerCriteria {
    pub fn and_tenant_id_equal_to(&mut self, tenant: i64) -> &mut Self {
        self.calls.push(format!("tenant_id = {}", tenant));
        self
    }

    pub fn and_status_equal_to(&mut self, status: String) -> &mut Self {
        self.calls.push(format!("status = {}", status));
        self
    }

    pub fn and_cust_name_like(&mut self, pattern: &str) -> &mut Self {
        self.calls.push(format!("cust_name like {}", pattern));
        self
    }

    pub fn and_age_greater_than_or_equal_to(&mut self, age: i32) -> &mut Self {
        self.calls.push(format!("age >= {}", age));
        self
    }

    pub fn and_region_in(&mut self, regions: Vec<String>) -> &mut Self {
        self.calls.push(format!("region in ({})", regions.join(", ")));
        self
    }

    pub fn and_deleted_at_is_null(&mut self, flag: bool) -> &mut Self {
        self.calls.push(format!("deleted_at is null ({})", flag));
        self
    }

    pub fn and_total_less_than(&mut self, total: i64) -> Result<&mut Self, NegativeTotal> {
        if total < 0 {
            return Err(NegativeTotal(total));
        }
        self.calls.push(format!("total < {}", total));
        Ok(self)
    }

    pub fn and_score_less_than_or_equal_to(&mut self, score: i64) -> &mut Self {
        self.calls.push(format!("score <= {}", score));
        self
    }

    pub fn and_page_equal_to(&mut self, page: i64) -> &mut Self {
        self.calls.push(format!("page = {}", page));
        self
    }
}

fn converter() -> Converter<CustomerQuery, CustomerCriteria> {
    Converter::new().unwrap()
}

#[test]
fn test_all_absent_query_invokes_nothing() {
    let criteria = converter().convert(&CustomerQuery::default()).unwrap();
    assert!(criteria.calls.is_empty());
}

#[test]
fn test_unmarked_field_compares_equality() {
    let query = CustomerQuery {
        status: Some("ACTIVE".into()),
        ..Default::default()
    };

    let (criteria, report) = converter().convert_with_report(&query).unwrap();
    assert_eq!(criteria.calls, vec!["status = ACTIVE"]);
    assert_eq!(report.call_sequence(), vec!["andStatusEqualTo"]);
}

#[test]
fn test_like_field_is_wrapped_in_wildcards() {
    let query = CustomerQuery {
        cust_name_like: Some("Bob".into()),
        ..Default::default()
    };

    let (criteria, report) = converter().convert_with_report(&query).unwrap();
    assert_eq!(criteria.calls, vec!["cust_name like %Bob%"]);
    assert_eq!(report.applied()[0].value, FilterValue::String("%Bob%".into()));
}

#[test]
fn test_custom_wildcard() {
    let config = ConvertConfig::new().like_wildcard("*");
    let converter = Converter::<CustomerQuery, CustomerCriteria>::with_config(config).unwrap();
    let query = CustomerQuery {
        cust_name_like: Some("Bob".into()),
        ..Default::default()
    };

    let criteria = converter.convert(&query).unwrap();
    assert_eq!(criteria.calls, vec!["cust_name like *Bob*"]);
}

#[test]
fn test_override_name_targets_other_method() {
    let query = CustomerQuery {
        min_age: Some(30),
        ..Default::default()
    };

    let (criteria, report) = converter().convert_with_report(&query).unwrap();
    assert_eq!(criteria.calls, vec!["age >= 30"]);
    assert_eq!(report.call_sequence(), vec!["andAgeGreaterThanOrEqualTo"]);
}

#[test]
fn test_except_field_is_never_converted() {
    let query = CustomerQuery {
        page: Some(3),
        ..Default::default()
    };

    let (criteria, report) = converter().convert_with_report(&query).unwrap();
    assert!(criteria.calls.is_empty());
    assert_eq!(report.skipped_for(SkipReason::Excluded).count(), 1);
}

#[test]
fn test_list_and_null_check_fields() {
    let query = CustomerQuery {
        region: Some(vec!["EU".into(), "APAC".into()]),
        deleted_at: Some(true),
        ..Default::default()
    };

    let criteria = converter().convert(&query).unwrap();
    assert_eq!(
        criteria.calls,
        vec!["region in (EU, APAC)", "deleted_at is null (true)"]
    );
}

#[test]
fn test_base_query_properties_are_not_declared() {
    let query = CustomerQuery {
        base: TenantQuery { tenant_id: Some(7) },
        status: Some("ACTIVE".into()),
        ..Default::default()
    };

    let (criteria, report) = converter().convert_with_report(&query).unwrap();
    assert_eq!(criteria.calls, vec!["status = ACTIVE"]);

    let not_declared: Vec<&SkippedField> = report.skipped_for(SkipReason::NotDeclared).collect();
    assert_eq!(not_declared.len(), 1);
    assert_eq!(not_declared[0].field, "tenant_id");
}

#[test]
fn test_redeclared_base_field_reads_the_outer_value_once() {
    #[derive(Query, Default)]
    struct StatusQuery {
        status: Option<String>,
    }

    #[derive(Query, Default)]
    struct ArchiveQuery {
        #[sieve(base)]
        base: StatusQuery,
        status: Option<String>,
    }

    #[derive(Debug, Default)]
    struct ArchiveCriteria {
        statuses: Vec<String>,
    }

    #[criteria]
    impl ArchiveCriteria {
        pub fn and_status_equal_to(&mut self, status: String) {
            self.statuses.push(status);
        }
    }

    let converter = Converter::<ArchiveQuery, ArchiveCriteria>::new().unwrap();

    let both = ArchiveQuery {
        base: StatusQuery {
            status: Some("BASE".into()),
        },
        status: Some("LEAF".into()),
    };
    let (criteria, report) = converter.convert_with_report(&both).unwrap();
    assert_eq!(criteria.statuses, vec!["LEAF"]);
    assert_eq!(report.skipped_for(SkipReason::NotDeclared).count(), 0);

    let base_only = ArchiveQuery {
        base: StatusQuery {
            status: Some("BASE".into()),
        },
        status: None,
    };
    let (criteria, report) = converter.convert_with_report(&base_only).unwrap();
    assert!(criteria.statuses.is_empty());
    assert_eq!(report.skipped_for(SkipReason::Absent).count(), 1);
}

#[test]
fn test_negated_and_ordering_kinds() {
    #[derive(Query, Default)]
    struct ShipmentQuery {
        #[sieve(not_in)]
        carrier: Option<Vec<String>>,
        #[sieve(gt = "weight")]
        min_weight: Option<i64>,
        #[sieve(is_not_null)]
        shipped_at: Option<bool>,
    }

    #[derive(Debug, Default)]
    struct ShipmentCriteria {
        calls: Vec<String>,
    }

    #[criteria]
    impl ShipmentCriteria {
        pub fn and_carrier_not_in(&mut self, carriers: Vec<String>) -> &mut Self {
            self.calls.push(format!("carrier not in ({})", carriers.join(", ")));
            self
        }

        pub fn and_weight_greater_than(&mut self, weight: i64) -> &mut Self {
            self.calls.push(format!("weight > {}", weight));
            self
        }

        pub fn and_shipped_at_is_not_null(&mut self, flag: bool) -> &mut Self {
            self.calls.push(format!("shipped_at is not null ({})", flag));
            self
        }
    }

    let converter = Converter::<ShipmentQuery, ShipmentCriteria>::new().unwrap();
    assert!(converter.unmapped_fields().is_empty());

    let criteria = converter
        .convert(&ShipmentQuery {
            carrier: Some(vec!["UPS".into(), "DHL".into()]),
            min_weight: Some(20),
            shipped_at: Some(true),
        })
        .unwrap();
    assert_eq!(
        criteria.calls,
        vec![
            "carrier not in (UPS, DHL)",
            "weight > 20",
            "shipped_at is not null (true)",
        ]
    );
}

#[test]
fn test_missing_method_with_warnings_disabled() {
    let config = ConvertConfig::new().warn_on_missing_method(false);
    let converter = Converter::<CustomerQuery, CustomerCriteria>::with_config(config).unwrap();

    let query = CustomerQuery {
        status: Some("ACTIVE".into()),
        nickname: Some("bobby".into()),
        ..Default::default()
    };

    let (criteria, report) = converter.convert_with_report(&query).unwrap();
    assert_eq!(criteria.calls, vec!["status = ACTIVE"]);
    assert_eq!(report.skipped_for(SkipReason::MissingMethod).count(), 1);
    assert_eq!(converter.unmapped_fields(), vec!["nickname"]);
}

#[test]
fn test_missing_method_skips_only_that_field() {
    let query = CustomerQuery {
        status: Some("ACTIVE".into()),
        nickname: Some("bobby".into()),
        min_age: Some(18),
        ..Default::default()
    };

    let (criteria, report) = converter().convert_with_report(&query).unwrap();
    assert_eq!(criteria.calls, vec!["status = ACTIVE", "age >= 18"]);

    let missing: Vec<&SkippedField> = report.skipped_for(SkipReason::MissingMethod).collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].field, "nickname");
    assert_eq!(missing[0].method.as_deref(), Some("andNicknameEqualTo"));
}

#[test]
fn test_unmapped_fields_are_reported() {
    assert_eq!(converter().unmapped_fields(), vec!["nickname"]);
}

#[test]
fn test_invocation_failure_aborts_remaining_fields() {
    let query = CustomerQuery {
        status: Some("ACTIVE".into()),
        max_total: Some(-5),
        max_score: Some(90),
        ..Default::default()
    };

    let converter = converter();
    let mut criteria = CustomerCriteria::default();
    let err = converter.populate(&query, &mut criteria).unwrap_err();

    assert_eq!(err.code, ErrorCode::Invocation);
    assert_eq!(err.context.field.as_deref(), Some("max_total"));
    assert_eq!(err.context.method.as_deref(), Some("andTotalLessThan"));
    assert!(err.display_full().contains("total must not be negative"));

    // Calls made before the failure stay applied; later fields are abandoned.
    assert_eq!(criteria.calls, vec!["status = ACTIVE"]);

    assert!(converter.convert(&query).is_err());
}

#[test]
fn test_best_effort_attempts_remaining_fields() {
    let config = ConvertConfig::new().failure_policy(FailurePolicy::BestEffort);
    let converter = Converter::<CustomerQuery, CustomerCriteria>::with_config(config).unwrap();
    let query = CustomerQuery {
        status: Some("ACTIVE".into()),
        max_total: Some(-5),
        max_score: Some(90),
        ..Default::default()
    };

    let (criteria, report) = converter.convert_with_report(&query).unwrap();
    assert_eq!(criteria.calls, vec!["status = ACTIVE", "score <= 90"]);
    assert!(!report.is_complete());
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].method, "andTotalLessThan");
}

#[test]
fn test_repeated_conversions_are_deterministic() {
    let converter = converter();
    let query = CustomerQuery {
        base: TenantQuery { tenant_id: Some(1) },
        status: Some("ACTIVE".into()),
        cust_name_like: Some("Bob".into()),
        min_age: Some(21),
        region: Some(vec!["EU".into()]),
        max_score: Some(10),
        page: Some(2),
        ..Default::default()
    };

    let first = converter.convert(&query).unwrap();
    for _ in 0..10 {
        let mut criteria = CustomerCriteria::default();
        converter.populate(&query, &mut criteria).unwrap();
        assert_eq!(criteria.calls, first.calls);
    }
}

#[test]
fn test_converter_is_shareable_across_threads() {
    let converter = std::sync::Arc::new(converter());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let converter = std::sync::Arc::clone(&converter);
            std::thread::spawn(move || {
                let query = CustomerQuery {
                    min_age: Some(i),
                    ..Default::default()
                };
                converter.convert(&query).unwrap().calls
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), vec![format!("age >= {}", i)]);
    }
}

#[test]
fn test_type_mismatch_is_reported() {
    #[derive(Query, Default)]
    struct ScoreQuery {
        #[sieve(name = "score")]
        score_text: Option<String>,
    }

    #[derive(Debug, Default)]
    struct ScoreCriteria;

    #[criteria]
    impl ScoreCriteria {
        pub fn and_score_equal_to(&mut self, _score: i64) {}
    }

    let converter = Converter::<ScoreQuery, ScoreCriteria>::new().unwrap();
    let query = ScoreQuery {
        score_text: Some("high".into()),
    };

    let err = converter.convert(&query).unwrap_err();
    assert_eq!(err.code, ErrorCode::TypeMismatch);
    assert!(err.is_invocation());
}

#[test]
fn test_fallible_constructor_failure() {
    #[derive(Query, Default)]
    struct EmptyQuery;

    #[derive(Debug)]
    struct ClosedCriteria;

    #[criteria(try_constructor = "open")]
    impl ClosedCriteria {
        fn open() -> Result<Self, String> {
            Err("criteria pool exhausted".to_string())
        }
    }

    let converter = Converter::<EmptyQuery, ClosedCriteria>::new().unwrap();
    let err = converter.convert(&EmptyQuery).unwrap_err();
    assert_eq!(err.code, ErrorCode::Instantiation);
}

#[test]
fn test_renamed_criteria_method() {
    #[derive(Query, Default)]
    struct NameQuery {
        #[sieve(like)]
        cust_name_like: Option<String>,
    }

    #[derive(Debug, Default)]
    struct NameCriteria {
        pattern: Option<String>,
    }

    #[criteria]
    impl NameCriteria {
        #[criteria(rename = "andCustNameLike")]
        pub fn customer_name_matches(&mut self, pattern: String) {
            self.pattern = Some(pattern);
        }
    }

    let converter = Converter::<NameQuery, NameCriteria>::new().unwrap();
    let criteria = converter
        .convert(&NameQuery {
            cust_name_like: Some("ali".into()),
        })
        .unwrap();
    assert_eq!(criteria.pattern.as_deref(), Some("%ali%"));
}

#[test]
fn test_conversion_under_a_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let query = CustomerQuery {
            status: Some("ACTIVE".into()),
            nickname: Some("bobby".into()),
            page: Some(1),
            ..Default::default()
        };

        let criteria = converter().convert(&query).unwrap();
        assert_eq!(criteria.calls, vec!["status = ACTIVE"]);
    });
}

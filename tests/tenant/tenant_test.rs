// tests/tenant/tenant_test.rs
use launchmon::tenant::{normalize_all, parse_customer_ids, CustomerId, TenantError, TenantScope};

fn strs(ids: &[CustomerId]) -> Vec<&str> {
    ids.iter().map(CustomerId::as_str).collect()
}

#[test]
fn test_digit_groups_in_order() {
    let ids = parse_customer_ids("123-456-7890,111 222 3333 , 4-4").unwrap();
    assert_eq!(strs(&ids), vec!["1234567890", "1112223333", "44"]);
}

#[test]
fn test_non_digit_tokens_are_named() {
    let err = parse_customer_ids("12a,34,5.6").unwrap_err();
    assert_eq!(err, TenantError::Invalid(vec!["12a".into(), "5.6".into()]));
    assert_eq!(err.to_string(), "invalid customer id(s): 12a, 5.6");
}

#[test]
fn test_non_ascii_digits_rejected() {
    assert_eq!(
        parse_customer_ids("١٢٣,456"),
        Err(TenantError::Invalid(vec!["١٢٣".into()]))
    );
    assert_eq!(
        "１２３-４".parse::<CustomerId>(),
        Err(TenantError::Invalid(vec!["１２３-４".into()]))
    );
    assert!(normalize_all(&["7", "٤٥"]).is_err());
}

#[test]
fn test_invalid_tokens_reported_as_written() {
    assert_eq!(
        parse_customer_ids("1, a-b c ,2"),
        Err(TenantError::Invalid(vec!["a-b c".into()]))
    );
}

#[test]
fn test_single_id_parse() {
    let id: CustomerId = " 987-654 ".parse().unwrap();
    assert_eq!(id.to_string(), "987654");
    assert!("".parse::<CustomerId>().is_err());
    assert!("1_2".parse::<CustomerId>().is_err());
}

#[test]
fn test_normalize_splits_compound_entries() {
    let ids = normalize_all(&["1-1,2", "3 3"]).unwrap();
    assert_eq!(strs(&ids), vec!["11", "2", "33"]);
    assert_eq!(normalize_all::<&str>(&[]), Err(TenantError::Empty));
}

#[test]
fn test_scope_login_rules() {
    assert_eq!(
        TenantScope::parse("1,2,3", None),
        Err(TenantError::MissingLoginCustomer(3))
    );

    let scope = TenantScope::parse("1,2", Some("99-9")).unwrap();
    assert_eq!(scope.login_customer_id().map(CustomerId::as_str), Some("999"));

    let narrowed = scope.with_customers(parse_customer_ids("7").unwrap()).unwrap();
    assert_eq!(strs(narrowed.customer_ids()), vec!["7"]);
    assert_eq!(narrowed.login_customer_id(), scope.login_customer_id());

    assert!(matches!(
        TenantScope::parse("1", Some("x")),
        Err(TenantError::Invalid(_))
    ));
}

// tests/query/compile_test.rs
use launchmon::query::{id_in_predicate, QueryDefinition};
use launchmon::report::catalog;

#[test]
fn test_definition_wheres_come_first() {
    let query = QueryDefinition::new("x").select(["a.b", "c.d"]).filter("p1");
    assert_eq!(query.compile(&["p2"]), "SELECT a.b, c.d FROM x WHERE p1 AND p2");
}

#[test]
fn test_no_where_clause_without_predicates() {
    let query = QueryDefinition::new("x").select(["a.b", "c.d"]);
    assert_eq!(query.compile::<&str>(&[]), "SELECT a.b, c.d FROM x");
}

#[test]
fn test_field_order_preserved() {
    let query = QueryDefinition::new("t").select(["z.z", "a.a", "m.m"]);
    assert_eq!(query.to_string(), "SELECT z.z, a.a, m.m FROM t");
}

#[test]
fn test_predicates_are_not_validated() {
    let query = QueryDefinition::new("t").select(["t.id"]);
    assert_eq!(
        query.compile(&["this is ( not valid"]),
        "SELECT t.id FROM t WHERE this is ( not valid"
    );
}

#[test]
fn test_id_in_predicate() {
    assert_eq!(id_in_predicate("campaign", ["3", "1", "2", "2"]), "campaign.id IN (1,2,3)");
    assert_eq!(
        id_in_predicate("label", ["b", "it's", "1"]),
        r"label.id IN (1,'b','it\'s')"
    );
}

#[test]
fn test_catalog_queries() {
    let customers = catalog::customers();
    let campaigns = catalog::campaigns().unwrap();
    let ad_groups = catalog::ad_groups().unwrap();

    insta::assert_snapshot!(customers.query().to_string(), @"SELECT customer.id, customer.descriptive_name, customer.currency_code, customer.time_zone FROM customer");
    insta::assert_snapshot!(campaigns.query().to_string(), @"SELECT campaign.id, campaign.name, campaign.status, campaign.advertising_channel_type, customer.id FROM campaign WHERE campaign.status != 'REMOVED'");
    insta::assert_snapshot!(
        ad_groups.query().compile(&["campaign.id IN (1,2)"]),
        @"SELECT ad_group.id, ad_group.name, ad_group.status, ad_group.cpc_bid_micros, campaign.id FROM ad_group WHERE ad_group.status != 'REMOVED' AND campaign.id IN (1,2)"
    );
}

// ==========================================
// TariffRuleApi integration tests
// ==========================================
// Coverage:
// 1. Create: validation, scheme mirroring, tier overlap guard
// 2. Update / deactivate / hard delete with referential guards
// 3. Audit completeness: one event per successful mutation
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use plantation_tariff::api::{ApiError, CreateTariffRuleRequest, UpdateTariffRuleRequest};
use plantation_tariff::RateSet;

fn create_request(land_type_id: &str, tarif_code: &str, min: f64, max: f64) -> CreateTariffRuleRequest {
    CreateTariffRuleRequest {
        company_id: COMPANY.to_string(),
        land_type_id: land_type_id.to_string(),
        tarif_code: tarif_code.to_string(),
        bjr_min_kg: Some(min),
        bjr_max_kg: Some(max),
        rates: RateSet {
            tarif_upah: Some(1000.0),
            ..Default::default()
        },
        sort_order: 1,
        keterangan: None,
        actor_id: ACTOR_ID.to_string(),
        actor_name: ACTOR_NAME.to_string(),
    }
}

// ==========================================
// create
// ==========================================

#[test]
fn test_create_rule_mirrors_scheme_and_audits() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");

    let dto = env
        .rule_api
        .create_rule(create_request(&lt, "A1", 0.0, 10.0))
        .expect("create should succeed");

    assert_eq!(dto.scheme_code, "MINERAL");
    assert_eq!(dto.perlakuan, "MINERAL - A1");
    assert!(dto.is_active);
    assert_eq!(env.audit_count(), 1);

    let events = env
        .audit_api
        .list_events(COMPANY, None, None, 1, 10)
        .unwrap();
    assert_eq!(events.total, 1);
    assert_eq!(events.events[0].event_type, "RULE_VALUES_UPDATED");
    assert_eq!(events.events[0].rule_code.as_deref(), Some("A1"));
}

#[test]
fn test_create_rule_rejects_inverted_range() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");

    let result = env.rule_api.create_rule(create_request(&lt, "A1", 20.0, 10.0));
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    // rejected before any write
    assert_eq!(env.audit_count(), 0);
}

#[test]
fn test_create_rule_rejects_blank_code() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");

    let result = env.rule_api.create_rule(create_request(&lt, "   ", 0.0, 10.0));
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[test]
fn test_create_rule_rejects_inactive_land_type() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    env.land_type_repo.deactivate(&lt).unwrap();

    let result = env.rule_api.create_rule(create_request(&lt, "A1", 0.0, 10.0));
    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}

#[test]
fn test_create_rule_rejects_overlapping_active_tier() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    env.create_rule(&lt, "A1", Some(0.0), Some(10.0), 1000.0);

    // [8, 15) overlaps [0, 10)
    let result = env.rule_api.create_rule(create_request(&lt, "A2", 8.0, 15.0));
    assert!(matches!(result, Err(ApiError::ValidationError(_))));

    // adjacent half-open [10, 20) does not overlap
    env.rule_api
        .create_rule(create_request(&lt, "A2", 10.0, 20.0))
        .expect("adjacent tier should be accepted");
}

#[test]
fn test_create_rule_duplicate_code_within_land_type() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    env.create_rule(&lt, "A1", Some(0.0), Some(10.0), 1000.0);

    // case/whitespace variant of the same code, disjoint range
    let result = env.rule_api.create_rule(create_request(&lt, " a1", 10.0, 20.0));
    assert!(matches!(result, Err(ApiError::ValidationError(_))));
    assert_eq!(env.audit_count(), 1);
}

#[test]
fn test_create_rule_cross_company_land_type() {
    let env = ApiTestEnv::new();
    let other_lt = env.seed_land_type("company-2", "MINERAL");

    let result = env.rule_api.create_rule(create_request(&other_lt, "A1", 0.0, 10.0));
    assert!(matches!(result, Err(ApiError::CompanyScopeViolation(_))));
}

// ==========================================
// update / deactivate
// ==========================================

#[test]
fn test_update_rule_changes_values_and_audits() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    let rule_id = env.create_rule(&lt, "A1", Some(0.0), Some(10.0), 1000.0);

    let dto = env
        .rule_api
        .update_rule(UpdateTariffRuleRequest {
            company_id: COMPANY.to_string(),
            rule_id: rule_id.clone(),
            tarif_code: "A1".to_string(),
            bjr_min_kg: Some(0.0),
            bjr_max_kg: Some(12.0),
            rates: RateSet {
                tarif_upah: Some(1250.0),
                ..Default::default()
            },
            sort_order: 2,
            keterangan: Some("revisi SK".to_string()),
            is_active: true,
            actor_id: ACTOR_ID.to_string(),
            actor_name: ACTOR_NAME.to_string(),
        })
        .expect("update should succeed");

    assert_eq!(dto.bjr_max_kg, Some(12.0));
    assert_eq!(dto.rates.tarif_upah, Some(1250.0));
    assert_eq!(env.audit_count(), 2); // create + update
}

#[test]
fn test_deactivate_rule_twice_is_rejected() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    let rule_id = env.create_rule(&lt, "A1", Some(0.0), Some(10.0), 1000.0);

    let dto = env
        .rule_api
        .deactivate_rule(COMPANY, &rule_id, ACTOR_ID, ACTOR_NAME)
        .expect("deactivate should succeed");
    assert!(!dto.is_active);

    let again = env.rule_api.deactivate_rule(COMPANY, &rule_id, ACTOR_ID, ACTOR_NAME);
    assert!(matches!(again, Err(ApiError::ValidationError(_))));
}

#[test]
fn test_company_scope_enforced_on_update() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    let rule_id = env.create_rule(&lt, "A1", Some(0.0), Some(10.0), 1000.0);

    let result = env
        .rule_api
        .deactivate_rule("company-2", &rule_id, ACTOR_ID, ACTOR_NAME);
    assert!(matches!(result, Err(ApiError::CompanyScopeViolation(_))));
}

// ==========================================
// delete and referential guards
// ==========================================

#[test]
fn test_delete_unreferenced_rule() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    let rule_id = env.create_rule(&lt, "A1", Some(0.0), Some(10.0), 1000.0);

    let deleted = env
        .rule_api
        .delete_rule(COMPANY, &rule_id, ACTOR_ID, ACTOR_NAME)
        .expect("delete should succeed");
    assert!(deleted);
    assert!(env.rule_repo.find_by_id(&rule_id).unwrap().is_none());

    // the trail outlives the rule: create + delete
    assert_eq!(env.audit_count(), 2);
    let trail = env.audit_api.list_events_for_rule(&rule_id).unwrap();
    assert_eq!(trail.len(), 2);
}

#[test]
fn test_delete_rule_referenced_by_block_is_refused() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    let rule_id = env.create_rule(&lt, "A1", Some(0.0), Some(10.0), 1000.0);
    env.seed_block(COMPANY, "b1", "B-01");
    env.block_api
        .assign_rule(plantation_tariff::api::AssignBlockRuleRequest {
            company_id: COMPANY.to_string(),
            block_id: "b1".to_string(),
            land_type_id: lt.clone(),
            tariff_rule_id: rule_id.clone(),
            actor_id: ACTOR_ID.to_string(),
            actor_name: ACTOR_NAME.to_string(),
        })
        .unwrap();

    let result = env.rule_api.delete_rule(COMPANY, &rule_id, ACTOR_ID, ACTOR_NAME);
    match result {
        Err(ApiError::StillReferenced { referenced_by, .. }) => {
            assert!(referenced_by.contains("block"));
        }
        other => panic!("expected StillReferenced, got {:?}", other),
    }
    assert!(env.rule_repo.find_by_id(&rule_id).unwrap().is_some());
}

#[test]
fn test_delete_rule_referenced_by_override_is_refused() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    let rule_id = env.create_rule(&lt, "A1", Some(0.0), Some(10.0), 1000.0);
    env.override_api
        .create_override(plantation_tariff::api::CreateOverrideRequest {
            company_id: COMPANY.to_string(),
            rule_id: rule_id.clone(),
            override_type: "HOLIDAY".to_string(),
            effective_from: Some("2024-12-24".to_string()),
            effective_to: Some("2024-12-26".to_string()),
            rates: RateSet {
                tarif_upah: Some(2000.0),
                ..Default::default()
            },
            notes: None,
            actor_id: ACTOR_ID.to_string(),
            actor_name: ACTOR_NAME.to_string(),
        })
        .unwrap();

    let result = env.rule_api.delete_rule(COMPANY, &rule_id, ACTOR_ID, ACTOR_NAME);
    match result {
        Err(ApiError::StillReferenced { referenced_by, .. }) => {
            assert!(referenced_by.contains("override"));
        }
        other => panic!("expected StillReferenced, got {:?}", other),
    }
}

// ==========================================
// listings
// ==========================================

#[test]
fn test_list_rules_with_filters() {
    let env = ApiTestEnv::new();
    let mineral = env.seed_land_type(COMPANY, "MINERAL");
    let gambut = env.seed_land_type(COMPANY, "GAMBUT");
    env.create_rule(&mineral, "A1", Some(0.0), Some(10.0), 1000.0);
    env.create_rule(&mineral, "A2", Some(10.0), None, 900.0);
    env.create_rule(&gambut, "G1", Some(0.0), None, 1100.0);

    assert_eq!(env.rule_api.list_rules(COMPANY, None, None).unwrap().len(), 3);
    assert_eq!(
        env.rule_api.list_rules(COMPANY, Some("mineral"), None).unwrap().len(),
        2
    );
    assert_eq!(
        env.rule_api.list_rules(COMPANY, None, Some(&gambut)).unwrap().len(),
        1
    );
    assert!(env.rule_api.list_rules("company-2", None, None).unwrap().is_empty());
}

#[test]
fn test_list_land_types_active_only() {
    let env = ApiTestEnv::new();
    let mineral = env.seed_land_type(COMPANY, "MINERAL");
    env.seed_land_type(COMPANY, "GAMBUT");
    env.land_type_repo.deactivate(&mineral).unwrap();

    let listed = env.rule_api.list_land_types(COMPANY).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].code, "GAMBUT");
}

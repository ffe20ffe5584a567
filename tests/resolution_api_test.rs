// ==========================================
// ResolutionApi integration tests
// ==========================================
// Coverage:
// 1. Block-path resolution with and without a covering override
// 2. Weight-path tier lookup, boundary and fallback behavior
// 3. Scope and unassigned-block failures
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use plantation_tariff::api::{ApiError, AssignBlockRuleRequest, CreateOverrideRequest};
use plantation_tariff::RateSet;

/// Rule [0, 20) with tarif_upah=1000 and a HOLIDAY override
/// 2024-12-24..2024-12-26 setting tarif_upah=2000
fn seed_holiday_scenario(env: &ApiTestEnv) -> (String, String) {
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    let rule_id = env.create_rule(&lt, "A1", Some(0.0), Some(20.0), 1000.0);
    env.override_api
        .create_override(CreateOverrideRequest {
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
    (lt, rule_id)
}

#[test]
fn test_resolve_for_block_inside_and_outside_window() {
    let env = ApiTestEnv::new();
    let (lt, rule_id) = seed_holiday_scenario(&env);
    env.seed_block(COMPANY, "b1", "B-01");
    env.block_api
        .assign_rule(AssignBlockRuleRequest {
            company_id: COMPANY.to_string(),
            block_id: "b1".to_string(),
            land_type_id: lt,
            tariff_rule_id: rule_id.clone(),
            actor_id: ACTOR_ID.to_string(),
            actor_name: ACTOR_NAME.to_string(),
        })
        .unwrap();

    // 25th: inside the holiday window, wage replaced, rest inherited
    let inside = env
        .resolution_api
        .resolve_for_block(COMPANY, "b1", "2024-12-25")
        .expect("resolution should succeed");
    assert_eq!(inside.rule_id, rule_id);
    assert_eq!(inside.rates.tarif_upah, Some(2000.0));
    assert_eq!(inside.rates.basis, Some(1400.0));
    assert_eq!(inside.override_type.as_deref(), Some("HOLIDAY"));
    assert_eq!(inside.perlakuan, "MINERAL - A1");

    // 27th: back to the base rule
    let outside = env
        .resolution_api
        .resolve_for_block(COMPANY, "b1", "2024-12-27")
        .expect("resolution should succeed");
    assert_eq!(outside.rates.tarif_upah, Some(1000.0));
    assert!(outside.override_id.is_none());
}

#[test]
fn test_resolve_for_block_without_assignment() {
    let env = ApiTestEnv::new();
    env.seed_block(COMPANY, "b1", "B-01");

    let result = env.resolution_api.resolve_for_block(COMPANY, "b1", "2024-12-25");
    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}

#[test]
fn test_resolve_for_block_cross_company() {
    let env = ApiTestEnv::new();
    env.seed_block("company-2", "b9", "B-99");

    let result = env.resolution_api.resolve_for_block(COMPANY, "b9", "2024-12-25");
    assert!(matches!(result, Err(ApiError::CompanyScopeViolation(_))));
}

#[test]
fn test_resolve_for_weight_boundaries() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    env.create_rule(&lt, "A1", Some(0.0), Some(10.0), 1200.0);
    env.create_rule(&lt, "A2", Some(10.0), Some(20.0), 1000.0);
    env.create_rule(&lt, "A3", Some(20.0), None, 900.0);

    // tier min is inclusive, tier max belongs to the next tier
    let at_ten = env
        .resolution_api
        .resolve_for_weight(COMPANY, &lt, 10.0, "2024-06-01")
        .unwrap();
    assert_eq!(at_ten.tarif_code, "A2");

    let below = env
        .resolution_api
        .resolve_for_weight(COMPANY, &lt, 9.99, "2024-06-01")
        .unwrap();
    assert_eq!(below.tarif_code, "A1");

    let heavy = env
        .resolution_api
        .resolve_for_weight(COMPANY, &lt, 55.0, "2024-06-01")
        .unwrap();
    assert_eq!(heavy.tarif_code, "A3");
    assert_eq!(heavy.rates.tarif_upah, Some(900.0));
}

#[test]
fn test_resolve_for_weight_fallback_when_below_all_tiers() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    env.create_rule(&lt, "A1", Some(5.0), Some(10.0), 1200.0);
    env.create_rule(&lt, "A2", Some(10.0), None, 1000.0);

    // nothing contains 2.0; the open-ended top tier is the fallback
    let result = env
        .resolution_api
        .resolve_for_weight(COMPANY, &lt, 2.0, "2024-06-01")
        .unwrap();
    assert_eq!(result.tarif_code, "A2");
}

#[test]
fn test_resolve_for_weight_requires_active_rules() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    let rule_id = env.create_rule(&lt, "A1", Some(0.0), Some(10.0), 1000.0);
    env.rule_api
        .deactivate_rule(COMPANY, &rule_id, ACTOR_ID, ACTOR_NAME)
        .unwrap();

    let result = env.resolution_api.resolve_for_weight(COMPANY, &lt, 5.0, "2024-06-01");
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_resolve_rejects_bad_inputs() {
    let env = ApiTestEnv::new();
    let lt = env.seed_land_type(COMPANY, "MINERAL");
    env.create_rule(&lt, "A1", Some(0.0), None, 1000.0);

    assert!(matches!(
        env.resolution_api.resolve_for_weight(COMPANY, &lt, -1.0, "2024-06-01"),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        env.resolution_api.resolve_for_weight(COMPANY, &lt, 5.0, "06/01/2024"),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_festival_precedence_end_to_end() {
    let env = ApiTestEnv::new();
    let (lt, rule_id) = seed_holiday_scenario(&env);
    // FESTIVAL override covering the same days
    env.override_api
        .create_override(CreateOverrideRequest {
            company_id: COMPANY.to_string(),
            rule_id,
            override_type: "FESTIVAL".to_string(),
            effective_from: Some("2024-12-25".to_string()),
            effective_to: Some("2024-12-25".to_string()),
            rates: RateSet {
                tarif_upah: Some(3000.0),
                ..Default::default()
            },
            notes: None,
            actor_id: ACTOR_ID.to_string(),
            actor_name: ACTOR_NAME.to_string(),
        })
        .unwrap();

    let result = env
        .resolution_api
        .resolve_for_weight(COMPANY, &lt, 5.0, "2024-12-25")
        .unwrap();
    assert_eq!(result.override_type.as_deref(), Some("FESTIVAL"));
    assert_eq!(result.rates.tarif_upah, Some(3000.0));
}

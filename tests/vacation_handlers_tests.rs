use actix_web::{App, http::StatusCode, test, web};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use conges::database::models::{Actor, VacationStatus};
use conges::middleware::RequestIdMiddleware;
use conges::routes;

mod common;
use common::*;

macro_rules! init_app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::new($harness.service.clone()))
                .wrap(RequestIdMiddleware)
                .configure(routes::configure),
        )
        .await
    };
}

// Macro to generate unauthorized access tests
macro_rules! test_unauthorized {
    ($test_name:ident, $method:ident, $uri:expr) => {
        #[actix_web::test]
        async fn $test_name() {
            let harness = TestHarness::new();
            let app = init_app!(harness);

            let req = test::TestRequest::$method().uri($uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    };
}

test_unauthorized!(test_list_vacations_unauthorized, get, "/api/v1/vacations");
test_unauthorized!(test_create_vacation_unauthorized, post, "/api/v1/vacations");
test_unauthorized!(test_get_vacation_unauthorized, get, "/api/v1/vacations/1");
test_unauthorized!(test_delete_vacation_unauthorized, delete, "/api/v1/vacations/1");
test_unauthorized!(test_vacation_stats_unauthorized, get, "/api/v1/vacations/stats");

#[actix_web::test]
async fn test_invalid_token_is_rejected() {
    let harness = TestHarness::new();
    let app = init_app!(harness);

    let req = test::TestRequest::get()
        .uri("/api/v1/vacations")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_health_check() {
    let harness = TestHarness::new();
    let app = init_app!(harness);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-correlation-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_correlation_id_is_echoed() {
    let harness = TestHarness::new();
    let app = init_app!(harness);

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header(("X-Correlation-ID", "trace-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers()
            .get("x-correlation-id")
            .and_then(|v| v.to_str().ok()),
        Some("trace-42")
    );
}

#[actix_web::test]
async fn test_create_vacation_returns_created_request() {
    let harness = TestHarness::new();
    let app = init_app!(harness);

    let req = test::TestRequest::post()
        .uri("/api/v1/vacations")
        .insert_header(("Authorization", bearer_token(Actor::employee(ALICE, TENANT_A))))
        .set_json(json!({
            "employeeId": ALICE,
            "startDate": "2024-03-01T00:00:00.000Z",
            "endDate": "2024-03-01",
            "type": "paid",
            "reason": "Pont",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["duration"], 1);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["type"], "paid");
    assert_eq!(body["data"]["startDate"], "2024-03-01");
}

#[actix_web::test]
async fn test_create_vacation_with_missing_fields_is_bad_request() {
    let harness = TestHarness::new();
    let app = init_app!(harness);

    let req = test::TestRequest::post()
        .uri("/api/v1/vacations")
        .insert_header(("Authorization", bearer_token(Actor::employee(ALICE, TENANT_A))))
        .set_json(json!({ "employeeId": ALICE, "type": "paid" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("startDate"));
}

#[actix_web::test]
async fn test_status_update_flow() {
    let harness = TestHarness::new();
    let seeded = harness.seed_pending(ALICE);
    let app = init_app!(harness);
    let uri = format!("/api/v1/vacations/{}/status", seeded.id);

    // Employees cannot decide on their own requests
    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(("Authorization", bearer_token(Actor::employee(ALICE, TENANT_A))))
        .set_json(json!({ "status": "approved" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(("Authorization", bearer_token(Actor::manager(MANAGER_A, TENANT_A))))
        .set_json(json!({ "status": "archived" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(("Authorization", bearer_token(Actor::manager(MANAGER_A, TENANT_A))))
        .set_json(json!({ "status": "rejected", "comment": "Période chargée" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "rejected");
    assert_eq!(body["data"]["rejectedBy"], MANAGER_A);
    assert_eq!(
        body["data"]["reason"],
        "Congés d'été | Motif de rejet: Période chargée"
    );
    assert_eq!(
        harness.repository.stored(seeded.id).map(|r| r.status),
        Some(VacationStatus::Rejected)
    );
}

#[actix_web::test]
async fn test_get_vacation_across_tenants_is_forbidden() {
    let harness = TestHarness::new();
    let seeded = harness.seed_pending(ALICE);
    let app = init_app!(harness);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/vacations/{}", seeded.id))
        .insert_header(("Authorization", bearer_token(Actor::manager(MANAGER_B, TENANT_B))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/v1/vacations/999")
        .insert_header(("Authorization", bearer_token(Actor::manager(MANAGER_A, TENANT_A))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_list_vacations_with_filters() {
    let harness = TestHarness::new();
    harness.seed_pending(ALICE);
    harness.seed_pending(BOB);
    let app = init_app!(harness);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/vacations?employee_id={}&status=pending", BOB))
        .insert_header(("Authorization", bearer_token(Actor::admin(ADMIN_A, TENANT_A))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["employeeId"], BOB);

    let req = test::TestRequest::get()
        .uri("/api/v1/vacations?status=archived")
        .insert_header(("Authorization", bearer_token(Actor::admin(ADMIN_A, TENANT_A))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_stats_route_is_not_shadowed_by_id_route() {
    let harness = TestHarness::new();
    harness.seed_pending(ALICE);
    let app = init_app!(harness);

    let req = test::TestRequest::get()
        .uri("/api/v1/vacations/stats")
        .insert_header(("Authorization", bearer_token(Actor::employee(ALICE, TENANT_A))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["totalRequests"], 1);
    assert_eq!(body["data"]["byStatus"]["pending"], 1);
}

#[actix_web::test]
async fn test_update_and_delete_own_request() {
    let harness = TestHarness::new();
    let seeded = harness.seed_pending(ALICE);
    let app = init_app!(harness);
    let uri = format!("/api/v1/vacations/{}", seeded.id);
    let alice = bearer_token(Actor::employee(ALICE, TENANT_A));

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(("Authorization", alice.clone()))
        .set_json(json!({ "endDate": "2024-07-03" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["duration"], 3);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(("Authorization", alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(harness.repository.stored(seeded.id), None);
}

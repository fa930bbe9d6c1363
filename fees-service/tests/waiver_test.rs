//! Waiver integration tests for fees-service.

mod common;

use common::{authed, decimal_field, TestApp};
use rust_decimal::Decimal;

fn today_stamp() -> String {
    chrono::Utc::now().date_naive().format("%Y%m%d").to_string()
}

async fn waive(app: &TestApp, role: &str, body: serde_json::Value) -> reqwest::Response {
    let client = reqwest::Client::new();
    authed(client.post(format!("{}/waivers", app.address)), role)
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn admin_can_record_waiver() {
    let app = TestApp::spawn().await;

    let student = app.seed_student(None, None).await;

    let response = waive(
        &app,
        "admin",
        serde_json::json!({
            "student_id": student,
            "amount": "250.00",
            "remarks": "Scholarship adjustment",
        }),
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let waiver: serde_json::Value = response.json().await.expect("Invalid JSON");

    assert_eq!(
        waiver["receipt_number"],
        format!("WVR-{}-0001", today_stamp())
    );
    assert_eq!(waiver["method"], "waiver");
    assert_eq!(decimal_field(&waiver, "/amount_paid"), Decimal::new(25000, 2));

    assert_eq!(app.audit_count("fee_waived").await, 1);

    app.cleanup().await;
}

#[tokio::test]
async fn waivers_share_the_daily_sequence_with_payments() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let student = app.seed_student(None, None).await;
    let stamp = today_stamp();

    let collect = authed(client.post(format!("{}/payments", app.address)), "accountant")
        .json(&serde_json::json!({
            "student_id": student,
            "amount": "300.00",
            "method": "cash",
        }))
        .send()
        .await
        .expect("Failed to collect");
    let payment: serde_json::Value = collect.json().await.expect("Invalid JSON");
    assert_eq!(payment["receipt_number"], format!("RCP-{}-0001", stamp));

    let response = waive(
        &app,
        "admin",
        serde_json::json!({
            "student_id": student,
            "amount": "100.00",
        }),
    )
    .await;
    let waiver: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(waiver["receipt_number"], format!("WVR-{}-0002", stamp));

    app.cleanup().await;
}

#[tokio::test]
async fn non_admin_waiver_is_rejected_and_writes_nothing() {
    let app = TestApp::spawn().await;

    let student = app.seed_student(None, None).await;

    for role in ["accountant", "teacher", "parent"] {
        let response = waive(
            &app,
            role,
            serde_json::json!({
                "student_id": student,
                "amount": "100.00",
            }),
        )
        .await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::FORBIDDEN,
            "Role {} should not be able to waive",
            role
        );
    }

    assert_eq!(app.ledger_count().await, 0);
    assert_eq!(app.audit_count("fee_waived").await, 0);

    app.cleanup().await;
}

#[tokio::test]
async fn waiver_rejects_non_positive_amount() {
    let app = TestApp::spawn().await;

    let student = app.seed_student(None, None).await;

    let response = waive(
        &app,
        "admin",
        serde_json::json!({
            "student_id": student,
            "amount": "0.00",
        }),
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.ledger_count().await, 0);

    app.cleanup().await;
}

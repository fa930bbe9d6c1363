//! Fee structure catalog integration tests for fees-service.

mod common;

use common::{authed, create_fee_structure, decimal_field, TestApp, TEST_CLASS_ID};
use rust_decimal::Decimal;

#[tokio::test]
async fn create_fee_structure_works() {
    let app = TestApp::spawn().await;

    let fee = create_fee_structure(&app, "Annual Tuition", "tuition", "24000.00").await;

    assert_eq!(fee["name"], "Annual Tuition");
    assert_eq!(fee["fee_type"], "tuition");
    assert_eq!(fee["frequency"], "annually");
    assert_eq!(decimal_field(&fee, "/amount"), Decimal::from(24000));
    assert_eq!(fee["is_archived"], false);
    assert!(fee["fee_id"].as_str().is_some());

    app.cleanup().await;
}

#[tokio::test]
async fn create_fee_structure_requires_admin() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let response = authed(client.post(format!("{}/fee-structures", app.address)), "teacher")
        .json(&serde_json::json!({
            "class_id": TEST_CLASS_ID,
            "name": "Lab Fee",
            "fee_type": "other",
            "frequency": "annually",
            "amount": "500.00",
            "due_date": "2026-04-10",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);

    app.cleanup().await;
}

#[tokio::test]
async fn create_fee_structure_rejects_non_positive_amount() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let response = authed(client.post(format!("{}/fee-structures", app.address)), "admin")
        .json(&serde_json::json!({
            "class_id": TEST_CLASS_ID,
            "name": "Broken Fee",
            "fee_type": "exam",
            "frequency": "one_time",
            "amount": "0.00",
            "due_date": "2026-04-10",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    app.cleanup().await;
}

#[tokio::test]
async fn get_fee_structure_works() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let created = create_fee_structure(&app, "Exam Fee", "exam", "200.00").await;
    let fee_id = created["fee_id"].as_str().unwrap();

    let response = authed(
        client.get(format!("{}/fee-structures/{}", app.address, fee_id)),
        "accountant",
    )
    .send()
    .await
    .expect("Failed to execute request");

    assert!(response.status().is_success());
    let fee: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(fee["fee_id"], created["fee_id"]);
    assert_eq!(fee["name"], "Exam Fee");

    app.cleanup().await;
}

#[tokio::test]
async fn get_unknown_fee_structure_returns_not_found() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let response = authed(
        client.get(format!(
            "{}/fee-structures/{}",
            app.address,
            uuid::Uuid::new_v4()
        )),
        "admin",
    )
    .send()
    .await
    .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    app.cleanup().await;
}

#[tokio::test]
async fn list_excludes_archived_by_default() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let keep = create_fee_structure(&app, "Tuition", "tuition", "1000.00").await;
    let archived = create_fee_structure(&app, "Old Fee", "other", "50.00").await;
    let archived_id = archived["fee_id"].as_str().unwrap();

    let response = authed(
        client.delete(format!("{}/fee-structures/{}", app.address, archived_id)),
        "admin",
    )
    .send()
    .await
    .expect("Failed to archive");
    assert!(response.status().is_success());

    let listed: serde_json::Value = authed(
        client.get(format!("{}/fee-structures", app.address)),
        "admin",
    )
    .send()
    .await
    .expect("Failed to list")
    .json()
    .await
    .expect("Invalid JSON");

    let fees = listed.as_array().unwrap();
    assert_eq!(fees.len(), 1);
    assert_eq!(fees[0]["fee_id"], keep["fee_id"]);

    // include_archived shows both
    let listed_all: serde_json::Value = authed(
        client.get(format!(
            "{}/fee-structures?include_archived=true",
            app.address
        )),
        "admin",
    )
    .send()
    .await
    .expect("Failed to list")
    .json()
    .await
    .expect("Invalid JSON");

    assert_eq!(listed_all.as_array().unwrap().len(), 2);

    app.cleanup().await;
}

#[tokio::test]
async fn update_fee_structure_works() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let created = create_fee_structure(&app, "Sports Fee", "sports", "400.00").await;
    let fee_id = created["fee_id"].as_str().unwrap();

    let response = authed(
        client.put(format!("{}/fee-structures/{}", app.address, fee_id)),
        "admin",
    )
    .json(&serde_json::json!({
        "name": "Sports & Games Fee",
        "amount": "450.00",
    }))
    .send()
    .await
    .expect("Failed to execute request");

    assert!(response.status().is_success());
    let updated: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(updated["name"], "Sports & Games Fee");
    assert_eq!(decimal_field(&updated, "/amount"), Decimal::new(45000, 2));

    app.cleanup().await;
}

#[tokio::test]
async fn archived_fee_structure_cannot_be_updated() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let created = create_fee_structure(&app, "Hostel Fee", "hostel", "8000.00").await;
    let fee_id = created["fee_id"].as_str().unwrap();

    let archive = authed(
        client.delete(format!("{}/fee-structures/{}", app.address, fee_id)),
        "admin",
    )
    .send()
    .await
    .expect("Failed to archive");
    let archived: serde_json::Value = archive.json().await.expect("Invalid JSON");
    assert_eq!(archived["is_archived"], true);

    let response = authed(
        client.put(format!("{}/fee-structures/{}", app.address, fee_id)),
        "admin",
    )
    .json(&serde_json::json!({ "amount": "9000.00" }))
    .send()
    .await
    .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    app.cleanup().await;
}

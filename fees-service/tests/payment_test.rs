//! Payment collection integration tests for fees-service.

mod common;

use common::{authed, create_fee_structure, decimal_field, TestApp};
use rust_decimal::Decimal;

fn today_stamp() -> String {
    chrono::Utc::now().date_naive().format("%Y%m%d").to_string()
}

async fn collect(
    app: &TestApp,
    role: &str,
    body: serde_json::Value,
) -> reqwest::Response {
    let client = reqwest::Client::new();
    authed(client.post(format!("{}/payments", app.address)), role)
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn collect_payment_works() {
    let app = TestApp::spawn().await;

    create_fee_structure(&app, "Tuition", "tuition", "1000.00").await;
    let student = app.seed_student(None, None).await;

    let response = collect(
        &app,
        "accountant",
        serde_json::json!({
            "student_id": student,
            "amount": "600.00",
            "method": "cash",
            "remarks": "First installment",
        }),
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let payment: serde_json::Value = response.json().await.expect("Invalid JSON");

    assert_eq!(
        payment["receipt_number"],
        format!("RCP-{}-0001", today_stamp())
    );
    assert_eq!(decimal_field(&payment, "/amount_paid"), Decimal::from(600));
    assert_eq!(payment["method"], "cash");
    assert_eq!(payment["status"], "completed");
    assert_eq!(payment["remarks"], "First installment");

    // The collection is audited
    assert_eq!(app.audit_count("fee_collected").await, 1);

    app.cleanup().await;
}

#[tokio::test]
async fn receipt_numbers_increase_within_the_day() {
    let app = TestApp::spawn().await;

    let student = app.seed_student(None, None).await;
    let stamp = today_stamp();

    for expected_seq in 1..=3 {
        let response = collect(
            &app,
            "accountant",
            serde_json::json!({
                "student_id": student,
                "amount": "100.00",
                "method": "upi",
            }),
        )
        .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let payment: serde_json::Value = response.json().await.expect("Invalid JSON");
        assert_eq!(
            payment["receipt_number"],
            format!("RCP-{}-{:04}", stamp, expected_seq)
        );
    }

    app.cleanup().await;
}

#[tokio::test]
async fn concurrent_collections_mint_unique_receipts() {
    let app = TestApp::spawn().await;

    let student = app.seed_student(None, None).await;
    let address = app.address.clone();

    let mut join_set = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let address = address.clone();
        join_set.spawn(async move {
            let client = reqwest::Client::new();
            let response = authed(client.post(format!("{}/payments", address)), "accountant")
                .json(&serde_json::json!({
                    "student_id": student,
                    "amount": "50.00",
                    "method": "cash",
                }))
                .send()
                .await
                .expect("Failed to execute request");
            assert_eq!(response.status(), reqwest::StatusCode::CREATED);
            let payment: serde_json::Value = response.json().await.expect("Invalid JSON");
            payment["receipt_number"].as_str().unwrap().to_string()
        });
    }

    let mut receipts = Vec::new();
    while let Some(result) = join_set.join_next().await {
        receipts.push(result.expect("Task panicked"));
    }

    let unique: std::collections::HashSet<_> = receipts.iter().collect();
    assert_eq!(unique.len(), receipts.len(), "Duplicate receipt numbers: {:?}", receipts);

    app.cleanup().await;
}

#[tokio::test]
async fn collection_requires_cashier_role() {
    let app = TestApp::spawn().await;

    let student = app.seed_student(None, None).await;

    let response = collect(
        &app,
        "teacher",
        serde_json::json!({
            "student_id": student,
            "amount": "100.00",
            "method": "cash",
        }),
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    assert_eq!(app.ledger_count().await, 0);

    app.cleanup().await;
}

#[tokio::test]
async fn collection_rejects_unknown_student() {
    let app = TestApp::spawn().await;

    let response = collect(
        &app,
        "accountant",
        serde_json::json!({
            "student_id": uuid::Uuid::new_v4(),
            "amount": "100.00",
            "method": "cash",
        }),
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(app.ledger_count().await, 0);

    app.cleanup().await;
}

#[tokio::test]
async fn collection_rejects_non_positive_amount() {
    let app = TestApp::spawn().await;

    let student = app.seed_student(None, None).await;

    let response = collect(
        &app,
        "accountant",
        serde_json::json!({
            "student_id": student,
            "amount": "-10.00",
            "method": "cash",
        }),
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.ledger_count().await, 0);

    app.cleanup().await;
}

#[tokio::test]
async fn waiver_method_is_rejected_on_payment_endpoint() {
    let app = TestApp::spawn().await;

    let student = app.seed_student(None, None).await;

    let response = collect(
        &app,
        "admin",
        serde_json::json!({
            "student_id": student,
            "amount": "100.00",
            "method": "waiver",
        }),
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(app.ledger_count().await, 0);

    app.cleanup().await;
}

#[tokio::test]
async fn list_payments_filters_by_student() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let first = app.seed_student(None, None).await;
    let second = app.seed_student(None, None).await;

    for student in [first, first, second] {
        let response = collect(
            &app,
            "accountant",
            serde_json::json!({
                "student_id": student,
                "amount": "100.00",
                "method": "cash",
            }),
        )
        .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }

    let listed: serde_json::Value = authed(
        client.get(format!("{}/payments?student_id={}", app.address, first)),
        "accountant",
    )
    .send()
    .await
    .expect("Failed to list")
    .json()
    .await
    .expect("Invalid JSON");

    let payments = listed.as_array().unwrap();
    assert_eq!(payments.len(), 2);
    for payment in payments {
        assert_eq!(payment["student_id"].as_str().unwrap(), first.to_string());
    }

    app.cleanup().await;
}

//! API Integration Tests

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use total_economy::{EconomyConfig, ResultType};
use uuid::Uuid;

mod common;

use common::{decimal, send, setup_test_app, TestApp, ADMIN_KEY};

async fn create_account(app: &TestApp, name: &str) -> Uuid {
    let user_id = Uuid::new_v4();
    let (status, body) = send(
        app,
        "POST",
        "/accounts",
        Some(json!({ "user_id": user_id, "display_name": name })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "account creation failed: {body}");
    user_id
}

async fn balance_of(app: &TestApp, user_id: Uuid) -> Value {
    let (status, body) = send(app, "GET", &format!("/accounts/{user_id}/balance"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn test_create_and_get_account() {
    let app = setup_test_app(EconomyConfig::default()).await;
    let user_id = create_account(&app, "Alice").await;

    let (status, body) = send(&app, "GET", &format!("/accounts/{user_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Alice");
    assert_eq!(body["identifier"], user_id.to_string());
    assert_eq!(body["balances"][0]["currency"], "Dollar");
    assert_eq!(decimal(&body["balances"][0]["balance"]), dec!(100.00));
    assert_eq!(body["balances"][0]["formatted"], "$100.00");

    // Duplicate creation conflicts
    let (status, body) = send(
        &app,
        "POST",
        "/accounts",
        Some(json!({ "user_id": user_id })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "account_exists");
}

#[tokio::test]
async fn test_rejected_create_keeps_display_name() {
    let app = setup_test_app(EconomyConfig::default()).await;
    let user_id = create_account(&app, "Alice").await;

    let (status, _) = send(
        &app,
        "POST",
        "/accounts",
        Some(json!({ "user_id": user_id, "display_name": "Mallory" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", &format!("/accounts/{user_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Alice");
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let app = setup_test_app(EconomyConfig::default()).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/accounts/{}/deposit", Uuid::new_v4()),
        Some(json!({ "amount": "5" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "account_not_found");
}

#[tokio::test]
async fn test_deposit_and_withdraw_flow() {
    let app = setup_test_app(EconomyConfig::default()).await;
    let user_id = create_account(&app, "Alice").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/accounts/{user_id}/deposit"),
        Some(json!({ "amount": "10.129" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "SUCCESS");
    assert_eq!(body["transaction_type"], "DEPOSIT");
    assert_eq!(decimal(&balance_of(&app, user_id).await["balance"]), dec!(110.12));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/accounts/{user_id}/withdraw"),
        Some(json!({ "amount": "30.12", "currency": "dollars" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "SUCCESS");
    assert_eq!(body["transaction_type"], "WITHDRAW");
    assert_eq!(decimal(&balance_of(&app, user_id).await["balance"]), dec!(80.00));

    // Overdraw leaves the balance alone
    let (status, body) = send(
        &app,
        "POST",
        &format!("/accounts/{user_id}/withdraw"),
        Some(json!({ "amount": "80.01" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "ACCOUNT_NO_FUNDS");
    assert_eq!(body["transaction_type"], "DEPOSIT");
    assert_eq!(decimal(&balance_of(&app, user_id).await["balance"]), dec!(80.00));
}

#[tokio::test]
async fn test_deposit_is_capped() {
    let app = setup_test_app(EconomyConfig {
        money_cap_enabled: true,
        money_cap: dec!(150.00),
        ..EconomyConfig::default()
    })
    .await;
    let user_id = create_account(&app, "Alice").await;

    let (_, body) = send(
        &app,
        "POST",
        &format!("/accounts/{user_id}/deposit"),
        Some(json!({ "amount": "500" })),
        None,
    )
    .await;
    assert_eq!(body["result"], "SUCCESS");
    assert_eq!(decimal(&balance_of(&app, user_id).await["balance"]), dec!(150.00));
}

#[tokio::test]
async fn test_invalid_amount_and_currency() {
    let app = setup_test_app(EconomyConfig::default()).await;
    let user_id = create_account(&app, "Alice").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/accounts/{user_id}/deposit"),
        Some(json!({ "amount": "-5" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_amount");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/accounts/{user_id}/deposit"),
        Some(json!({ "amount": "5", "currency": "Euro" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "unknown_currency");

    assert_eq!(decimal(&balance_of(&app, user_id).await["balance"]), dec!(100.00));
}

#[tokio::test]
async fn test_transfer_e2e() {
    let app = setup_test_app(EconomyConfig::default()).await;
    let alice = create_account(&app, "Alice").await;
    let bob = create_account(&app, "Bob").await;
    let mut events = app.economy.subscribe();

    let (status, body) = send(
        &app,
        "POST",
        "/transfers",
        Some(json!({
            "from_user_id": alice,
            "to_user_id": bob,
            "amount": "25.5",
            "contexts": [{ "key": "world", "value": "overworld" }]
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "SUCCESS");
    assert_eq!(body["transaction_type"], "TRANSFER");
    assert_eq!(body["account_id"], alice.to_string());
    assert_eq!(body["to_account_id"], bob.to_string());
    assert_eq!(body["contexts"][0]["key"], "world");

    assert_eq!(decimal(&balance_of(&app, alice).await["balance"]), dec!(74.50));
    assert_eq!(decimal(&balance_of(&app, bob).await["balance"]), dec!(125.50));

    // Withdraw leg, deposit leg, then the transfer itself
    let kinds: Vec<&'static str> = vec![
        events.recv().await.unwrap().event_type(),
        events.recv().await.unwrap().event_type(),
        events.recv().await.unwrap().event_type(),
    ];
    assert_eq!(kinds, vec!["Transaction", "Transaction", "Transfer"]);
}

#[tokio::test]
async fn test_transfer_without_funds_moves_nothing() {
    let app = setup_test_app(EconomyConfig::default()).await;
    let alice = create_account(&app, "Alice").await;
    let bob = create_account(&app, "Bob").await;

    let (status, body) = send(
        &app,
        "POST",
        "/transfers",
        Some(json!({ "from_user_id": alice, "to_user_id": bob, "amount": "100.01" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "ACCOUNT_NO_FUNDS");

    assert_eq!(decimal(&balance_of(&app, alice).await["balance"]), dec!(100.00));
    assert_eq!(decimal(&balance_of(&app, bob).await["balance"]), dec!(100.00));
}

#[tokio::test]
async fn test_transfer_rejects_unknown_or_same_account() {
    let app = setup_test_app(EconomyConfig::default()).await;
    let alice = create_account(&app, "Alice").await;

    let (status, _) = send(
        &app,
        "POST",
        "/transfers",
        Some(json!({ "from_user_id": alice, "to_user_id": Uuid::new_v4(), "amount": "1" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        "/transfers",
        Some(json!({ "from_user_id": alice, "to_user_id": alice, "amount": "1" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_request");

    assert_eq!(decimal(&balance_of(&app, alice).await["balance"]), dec!(100.00));
}

#[tokio::test]
async fn test_admin_routes_require_key() {
    let app = setup_test_app(EconomyConfig::default()).await;
    let user_id = create_account(&app, "Alice").await;
    let uri = format!("/accounts/{user_id}/set-balance");

    let (status, body) = send(&app, "POST", &uri, Some(json!({ "amount": "7" })), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "missing_api_key");

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "amount": "7" })),
        Some("wrong_key"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "invalid_api_key");

    assert_eq!(decimal(&balance_of(&app, user_id).await["balance"]), dec!(100.00));
}

#[tokio::test]
async fn test_set_and_reset_balance() {
    let app = setup_test_app(EconomyConfig::default()).await;
    let user_id = create_account(&app, "Alice").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/accounts/{user_id}/set-balance"),
        Some(json!({ "amount": "42.999" })),
        Some(ADMIN_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "SUCCESS");
    assert_eq!(decimal(&balance_of(&app, user_id).await["balance"]), dec!(42.99));

    // Reset works without a body
    let (status, body) = send(
        &app,
        "POST",
        &format!("/accounts/{user_id}/reset"),
        None,
        Some(ADMIN_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "SUCCESS");
    assert!(body["contexts"].as_array().unwrap().is_empty());

    let balance = balance_of(&app, user_id).await;
    assert_eq!(balance["has_balance"], true);
    assert_eq!(decimal(&balance["balance"]), dec!(0.00));
}

#[tokio::test]
async fn test_reset_all_reports_failure_without_mutation() {
    let app = setup_test_app(EconomyConfig::default()).await;
    let user_id = create_account(&app, "Alice").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/accounts/{user_id}/reset-all"),
        None,
        Some(ADMIN_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Dollar"]["result"], "FAILED");
    assert_eq!(body["Dollar"]["transaction_type"], "WITHDRAW");
    assert_eq!(decimal(&body["Dollar"]["amount"]), dec!(0));

    assert_eq!(decimal(&balance_of(&app, user_id).await["balance"]), dec!(100.00));
}

#[tokio::test]
async fn test_balances_survive_reopen() {
    let app = setup_test_app(EconomyConfig::default()).await;
    let user_id = create_account(&app, "Alice").await;

    send(
        &app,
        "POST",
        &format!("/accounts/{user_id}/deposit"),
        Some(json!({ "amount": "0.5" })),
        None,
    )
    .await;

    let reopened = total_economy::EconomyService::open(
        app.dir.path().join("accounts.json"),
        EconomyConfig::default(),
        std::sync::Arc::new(total_economy::InMemoryProfiles::new()),
    )
    .await
    .unwrap();

    let account = reopened.account(user_id).await.unwrap();
    let currency = reopened.default_currency().clone();
    assert_eq!(
        account.get_balance(&currency, &account.active_contexts()).await,
        dec!(100.50)
    );
    assert_eq!(
        account.deposit(&currency, dec!(1), &account.active_contexts()).await.result(),
        ResultType::Success
    );
}

//! API Routes
//!
//! HTTP endpoint definitions. Balance operations always answer 200 with
//! the transaction result; its `result` field carries the outcome.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::{Amount, ContextSet, DomainError, TransactionResult, TransferResult};
use crate::economy::{Account, EconomyService};
use crate::error::{AppError, AppResult};

use super::middleware::admin_key_middleware;
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub currency: String,
    pub balance: Decimal,
    pub formatted: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub user_id: Uuid,
    pub identifier: String,
    pub display_name: String,
    pub balances: Vec<BalanceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CurrencyQuery {
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub user_id: Uuid,
    pub currency: String,
    pub has_balance: bool,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AmountRequest {
    pub amount: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub contexts: ContextSet,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub contexts: ContextSet,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub amount: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub contexts: ContextSet,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router(state: &AppState) -> Router<AppState> {
    let admin_routes = Router::new()
        .route("/accounts/:user_id/set-balance", post(set_balance))
        .route("/accounts/:user_id/reset", post(reset_balance))
        .route("/accounts/:user_id/reset-all", post(reset_balances))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_key_middleware,
        ));

    Router::new()
        .route("/accounts", post(create_account))
        .route("/accounts/:user_id", get(get_account))
        .route("/accounts/:user_id/balance", get(get_balance))
        .route("/accounts/:user_id/deposit", post(deposit))
        .route("/accounts/:user_id/withdraw", post(withdraw))
        .route("/transfers", post(transfer))
        .merge(admin_routes)
}

async fn require_account(economy: &EconomyService, user_id: Uuid) -> AppResult<Account> {
    economy
        .account(user_id)
        .await
        .ok_or_else(|| DomainError::AccountNotFound(user_id).into())
}

fn parse_amount(raw: &str) -> AppResult<Decimal> {
    let amount: Amount = raw.parse().map_err(DomainError::from)?;
    Ok(amount.value())
}

// =========================================================================
// POST /accounts
// =========================================================================

async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    let account = state.economy.create_account(request.user_id).await?;

    if let Some(name) = request.display_name {
        state.profiles.register(request.user_id, name).await;
    }

    Ok((
        StatusCode::CREATED,
        Json(account_response(&state.economy, &account).await),
    ))
}

// =========================================================================
// GET /accounts/:user_id
// =========================================================================

async fn get_account(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<AccountResponse>> {
    let account = require_account(&state.economy, user_id).await?;
    Ok(Json(account_response(&state.economy, &account).await))
}

async fn account_response(economy: &EconomyService, account: &Account) -> AccountResponse {
    let contexts = account.active_contexts();
    let mut balances = Vec::new();

    for currency in economy.currencies() {
        if account.has_balance(currency, &contexts).await {
            let balance = account.get_balance(currency, &contexts).await;
            balances.push(BalanceEntry {
                currency: currency.display_name().to_string(),
                balance,
                formatted: currency.format(balance),
            });
        }
    }

    AccountResponse {
        user_id: account.unique_id(),
        identifier: account.identifier(),
        display_name: account.display_name().await,
        balances,
    }
}

// =========================================================================
// GET /accounts/:user_id/balance
// =========================================================================

async fn get_balance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<CurrencyQuery>,
) -> AppResult<Json<BalanceResponse>> {
    let account = require_account(&state.economy, user_id).await?;
    let currency = state.economy.resolve_currency(query.currency.as_deref())?;
    let contexts = account.active_contexts();

    Ok(Json(BalanceResponse {
        user_id,
        currency: currency.display_name().to_string(),
        has_balance: account.has_balance(currency, &contexts).await,
        balance: account.get_balance(currency, &contexts).await,
    }))
}

// =========================================================================
// POST /accounts/:user_id/set-balance
// =========================================================================

async fn set_balance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AmountRequest>,
) -> AppResult<Json<TransactionResult>> {
    let account = require_account(&state.economy, user_id).await?;
    let currency = state.economy.resolve_currency(request.currency.as_deref())?;
    let amount = parse_amount(&request.amount)?;

    Ok(Json(
        account
            .set_balance(currency, amount, &request.contexts)
            .await,
    ))
}

// =========================================================================
// POST /accounts/:user_id/deposit
// =========================================================================

async fn deposit(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AmountRequest>,
) -> AppResult<Json<TransactionResult>> {
    let account = require_account(&state.economy, user_id).await?;
    let currency = state.economy.resolve_currency(request.currency.as_deref())?;
    let amount = parse_amount(&request.amount)?;

    Ok(Json(account.deposit(currency, amount, &request.contexts).await))
}

// =========================================================================
// POST /accounts/:user_id/withdraw
// =========================================================================

async fn withdraw(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AmountRequest>,
) -> AppResult<Json<TransactionResult>> {
    let account = require_account(&state.economy, user_id).await?;
    let currency = state.economy.resolve_currency(request.currency.as_deref())?;
    let amount = parse_amount(&request.amount)?;

    Ok(Json(account.withdraw(currency, amount, &request.contexts).await))
}

// =========================================================================
// POST /accounts/:user_id/reset
// =========================================================================

async fn reset_balance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    request: Option<Json<ResetRequest>>,
) -> AppResult<Json<TransactionResult>> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    let account = require_account(&state.economy, user_id).await?;
    let currency = state.economy.resolve_currency(request.currency.as_deref())?;

    Ok(Json(account.reset_balance(currency, &request.contexts).await))
}

// =========================================================================
// POST /accounts/:user_id/reset-all
// =========================================================================

async fn reset_balances(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    request: Option<Json<ResetRequest>>,
) -> AppResult<Json<BTreeMap<String, TransactionResult>>> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    let account = require_account(&state.economy, user_id).await?;

    let results = account
        .reset_balances(&request.contexts)
        .into_iter()
        .map(|(currency, result)| (currency.display_name().to_string(), result))
        .collect();

    Ok(Json(results))
}

// =========================================================================
// POST /transfers
// =========================================================================

async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> AppResult<Json<TransferResult>> {
    let from = require_account(&state.economy, request.from_user_id).await?;
    let to = require_account(&state.economy, request.to_user_id).await?;
    let currency = state.economy.resolve_currency(request.currency.as_deref())?;
    let amount = parse_amount(&request.amount)?;

    if request.from_user_id == request.to_user_id {
        return Err(AppError::InvalidRequest(
            "Cannot transfer to the same account".to_string(),
        ));
    }

    Ok(Json(
        from.transfer(&to, currency, amount, &request.contexts)
            .await,
    ))
}

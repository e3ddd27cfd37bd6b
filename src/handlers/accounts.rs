// src/handlers/accounts.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    models::account::{
        AccountResponse, BalancePayload, CreateAccountPayload, UpdateAccountPayload,
    },
};

// POST /myAccounts/{my_id}/accounts
#[utoipa::path(
    post,
    path = "/myAccounts/{my_id}/accounts",
    tag = "Accounts",
    params(("my_id" = i64, Path, description = "ID do cliente dono")),
    request_body = CreateAccountPayload,
    responses(
        (status = 201, description = "Conta criada", body = AccountResponse),
        (status = 400, description = "Tipo inválido ou não permitido para o cliente"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 422, description = "Clientes ADMIN não têm contas")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_account(
    State(app_state): State<AppState>,
    Path(my_id): Path<i64>,
    Json(payload): Json<CreateAccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    let account = app_state.account_service.create_owned(my_id, payload).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

// GET /myAccounts/{my_id}/accounts
#[utoipa::path(
    get,
    path = "/myAccounts/{my_id}/accounts",
    tag = "Accounts",
    params(("my_id" = i64, Path, description = "ID do cliente dono")),
    responses(
        (status = 200, description = "Contas ativas do cliente", body = Vec<AccountResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_accounts(
    State(app_state): State<AppState>,
    Path(my_id): Path<i64>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = app_state.account_service.list_owned(my_id).await?;
    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

// GET /myAccounts/{my_id}/accounts/{account_id}
#[utoipa::path(
    get,
    path = "/myAccounts/{my_id}/accounts/{account_id}",
    tag = "Accounts",
    params(
        ("my_id" = i64, Path, description = "ID do cliente dono"),
        ("account_id" = i64, Path, description = "ID da conta")
    ),
    responses(
        (status = 200, description = "Conta encontrada (ativa ou não)", body = AccountResponse),
        (status = 404, description = "Conta não encontrada para esse dono")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_account(
    State(app_state): State<AppState>,
    Path((my_id, account_id)): Path<(i64, i64)>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = app_state.account_service.find_owned(my_id, account_id).await?;
    Ok(Json(AccountResponse::from(account)))
}

// PUT /myAccounts/{my_id}/accounts/{account_id}
#[utoipa::path(
    put,
    path = "/myAccounts/{my_id}/accounts/{account_id}",
    tag = "Accounts",
    params(
        ("my_id" = i64, Path, description = "ID do cliente dono"),
        ("account_id" = i64, Path, description = "ID da conta")
    ),
    request_body = UpdateAccountPayload,
    responses(
        (status = 200, description = "Conta atualizada", body = AccountResponse),
        (status = 400, description = "Campo imutável no corpo ou tipo não permitido"),
        (status = 404, description = "Conta não encontrada para esse dono")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_account(
    State(app_state): State<AppState>,
    Path((my_id, account_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateAccountPayload>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = app_state
        .account_service
        .update_owned(my_id, account_id, payload)
        .await?;
    Ok(Json(AccountResponse::from(account)))
}

// DELETE /myAccounts/{my_id}/accounts/{account_id} (soft delete)
#[utoipa::path(
    delete,
    path = "/myAccounts/{my_id}/accounts/{account_id}",
    tag = "Accounts",
    params(
        ("my_id" = i64, Path, description = "ID do cliente dono"),
        ("account_id" = i64, Path, description = "ID da conta")
    ),
    responses(
        (status = 200, description = "Conta desativada"),
        (status = 404, description = "Conta não encontrada ou já desativada")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_account(
    State(app_state): State<AppState>,
    Path((my_id, account_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .account_service
        .delete_owned(my_id, account_id)
        .await?;
    Ok(Json(json!({ "message": format!("Account {account_id} deleted") })))
}

// GET /accounts/number/{number} (consulta administrativa)
#[utoipa::path(
    get,
    path = "/accounts/number/{number}",
    tag = "Accounts",
    params(("number" = String, Path, description = "Número da conta (NNNNN-D)")),
    responses(
        (status = 200, description = "Conta ativa encontrada", body = AccountResponse),
        (status = 403, description = "Apenas ADMIN"),
        (status = 404, description = "Conta não encontrada")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_account_by_number(
    State(app_state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = app_state.account_service.find_by_number(&number).await?;
    Ok(Json(AccountResponse::from(account)))
}

// PUT /accounts/{account_id}/balance (ajuste administrativo)
#[utoipa::path(
    put,
    path = "/accounts/{account_id}/balance",
    tag = "Accounts",
    params(("account_id" = i64, Path, description = "ID da conta")),
    request_body = BalancePayload,
    responses(
        (status = 200, description = "Saldo substituído"),
        (status = 403, description = "Apenas ADMIN"),
        (status = 404, description = "Conta não encontrada")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_balance(
    State(app_state): State<AppState>,
    Path(account_id): Path<i64>,
    Json(payload): Json<BalancePayload>,
) -> Result<impl IntoResponse, AppError> {
    let account = app_state
        .account_service
        .change_balance(account_id, payload.balance)
        .await?;
    Ok(Json(json!({
        "message": "Balance updated successfully",
        "account": AccountResponse::from(account)
    })))
}

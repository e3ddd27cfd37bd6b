// src/handlers/businesses.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::customer::{BusinessResponse, CreateBusinessPayload, UpdateBusinessPayload},
};

// POST /businesses (rota pública de cadastro)
#[utoipa::path(
    post,
    path = "/businesses",
    tag = "Businesses",
    request_body = CreateBusinessPayload,
    responses(
        (status = 201, description = "Pessoa jurídica criada", body = BusinessResponse),
        (status = 400, description = "Dados inválidos ou e-mail/CNPJ já em uso")
    )
)]
pub async fn create_business(
    State(app_state): State<AppState>,
    Json(mut payload): Json<CreateBusinessPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.normalize();
    payload.validate().map_err(AppError::ValidationError)?;

    let business = app_state.customer_service.create_business(payload).await?;
    Ok((StatusCode::CREATED, Json(business)))
}

// GET /businesses
#[utoipa::path(
    get,
    path = "/businesses",
    tag = "Businesses",
    responses(
        (status = 200, description = "Lista de pessoas jurídicas", body = Vec<BusinessResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_businesses(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<BusinessResponse>>, AppError> {
    let businesses = app_state.customer_service.list_businesses().await?;
    Ok(Json(businesses))
}

// GET /businesses/{id}
#[utoipa::path(
    get,
    path = "/businesses/{id}",
    tag = "Businesses",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Pessoa jurídica encontrada", body = BusinessResponse),
        (status = 400, description = "O cliente não é BUSINESS"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_business(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BusinessResponse>, AppError> {
    let business = app_state.customer_service.find_business(id).await?;
    Ok(Json(business))
}

// PUT /businesses/{id}
#[utoipa::path(
    put,
    path = "/businesses/{id}",
    tag = "Businesses",
    params(("id" = i64, Path, description = "ID do cliente")),
    request_body = UpdateBusinessPayload,
    responses(
        (status = 200, description = "Pessoa jurídica atualizada", body = BusinessResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_business(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<UpdateBusinessPayload>,
) -> Result<Json<BusinessResponse>, AppError> {
    payload.normalize();
    payload.validate().map_err(AppError::ValidationError)?;

    let business = app_state
        .customer_service
        .update_business(id, payload)
        .await?;
    Ok(Json(business))
}

// DELETE /businesses/{id} (hard delete, somente ADMIN)
#[utoipa::path(
    delete,
    path = "/businesses/{id}",
    tag = "Businesses",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Pessoa jurídica removida em definitivo"),
        (status = 403, description = "Apenas ADMIN"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_business(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.customer_service.delete_business(id).await?;
    Ok(Json(json!({ "message": format!("ID {id} deleted") })))
}

// src/handlers/persons.rs

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
    models::customer::{CreatePersonPayload, PersonResponse, UpdatePersonPayload},
};

// POST /persons (rota pública de cadastro)
#[utoipa::path(
    post,
    path = "/persons",
    tag = "Persons",
    request_body = CreatePersonPayload,
    responses(
        (status = 201, description = "Pessoa física criada", body = PersonResponse),
        (status = 400, description = "Dados inválidos ou e-mail/CPF já em uso")
    )
)]
pub async fn create_person(
    State(app_state): State<AppState>,
    Json(mut payload): Json<CreatePersonPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.normalize();
    payload.validate().map_err(AppError::ValidationError)?;

    let person = app_state.customer_service.create_person(payload).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

// GET /persons
#[utoipa::path(
    get,
    path = "/persons",
    tag = "Persons",
    responses(
        (status = 200, description = "Lista de pessoas físicas", body = Vec<PersonResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_persons(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<PersonResponse>>, AppError> {
    let persons = app_state.customer_service.list_persons().await?;
    Ok(Json(persons))
}

// GET /persons/{id}
#[utoipa::path(
    get,
    path = "/persons/{id}",
    tag = "Persons",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Pessoa física encontrada", body = PersonResponse),
        (status = 400, description = "O cliente não é PERSON"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_person(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PersonResponse>, AppError> {
    let person = app_state.customer_service.find_person(id).await?;
    Ok(Json(person))
}

// PUT /persons/{id}
#[utoipa::path(
    put,
    path = "/persons/{id}",
    tag = "Persons",
    params(("id" = i64, Path, description = "ID do cliente")),
    request_body = UpdatePersonPayload,
    responses(
        (status = 200, description = "Pessoa física atualizada", body = PersonResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_person(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<UpdatePersonPayload>,
) -> Result<Json<PersonResponse>, AppError> {
    payload.normalize();
    payload.validate().map_err(AppError::ValidationError)?;

    let person = app_state.customer_service.update_person(id, payload).await?;
    Ok(Json(person))
}

// DELETE /persons/{id} (hard delete, somente ADMIN)
#[utoipa::path(
    delete,
    path = "/persons/{id}",
    tag = "Persons",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Pessoa física removida em definitivo"),
        (status = 403, description = "Apenas ADMIN"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_person(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.customer_service.delete_person(id).await?;
    Ok(Json(json!({ "message": format!("ID {id} deleted") })))
}

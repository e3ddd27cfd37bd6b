// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::customer::CustomerType;

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (ID do cliente, como string)
    pub email: String,
    pub role: String,
    pub iss: String,
    pub iat: usize, // Issued At (quando o token foi criado)
    pub exp: usize, // Expiration time (quando o token expira)
}

// Identidade autenticada extraída do token e carregada nas extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub customer_type: CustomerType,
    pub email: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "email must be valid"))]
    #[schema(example = "maria@email.com")]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: i64,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    pub name: String,
    pub email: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    pub expires_in: u64,
    pub user: LoginUser,
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::customer::CustomerType;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Cada variante carrega o status HTTP que ela produz no `IntoResponse`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Validação de domínio fora do derive (ex.: tipo de conta vazio)
    #[error("{0}")]
    InvalidField(String),

    #[error("{0} already in use")]
    DuplicateResource(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Customer is not of type {0}")]
    TypeMismatch(CustomerType),

    #[error("{0}")]
    PolicyViolation(String),

    // ADMIN é categoricamente inelegível para contas (422, não 400)
    #[error("Customers of type ADMIN cannot have accounts")]
    InvalidCustomerType,

    #[error("Unsupported customer type: {0}")]
    UnsupportedCustomerType(String),

    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    ResourceExhausted(&'static str),

    #[error("{0}")]
    OperationNotSupported(&'static str),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Status HTTP que a variante produz na borda.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidField(_)
            | AppError::DuplicateResource(_)
            | AppError::TypeMismatch(_)
            | AppError::PolicyViolation(_)
            | AppError::UnsupportedCustomerType(_)
            | AppError::OperationNotSupported(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidCustomerType => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::ResourceExhausted(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Retorna todos os detalhes da validação, campo a campo.
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": "Validation error",
                "details": details,
            }));
            return (status, body).into_response();
        }

        // Erros 5xx não vazam detalhe interno; o log fica com a mensagem completa.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            match &self {
                AppError::ResourceExhausted(msg) => {
                    tracing::error!("Recurso esgotado: {}", msg);
                    (*msg).to_string()
                }
                e => {
                    tracing::error!("Erro Interno do Servidor: {}", e);
                    "An unexpected error occurred".to_string()
                }
            }
        } else {
            self.to_string()
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

// Converte violação de chave única do Postgres em erro tipado de duplicidade.
pub fn map_unique_violation(e: sqlx::Error, field: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::DuplicateResource(field);
        }
    }
    AppError::DatabaseError(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400() {
        let err = AppError::InvalidField("Account type is required".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = AppError::DuplicateResource("email");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = AppError::TypeMismatch(CustomerType::Person);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn admin_account_case_is_422_not_400() {
        assert_eq!(
            AppError::InvalidCustomerType.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::UnsupportedCustomerType("ALIEN".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn auth_errors_split_401_403() {
        assert_eq!(
            AppError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn exhausted_retries_surface_as_500() {
        let err = AppError::ResourceExhausted("Could not generate a unique account number");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn soft_delete_on_customer_is_400() {
        let err = AppError::OperationNotSupported("Soft delete is not supported for Customer");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}

// src/middleware/auth.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{common::error::AppError, config::AppState};

// O middleware em si: valida o Bearer token e insere a identidade
// nos "extensions" da requisição para os guards e handlers seguintes.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::Unauthenticated)?;
    let user = app_state.auth_service.decode_token(bearer.token())?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

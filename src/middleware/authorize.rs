// src/middleware/authorize.rs

use std::collections::HashMap;

use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::AppError,
    models::{auth::AuthUser, customer::CustomerType},
};

/// Regras de acesso aplicadas por rota, depois da autenticação.
#[derive(Debug, Clone, Copy)]
pub enum AccessRule {
    /// O dono do recurso (id do path) ou qualquer ADMIN.
    SelfOrAdmin,
    AdminOnly,
    RoleIn(&'static [CustomerType]),
}

// Decisão pura, sem tocar na requisição. ADMIN passa em SelfOrAdmin
// mesmo sem ser o dono.
pub fn allow(caller: &AuthUser, owner: Option<i64>, rule: AccessRule) -> Result<(), AppError> {
    match rule {
        AccessRule::AdminOnly => {
            if caller.customer_type == CustomerType::Admin {
                Ok(())
            } else {
                Err(AppError::Forbidden)
            }
        }
        AccessRule::RoleIn(roles) => {
            if roles.contains(&caller.customer_type) {
                Ok(())
            } else {
                Err(AppError::Forbidden)
            }
        }
        AccessRule::SelfOrAdmin => {
            if caller.customer_type == CustomerType::Admin {
                return Ok(());
            }
            match owner {
                Some(owner_id) if owner_id == caller.id => Ok(()),
                _ => Err(AppError::Forbidden),
            }
        }
    }
}

// O id do dono vindo do path é validado antes da decisão de acesso:
// um valor não numérico é erro de entrada (400), não negação (403).
fn parse_owner_id(raw: &str, field: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::InvalidField(format!("{field} must be a positive integer")))
}

fn caller_from(request: &Request) -> Result<AuthUser, AppError> {
    request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AppError::Unauthenticated)
}

// Roda como middleware de rota, antes do corpo ser lido: a autorização
// decide primeiro, a validação de conteúdo só acontece para quem pode.
pub async fn self_or_admin_guard(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let caller = caller_from(&request)?;
    let owner = if let Some(raw) = params.get("my_id") {
        Some(parse_owner_id(raw, "myId")?)
    } else if let Some(raw) = params.get("id") {
        Some(parse_owner_id(raw, "id")?)
    } else {
        None
    };

    allow(&caller, owner, AccessRule::SelfOrAdmin)?;
    Ok(next.run(request).await)
}

pub async fn admin_only_guard(request: Request, next: Next) -> Result<Response, AppError> {
    let caller = caller_from(&request)?;
    allow(&caller, None, AccessRule::AdminOnly)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(id: i64, customer_type: CustomerType) -> AuthUser {
        AuthUser {
            id,
            customer_type,
            email: "x@email.com".into(),
        }
    }

    #[test]
    fn admin_passes_every_rule() {
        let admin = caller(1, CustomerType::Admin);
        assert!(allow(&admin, Some(99), AccessRule::SelfOrAdmin).is_ok());
        assert!(allow(&admin, None, AccessRule::AdminOnly).is_ok());
        assert!(allow(&admin, None, AccessRule::RoleIn(&[CustomerType::Admin])).is_ok());
    }

    #[test]
    fn owner_passes_self_or_admin() {
        let person = caller(7, CustomerType::Person);
        assert!(allow(&person, Some(7), AccessRule::SelfOrAdmin).is_ok());
    }

    #[test]
    fn other_customer_is_forbidden() {
        let person = caller(7, CustomerType::Person);
        assert!(matches!(
            allow(&person, Some(8), AccessRule::SelfOrAdmin),
            Err(AppError::Forbidden)
        ));
        // Sem dono identificável no path, nega por padrão.
        assert!(matches!(
            allow(&person, None, AccessRule::SelfOrAdmin),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn non_admin_fails_admin_only() {
        let business = caller(3, CustomerType::Business);
        assert!(matches!(
            allow(&business, None, AccessRule::AdminOnly),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn owner_id_must_be_a_positive_integer() {
        assert_eq!(parse_owner_id("7", "myId").unwrap(), 7);

        for raw in ["abc", "-1", "0", "1.5", ""] {
            match parse_owner_id(raw, "myId") {
                Err(AppError::InvalidField(msg)) => {
                    assert_eq!(msg, "myId must be a positive integer");
                }
                other => panic!("esperava InvalidField, veio {other:?}"),
            }
        }
    }

    #[test]
    fn role_list_is_exact() {
        let rule = AccessRule::RoleIn(&[CustomerType::Person, CustomerType::Business]);
        assert!(allow(&caller(1, CustomerType::Person), None, rule).is_ok());
        assert!(allow(&caller(2, CustomerType::Business), None, rule).is_ok());
        assert!(matches!(
            allow(&caller(3, CustomerType::Admin), None, rule),
            Err(AppError::Forbidden)
        ));
    }
}

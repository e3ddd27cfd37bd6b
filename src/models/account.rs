// src/models/account.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::error::AppError;

// Mapeia o CREATE TYPE account_type do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "account_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Checking,
    Savings,
    Merchant,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "CHECKING",
            AccountType::Savings => "SAVINGS",
            AccountType::Merchant => "MERCHANT",
        }
    }

    /// Converte a entrada textual do cliente, aceitando qualquer caixa.
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let raw = raw.map(str::trim).unwrap_or("");
        if raw.is_empty() {
            return Err(AppError::InvalidField("Account type is required".into()));
        }
        match raw.to_uppercase().as_str() {
            "CHECKING" => Ok(AccountType::Checking),
            "SAVINGS" => Ok(AccountType::Savings),
            "MERCHANT" => Ok(AccountType::Merchant),
            _ => Err(AppError::InvalidField(
                "Account type must be one of: CHECKING, SAVINGS, MERCHANT".into(),
            )),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Linha da tabela accounts
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub number: String,
    pub branch: String,
    #[sqlx(rename = "type")]
    pub account_type: AccountType,
    pub balance: Decimal,
    pub active: bool,
    pub customer_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Resposta externa: nunca expõe customerId
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: i64,
    #[schema(example = "12345-6")]
    pub number: String,
    #[schema(example = "4402")]
    pub branch: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub balance: Decimal,
    pub active: bool,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            number: a.number,
            branch: a.branch,
            account_type: a.account_type,
            balance: a.balance,
            active: a.active,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountPayload {
    #[serde(rename = "type")]
    #[schema(example = "checking")]
    pub account_type: Option<String>,
}

// Aceita os campos imutáveis de propósito: a presença de qualquer um deles
// (mesmo com o valor atual) é violação de política, não campo desconhecido.
// Qualquer outra chave continua sendo rejeitada na desserialização.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateAccountPayload {
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub number: Option<String>,
    pub branch: Option<String>,
    pub balance: Option<Decimal>,
    pub active: Option<bool>,
    pub customer_id: Option<i64>,
    pub id: Option<i64>,
}

impl UpdateAccountPayload {
    pub fn has_immutable_fields(&self) -> bool {
        self.number.is_some()
            || self.branch.is_some()
            || self.balance.is_some()
            || self.active.is_some()
            || self.customer_id.is_some()
            || self.id.is_some()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalancePayload {
    pub balance: Decimal,
}

// Dados prontos para inserção (número já gerado e validado pela política)
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub number: String,
    pub branch: String,
    pub account_type: AccountType,
    pub customer_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            AccountType::parse(Some("checking")).unwrap(),
            AccountType::Checking
        );
        assert_eq!(
            AccountType::parse(Some("Savings")).unwrap(),
            AccountType::Savings
        );
        assert_eq!(
            AccountType::parse(Some("MERCHANT")).unwrap(),
            AccountType::Merchant
        );
    }

    #[test]
    fn parse_rejects_empty_and_unknown() {
        assert!(matches!(
            AccountType::parse(None),
            Err(AppError::InvalidField(_))
        ));
        assert!(matches!(
            AccountType::parse(Some("  ")),
            Err(AppError::InvalidField(_))
        ));
        assert!(matches!(
            AccountType::parse(Some("CREDIT")),
            Err(AppError::InvalidField(_))
        ));
    }

    #[test]
    fn update_payload_flags_immutable_fields() {
        let payload: UpdateAccountPayload =
            serde_json::from_value(serde_json::json!({ "type": "savings" })).unwrap();
        assert!(!payload.has_immutable_fields());

        // Mesmo mandando o valor vigente, o campo é imutável.
        for body in [
            serde_json::json!({ "type": "savings", "balance": 0 }),
            serde_json::json!({ "type": "savings", "number": "12345-6" }),
            serde_json::json!({ "type": "savings", "branch": "4402" }),
            serde_json::json!({ "type": "savings", "active": true }),
            serde_json::json!({ "type": "savings", "customerId": 1 }),
            serde_json::json!({ "type": "savings", "id": 7 }),
        ] {
            let payload: UpdateAccountPayload = serde_json::from_value(body).unwrap();
            assert!(payload.has_immutable_fields());
        }
    }

    #[test]
    fn update_payload_rejects_unknown_fields() {
        // Campos imutáveis entram (e viram violação de política depois);
        // chaves realmente desconhecidas são barradas na desserialização.
        let result: Result<UpdateAccountPayload, _> =
            serde_json::from_value(serde_json::json!({ "type": "savings", "foo": 1 }));
        assert!(result.is_err());

        let result: Result<UpdateAccountPayload, _> =
            serde_json::from_value(serde_json::json!({ "type": "savings", "balance": 10 }));
        assert!(result.is_ok());
    }

    #[test]
    fn account_response_hides_customer_id() {
        let account = Account {
            id: 10,
            number: "12345-6".into(),
            branch: "4402".into(),
            account_type: AccountType::Checking,
            balance: dec!(0.00),
            active: true,
            customer_id: 99,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let body = serde_json::to_value(AccountResponse::from(account)).unwrap();
        let raw = body.to_string();
        assert!(!raw.contains("customerId"));
        assert!(!raw.contains("customer_id"));
        assert_eq!(body["type"], "CHECKING");
        assert_eq!(body["branch"], "4402");
    }
}

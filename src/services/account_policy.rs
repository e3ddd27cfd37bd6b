// src/services/account_policy.rs

use crate::{
    common::error::AppError,
    models::{account::AccountType, customer::CustomerType},
};

/// Tipos de conta que cada tipo de cliente pode abrir.
/// ADMIN não é correntista: pedir a lista dele já é erro.
pub fn allowed_account_types(
    customer_type: CustomerType,
) -> Result<&'static [AccountType], AppError> {
    match customer_type {
        CustomerType::Person => Ok(&[AccountType::Checking, AccountType::Savings]),
        CustomerType::Business => Ok(&[AccountType::Merchant]),
        CustomerType::Admin => Err(AppError::InvalidCustomerType),
    }
}

// Caminho de criação: a inelegibilidade do dono vem antes de qualquer
// olhada no tipo pedido — ADMIN recebe 422 mesmo com tipo vazio ou inválido.
pub fn authorize_new_account(
    customer_type: CustomerType,
    raw_account_type: Option<&str>,
) -> Result<AccountType, AppError> {
    allowed_account_types(customer_type)?;
    let account_type = AccountType::parse(raw_account_type)?;
    assert_can_create(customer_type, account_type)?;
    Ok(account_type)
}

pub fn assert_can_create(
    customer_type: CustomerType,
    account_type: AccountType,
) -> Result<(), AppError> {
    let allowed = allowed_account_types(customer_type)?;
    if !allowed.contains(&account_type) {
        let list = allowed
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::PolicyViolation(format!(
            "Customers of type {customer_type} can only create accounts: {list}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_can_open_checking_and_savings() {
        assert!(assert_can_create(CustomerType::Person, AccountType::Checking).is_ok());
        assert!(assert_can_create(CustomerType::Person, AccountType::Savings).is_ok());
    }

    #[test]
    fn person_cannot_open_merchant() {
        let err = assert_can_create(CustomerType::Person, AccountType::Merchant).unwrap_err();
        match err {
            AppError::PolicyViolation(msg) => {
                assert!(msg.contains("PERSON"));
                assert!(msg.contains("CHECKING, SAVINGS"));
            }
            other => panic!("esperava PolicyViolation, veio {other:?}"),
        }
    }

    #[test]
    fn business_can_only_open_merchant() {
        assert!(assert_can_create(CustomerType::Business, AccountType::Merchant).is_ok());
        assert!(matches!(
            assert_can_create(CustomerType::Business, AccountType::Checking),
            Err(AppError::PolicyViolation(_))
        ));
        assert!(matches!(
            assert_can_create(CustomerType::Business, AccountType::Savings),
            Err(AppError::PolicyViolation(_))
        ));
    }

    #[test]
    fn admin_has_no_account_types_at_all() {
        // A checagem de subtipo vem antes da lista de permitidos.
        assert!(matches!(
            allowed_account_types(CustomerType::Admin),
            Err(AppError::InvalidCustomerType)
        ));
        assert!(matches!(
            assert_can_create(CustomerType::Admin, AccountType::Checking),
            Err(AppError::InvalidCustomerType)
        ));
    }

    #[test]
    fn admin_rejection_ignores_the_requested_type() {
        // Mesmo com tipo ausente ou desconhecido, ADMIN recebe o erro de
        // inelegibilidade, não o de validação do tipo.
        for raw in [None, Some(""), Some("CREDIT"), Some("checking")] {
            assert!(matches!(
                authorize_new_account(CustomerType::Admin, raw),
                Err(AppError::InvalidCustomerType)
            ));
        }
    }

    #[test]
    fn authorize_parses_and_applies_the_allow_list() {
        assert_eq!(
            authorize_new_account(CustomerType::Person, Some("savings")).unwrap(),
            AccountType::Savings
        );
        assert!(matches!(
            authorize_new_account(CustomerType::Person, Some("merchant")),
            Err(AppError::PolicyViolation(_))
        ));
        assert!(matches!(
            authorize_new_account(CustomerType::Business, None),
            Err(AppError::InvalidField(_))
        ));
    }
}

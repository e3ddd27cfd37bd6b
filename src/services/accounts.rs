// src/services/accounts.rs

use rand::Rng;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{AccountRepository, CustomerRepository},
    models::account::{
        Account, AccountType, CreateAccountPayload, NewAccount, UpdateAccountPayload,
    },
    services::account_policy,
};

/// Agência única da instituição.
pub const DEFAULT_BRANCH: &str = "4402";

const MAX_NUMBER_ATTEMPTS: u32 = 20;

#[derive(Clone)]
pub struct AccountService {
    account_repo: AccountRepository,
    customer_repo: CustomerRepository,
}

impl AccountService {
    pub fn new(account_repo: AccountRepository, customer_repo: CustomerRepository) -> Self {
        Self {
            account_repo,
            customer_repo,
        }
    }

    // Número no formato NNNNN-D. O dígito final é sorteado junto com o
    // prefixo, sem verificador; a unicidade vem da checagem no banco.
    fn random_account_number() -> String {
        let mut rng = rand::thread_rng();
        format!("{:05}-{}", rng.gen_range(0..100_000), rng.gen_range(0..10))
    }

    async fn generate_unique_number(&self) -> Result<String, AppError> {
        pick_unique_number(Self::random_account_number, |candidate| async move {
            self.account_repo.number_exists(&candidate).await
        })
        .await
    }

    pub async fn create_owned(
        &self,
        customer_id: i64,
        payload: CreateAccountPayload,
    ) -> Result<Account, AppError> {
        let customer_type = self.customer_repo.find_type_by_id(customer_id).await?;
        let account_type =
            account_policy::authorize_new_account(customer_type, payload.account_type.as_deref())?;

        let number = self.generate_unique_number().await?;
        self.account_repo
            .create(&NewAccount {
                number,
                branch: DEFAULT_BRANCH.to_string(),
                account_type,
                customer_id,
            })
            .await
    }

    pub async fn find_owned(
        &self,
        customer_id: i64,
        account_id: i64,
    ) -> Result<Account, AppError> {
        self.account_repo
            .find_owned_by_id(account_id, customer_id, true)
            .await
    }

    pub async fn list_owned(&self, customer_id: i64) -> Result<Vec<Account>, AppError> {
        self.account_repo.find_all_by_owner(customer_id).await
    }

    // Única mutação permitida é o tipo. Qualquer outro campo no corpo,
    // mesmo repetindo o valor vigente, é barrado antes de tocar o banco.
    pub async fn update_owned(
        &self,
        customer_id: i64,
        account_id: i64,
        payload: UpdateAccountPayload,
    ) -> Result<Account, AppError> {
        if payload.has_immutable_fields() {
            return Err(AppError::PolicyViolation("Only type can be changed".into()));
        }

        let new_type = AccountType::parse(payload.account_type.as_deref())?;

        let account = self
            .account_repo
            .find_owned_by_id(account_id, customer_id, false)
            .await?;

        // Repetir o tipo atual é um no-op.
        if account.account_type == new_type {
            return Ok(account);
        }

        let customer_type = self.customer_repo.find_type_by_id(customer_id).await?;
        account_policy::assert_can_create(customer_type, new_type)?;

        self.account_repo
            .update_type(account_id, customer_id, new_type)
            .await
    }

    pub async fn delete_owned(&self, customer_id: i64, account_id: i64) -> Result<(), AppError> {
        self.account_repo.soft_delete(account_id, customer_id).await
    }

    /// Consulta administrativa por número, entre contas ativas.
    pub async fn find_by_number(&self, number: &str) -> Result<Account, AppError> {
        self.account_repo
            .find_by_number(number)
            .await?
            .ok_or(AppError::NotFound("Account"))
    }

    /// Substituição administrativa do saldo, por id, ativa ou não.
    pub async fn change_balance(
        &self,
        account_id: i64,
        balance: Decimal,
    ) -> Result<Account, AppError> {
        self.account_repo.replace_balance(account_id, balance).await
    }
}

// Laço de tentativas limitado: sorteia um candidato, consulta a colisão e
// para no primeiro número livre. Esgotar as tentativas é erro terminal,
// nunca espera ou repetição indefinida.
async fn pick_unique_number<G, E, Fut>(
    mut next_candidate: G,
    mut exists: E,
) -> Result<String, AppError>
where
    G: FnMut() -> String,
    E: FnMut(String) -> Fut,
    Fut: std::future::Future<Output = Result<bool, AppError>>,
{
    for _ in 0..MAX_NUMBER_ATTEMPTS {
        // O RNG não atravessa awaits: o candidato nasce antes da consulta.
        let candidate = next_candidate();
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::ResourceExhausted(
        "Could not generate a unique account number. Try again.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn exhausted_collisions_end_in_terminal_error() {
        let probes = Cell::new(0u32);
        let result = pick_unique_number(
            || "11111-1".to_string(),
            |_| {
                probes.set(probes.get() + 1);
                async { Ok::<_, AppError>(true) }
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::ResourceExhausted(_))));
        assert_eq!(probes.get(), MAX_NUMBER_ATTEMPTS);
    }

    #[tokio::test]
    async fn first_free_candidate_short_circuits() {
        let mut draws = 0u32;
        let probes = Cell::new(0u32);
        let number = pick_unique_number(
            || {
                draws += 1;
                if draws == 1 {
                    "11111-1".to_string()
                } else {
                    "22222-2".to_string()
                }
            },
            |candidate| {
                probes.set(probes.get() + 1);
                async move { Ok::<_, AppError>(candidate == "11111-1") }
            },
        )
        .await
        .unwrap();

        // O primeiro candidato colidiu, o segundo já estava livre.
        assert_eq!(number, "22222-2");
        assert_eq!(probes.get(), 2);
    }

    #[test]
    fn account_number_has_fixed_shape() {
        for _ in 0..200 {
            let number = AccountService::random_account_number();
            assert_eq!(number.len(), 7);
            let (prefix, digit) = number.split_at(5);
            assert!(prefix.chars().all(|c| c.is_ascii_digit()));
            assert!(digit.starts_with('-'));
            assert!(digit[1..].chars().all(|c| c.is_ascii_digit()));
            assert_eq!(digit.len(), 2);
        }
    }
}

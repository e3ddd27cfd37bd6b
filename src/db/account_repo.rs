// src/db/account_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::{AppError, map_unique_violation},
    models::account::{Account, AccountType, NewAccount},
};

// Persistência de contas, sempre escopada pelo cliente dono — exceto a
// busca global por número, usada na checagem de unicidade e na consulta
// administrativa.
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_account: &NewAccount) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (number, branch, type, customer_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&new_account.number)
        .bind(&new_account.branch)
        .bind(new_account.account_type)
        .bind(new_account.customer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "number"))
    }

    /// Busca por id + dono. Por padrão ignora contas desativadas.
    pub async fn find_owned_by_id(
        &self,
        account_id: i64,
        customer_id: i64,
        include_inactive: bool,
    ) -> Result<Account, AppError> {
        let mut sql =
            String::from("SELECT * FROM accounts WHERE id = $1 AND customer_id = $2");
        if !include_inactive {
            sql.push_str(" AND active = TRUE");
        }

        sqlx::query_as::<_, Account>(&sql)
            .bind(account_id)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Account"))
    }

    /// Contas ativas do dono, em ordem de criação.
    pub async fn find_all_by_owner(&self, customer_id: i64) -> Result<Vec<Account>, AppError> {
        let rows = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE customer_id = $1 AND active = TRUE ORDER BY id ASC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Atualiza apenas o tipo, escopado por id + dono + ativa.
    pub async fn update_type(
        &self,
        account_id: i64,
        customer_id: i64,
        new_type: AccountType,
    ) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET type = $1, updated_at = NOW()
            WHERE id = $2 AND customer_id = $3 AND active = TRUE
            RETURNING *
            "#,
        )
        .bind(new_type)
        .bind(account_id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Account"))
    }

    // Desativa a conta (soft delete). Uma segunda chamada não casa nenhuma
    // linha (a conta já está inativa) e vira 404 para o chamador.
    pub async fn soft_delete(&self, account_id: i64, customer_id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET active = FALSE, updated_at = NOW()
            WHERE id = $1 AND customer_id = $2 AND active = TRUE
            "#,
        )
        .bind(account_id)
        .bind(customer_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Account"));
        }
        Ok(())
    }

    // A unicidade do número vale para a tabela inteira, inclusive contas
    // desativadas, então a checagem de geração não filtra por `active`.
    pub async fn number_exists(&self, number: &str) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM accounts WHERE number = $1")
            .bind(number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Busca global (não escopada por dono) entre contas ativas.
    pub async fn find_by_number(&self, number: &str) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE number = $1 AND active = TRUE",
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // Substituição direta do saldo, por id, ignorando o flag de ativação.
    // Sem lock otimista: escritas concorrentes ficam com a última.
    pub async fn replace_balance(
        &self,
        account_id: i64,
        new_balance: Decimal,
    ) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET balance = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(new_balance)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Account"))
    }
}

// src/db/customer_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder, Transaction};

use crate::{
    common::error::{AppError, map_unique_violation},
    models::customer::{
        BusinessProfile, BusinessProfilePatch, Customer, CustomerCommonPatch, CustomerType,
        NewBusinessProfile, NewCustomerCommon, NewPersonProfile, PersonProfile,
        PersonProfilePatch,
    },
};

// O agregado Customer + extensão de perfil, responsável pelas três tabelas.
// Toda mutação do agregado (create/update/delete) roda em uma única transação;
// a remoção dos filhos é garantia do banco (FK ON DELETE CASCADE).
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca apenas o discriminante de tipo do cliente.
    pub async fn find_type_by_id(&self, id: i64) -> Result<CustomerType, AppError> {
        sqlx::query_scalar::<_, CustomerType>("SELECT type FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Customer"))
    }

    /// Busca pelo e-mail normalizado (minúsculo).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        let row = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE email = $1")
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn fetch_customer<'e, E>(&self, executor: E, id: i64) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    // Carrega o cliente e valida o subtipo esperado. A distinção importa:
    // id inexistente é 404, id de outro subtipo é 400 (TypeMismatch).
    async fn fetch_customer_of_type(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        expected: CustomerType,
    ) -> Result<Customer, AppError> {
        let customer = self
            .fetch_customer(&mut **tx, id)
            .await?
            .ok_or(AppError::NotFound("Customer"))?;
        if customer.customer_type != expected {
            return Err(AppError::TypeMismatch(expected));
        }
        Ok(customer)
    }

    async fn insert_customer<'e, E>(
        &self,
        executor: E,
        kind: CustomerType,
        common: &NewCustomerCommon,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                type, name, email, password_hash, birth_date, phone,
                street, number, district, city, state, zip_code
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(kind)
        .bind(&common.name)
        .bind(common.email.to_lowercase())
        .bind(&common.password_hash)
        .bind(common.birth_date)
        .bind(&common.phone)
        .bind(&common.street)
        .bind(&common.number)
        .bind(&common.district)
        .bind(&common.city)
        .bind(&common.state)
        .bind(&common.zip_code)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "email"))
    }

    async fn assert_email_free(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> Result<(), AppError> {
        let taken = sqlx::query_scalar::<_, i64>("SELECT id FROM customers WHERE email = $1")
            .bind(email.to_lowercase())
            .fetch_optional(&mut **tx)
            .await?;
        if taken.is_some() {
            return Err(AppError::DuplicateResource("email"));
        }
        Ok(())
    }

    // --- PERSON ---

    /// Cria o par Customer(PERSON) + Person atomicamente.
    pub async fn create_person(
        &self,
        common: &NewCustomerCommon,
        profile: &NewPersonProfile,
    ) -> Result<(Customer, PersonProfile), AppError> {
        let mut tx = self.pool.begin().await?;

        self.assert_email_free(&mut tx, &common.email).await?;

        let cpf_taken =
            sqlx::query_scalar::<_, i64>("SELECT customer_id FROM persons WHERE cpf = $1")
                .bind(&profile.cpf)
                .fetch_optional(&mut *tx)
                .await?;
        if cpf_taken.is_some() {
            return Err(AppError::DuplicateResource("cpf"));
        }

        let customer = self
            .insert_customer(&mut *tx, CustomerType::Person, common)
            .await?;

        let person = sqlx::query_as::<_, PersonProfile>(
            r#"
            INSERT INTO persons (customer_id, cpf, monthly_income)
            VALUES ($1, $2, $3)
            RETURNING customer_id, cpf, monthly_income
            "#,
        )
        .bind(customer.id)
        .bind(&profile.cpf)
        .bind(profile.monthly_income)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "cpf"))?;

        tx.commit().await?;
        Ok((customer, person))
    }

    pub async fn find_person_by_id(&self, id: i64) -> Result<(Customer, Option<PersonProfile>), AppError> {
        let customer = self
            .fetch_customer(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Customer"))?;
        if customer.customer_type != CustomerType::Person {
            return Err(AppError::TypeMismatch(CustomerType::Person));
        }

        let profile = sqlx::query_as::<_, PersonProfile>(
            "SELECT customer_id, cpf, monthly_income FROM persons WHERE customer_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok((customer, profile))
    }

    /// Lista todos os PERSON com o perfil carregado, em ordem de inserção.
    pub async fn find_all_persons(&self) -> Result<Vec<(Customer, Option<PersonProfile>)>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE type = 'PERSON' ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let profiles = sqlx::query_as::<_, PersonProfile>(
            "SELECT customer_id, cpf, monthly_income FROM persons",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_id: std::collections::HashMap<i64, PersonProfile> =
            profiles.into_iter().map(|p| (p.customer_id, p)).collect();

        Ok(customers
            .into_iter()
            .map(|c| {
                let profile = by_id.remove(&c.id);
                (c, profile)
            })
            .collect())
    }

    pub async fn update_person(
        &self,
        id: i64,
        common: &CustomerCommonPatch,
        profile: &PersonProfilePatch,
    ) -> Result<(Customer, Option<PersonProfile>), AppError> {
        let mut tx = self.pool.begin().await?;

        self.fetch_customer_of_type(&mut tx, id, CustomerType::Person)
            .await?;

        if !common.is_empty() {
            self.apply_customer_patch(&mut tx, id, common).await?;
        }

        if !profile.is_empty() {
            let mut qb = QueryBuilder::<Postgres>::new("UPDATE persons SET ");
            let mut sep = qb.separated(", ");
            if let Some(cpf) = &profile.cpf {
                sep.push("cpf = ").push_bind_unseparated(cpf.clone());
            }
            if let Some(income) = profile.monthly_income {
                sep.push("monthly_income = ").push_bind_unseparated(income);
            }
            qb.push(" WHERE customer_id = ").push_bind(id);

            let result = qb
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| map_unique_violation(e, "cpf"))?;
            if result.rows_affected() == 0 {
                return Err(AppError::NotFound("Person profile"));
            }
        }

        let customer = self
            .fetch_customer(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Customer"))?;
        let person = sqlx::query_as::<_, PersonProfile>(
            "SELECT customer_id, cpf, monthly_income FROM persons WHERE customer_id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((customer, person))
    }

    // --- BUSINESS ---

    /// Cria o par Customer(BUSINESS) + Business atomicamente.
    pub async fn create_business(
        &self,
        common: &NewCustomerCommon,
        profile: &NewBusinessProfile,
    ) -> Result<(Customer, BusinessProfile), AppError> {
        let mut tx = self.pool.begin().await?;

        self.assert_email_free(&mut tx, &common.email).await?;

        let cnpj_taken =
            sqlx::query_scalar::<_, i64>("SELECT customer_id FROM businesses WHERE cnpj = $1")
                .bind(&profile.cnpj)
                .fetch_optional(&mut *tx)
                .await?;
        if cnpj_taken.is_some() {
            return Err(AppError::DuplicateResource("cnpj"));
        }

        let customer = self
            .insert_customer(&mut *tx, CustomerType::Business, common)
            .await?;

        let business = sqlx::query_as::<_, BusinessProfile>(
            r#"
            INSERT INTO businesses (customer_id, cnpj, is_icms_exempt, state_registration)
            VALUES ($1, $2, $3, $4)
            RETURNING customer_id, cnpj, is_icms_exempt, state_registration
            "#,
        )
        .bind(customer.id)
        .bind(&profile.cnpj)
        .bind(profile.is_icms_exempt)
        .bind(&profile.state_registration)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "cnpj"))?;

        tx.commit().await?;
        Ok((customer, business))
    }

    pub async fn find_business_by_id(
        &self,
        id: i64,
    ) -> Result<(Customer, Option<BusinessProfile>), AppError> {
        let customer = self
            .fetch_customer(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Customer"))?;
        if customer.customer_type != CustomerType::Business {
            return Err(AppError::TypeMismatch(CustomerType::Business));
        }

        let profile = sqlx::query_as::<_, BusinessProfile>(
            "SELECT customer_id, cnpj, is_icms_exempt, state_registration FROM businesses WHERE customer_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok((customer, profile))
    }

    /// Lista todos os BUSINESS com o perfil carregado, em ordem de inserção.
    pub async fn find_all_businesses(
        &self,
    ) -> Result<Vec<(Customer, Option<BusinessProfile>)>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE type = 'BUSINESS' ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let profiles = sqlx::query_as::<_, BusinessProfile>(
            "SELECT customer_id, cnpj, is_icms_exempt, state_registration FROM businesses",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_id: std::collections::HashMap<i64, BusinessProfile> =
            profiles.into_iter().map(|p| (p.customer_id, p)).collect();

        Ok(customers
            .into_iter()
            .map(|c| {
                let profile = by_id.remove(&c.id);
                (c, profile)
            })
            .collect())
    }

    pub async fn update_business(
        &self,
        id: i64,
        common: &CustomerCommonPatch,
        profile: &BusinessProfilePatch,
    ) -> Result<(Customer, Option<BusinessProfile>), AppError> {
        let mut tx = self.pool.begin().await?;

        self.fetch_customer_of_type(&mut tx, id, CustomerType::Business)
            .await?;

        if !common.is_empty() {
            self.apply_customer_patch(&mut tx, id, common).await?;
        }

        if !profile.is_empty() {
            let mut qb = QueryBuilder::<Postgres>::new("UPDATE businesses SET ");
            let mut sep = qb.separated(", ");
            if let Some(cnpj) = &profile.cnpj {
                sep.push("cnpj = ").push_bind_unseparated(cnpj.clone());
            }
            if let Some(exempt) = profile.is_icms_exempt {
                sep.push("is_icms_exempt = ").push_bind_unseparated(exempt);
            }
            if let Some(registration) = &profile.state_registration {
                sep.push("state_registration = ")
                    .push_bind_unseparated(registration.clone());
            }
            qb.push(" WHERE customer_id = ").push_bind(id);

            let result = qb
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| map_unique_violation(e, "cnpj"))?;
            if result.rows_affected() == 0 {
                return Err(AppError::NotFound("Business profile"));
            }
        }

        let customer = self
            .fetch_customer(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Customer"))?;
        let business = sqlx::query_as::<_, BusinessProfile>(
            "SELECT customer_id, cnpj, is_icms_exempt, state_registration FROM businesses WHERE customer_id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((customer, business))
    }

    // --- COMUM ---

    // Patch parcial dos campos comuns de Customer. Campos ausentes não são
    // tocados; `Some(None)` vira NULL na coluna.
    async fn apply_customer_patch(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        patch: &CustomerCommonPatch,
    ) -> Result<(), AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE customers SET updated_at = NOW()");

        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(email) = &patch.email {
            qb.push(", email = ").push_bind(email.to_lowercase());
        }
        if let Some(hash) = &patch.password_hash {
            qb.push(", password_hash = ").push_bind(hash.clone());
        }
        if let Some(birth_date) = patch.birth_date {
            qb.push(", birth_date = ").push_bind(birth_date);
        }
        if let Some(phone) = &patch.phone {
            qb.push(", phone = ").push_bind(phone.clone());
        }
        if let Some(street) = &patch.street {
            qb.push(", street = ").push_bind(street.clone());
        }
        if let Some(number) = &patch.number {
            qb.push(", number = ").push_bind(number.clone());
        }
        if let Some(district) = &patch.district {
            qb.push(", district = ").push_bind(district.clone());
        }
        if let Some(city) = &patch.city {
            qb.push(", city = ").push_bind(city.clone());
        }
        if let Some(state) = &patch.state {
            qb.push(", state = ").push_bind(state.clone());
        }
        if let Some(zip_code) = &patch.zip_code {
            qb.push(", zip_code = ").push_bind(zip_code.clone());
        }

        qb.push(" WHERE id = ").push_bind(id);

        let result = qb
            .build()
            .execute(&mut **tx)
            .await
            .map_err(|e| map_unique_violation(e, "email"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer"));
        }
        Ok(())
    }

    /// Remove o cliente em definitivo; perfil e contas caem pelo CASCADE.
    pub async fn delete(&self, id: i64, expected: CustomerType) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.fetch_customer_of_type(&mut tx, id, expected).await?;

        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Clientes não têm soft delete; apenas contas são desativáveis.
    pub fn soft_delete(&self, _id: i64) -> Result<(), AppError> {
        Err(AppError::OperationNotSupported(
            "Soft delete is not supported for Customer",
        ))
    }

    /// Cria um cliente ADMIN (sem extensão de perfil e sem contas).
    pub async fn create_admin(&self, common: &NewCustomerCommon) -> Result<Customer, AppError> {
        self.insert_customer(&self.pool, CustomerType::Admin, common)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn soft_delete_is_not_supported_for_customers() {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let repo = CustomerRepository::new(pool);
        assert!(matches!(
            repo.soft_delete(1),
            Err(AppError::OperationNotSupported(_))
        ));
    }
}

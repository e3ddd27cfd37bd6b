// src/services/customers.rs

use bcrypt::hash;

use crate::{
    common::error::AppError,
    db::CustomerRepository,
    models::customer::{
        BusinessProfilePatch, BusinessResponse, CreateBusinessPayload, CreatePersonPayload,
        CustomerCommonPatch, CustomerType, NewBusinessProfile, NewCustomerCommon,
        NewPersonProfile, PersonProfilePatch, PersonResponse, UpdateBusinessPayload,
        UpdatePersonPayload,
    },
};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository) -> Self {
        Self { repo }
    }

    // bcrypt é pesado; roda fora do executor async.
    async fn hash_password(password: String) -> Result<String, AppError> {
        let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    // --- PERSON ---

    pub async fn create_person(
        &self,
        payload: CreatePersonPayload,
    ) -> Result<PersonResponse, AppError> {
        let password_hash = Self::hash_password(payload.password.clone()).await?;
        let (common, profile) = new_person(payload, password_hash);
        let (customer, person) = self.repo.create_person(&common, &profile).await?;
        Ok(PersonResponse::new(customer, Some(person)))
    }

    pub async fn find_person(&self, id: i64) -> Result<PersonResponse, AppError> {
        let (customer, person) = self.repo.find_person_by_id(id).await?;
        Ok(PersonResponse::new(customer, person))
    }

    pub async fn list_persons(&self) -> Result<Vec<PersonResponse>, AppError> {
        let rows = self.repo.find_all_persons().await?;
        Ok(rows
            .into_iter()
            .map(|(customer, person)| PersonResponse::new(customer, person))
            .collect())
    }

    pub async fn update_person(
        &self,
        id: i64,
        payload: UpdatePersonPayload,
    ) -> Result<PersonResponse, AppError> {
        let password_hash = match payload.password.clone() {
            Some(password) => Some(Self::hash_password(password).await?),
            None => None,
        };
        let (common, profile) = person_patch(payload, password_hash);
        let (customer, person) = self.repo.update_person(id, &common, &profile).await?;
        Ok(PersonResponse::new(customer, person))
    }

    /// Remoção definitiva: perfil e contas caem junto.
    pub async fn delete_person(&self, id: i64) -> Result<(), AppError> {
        self.repo.delete(id, CustomerType::Person).await
    }

    // --- BUSINESS ---

    pub async fn create_business(
        &self,
        payload: CreateBusinessPayload,
    ) -> Result<BusinessResponse, AppError> {
        let password_hash = Self::hash_password(payload.password.clone()).await?;
        let (common, profile) = new_business(payload, password_hash);
        let (customer, business) = self.repo.create_business(&common, &profile).await?;
        Ok(BusinessResponse::new(customer, Some(business)))
    }

    pub async fn find_business(&self, id: i64) -> Result<BusinessResponse, AppError> {
        let (customer, business) = self.repo.find_business_by_id(id).await?;
        Ok(BusinessResponse::new(customer, business))
    }

    pub async fn list_businesses(&self) -> Result<Vec<BusinessResponse>, AppError> {
        let rows = self.repo.find_all_businesses().await?;
        Ok(rows
            .into_iter()
            .map(|(customer, business)| BusinessResponse::new(customer, business))
            .collect())
    }

    pub async fn update_business(
        &self,
        id: i64,
        payload: UpdateBusinessPayload,
    ) -> Result<BusinessResponse, AppError> {
        let password_hash = match payload.password.clone() {
            Some(password) => Some(Self::hash_password(password).await?),
            None => None,
        };
        let (common, profile) = business_patch(payload, password_hash);
        let (customer, business) = self.repo.update_business(id, &common, &profile).await?;
        Ok(BusinessResponse::new(customer, business))
    }

    pub async fn delete_business(&self, id: i64) -> Result<(), AppError> {
        self.repo.delete(id, CustomerType::Business).await
    }

    // --- ADMIN ---

    // Garante o ADMIN de bootstrap na subida. Idempotente: se o e-mail já
    // existe, não faz nada.
    pub async fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AppError> {
        if self.repo.find_by_email(email).await?.is_some() {
            return Ok(());
        }

        let password_hash = Self::hash_password(password.to_owned()).await?;
        let common = NewCustomerCommon {
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash,
            birth_date: None,
            phone: None,
            street: None,
            number: None,
            district: None,
            city: None,
            state: None,
            zip_code: None,
        };
        let admin = self.repo.create_admin(&common).await?;
        tracing::info!("Cliente ADMIN criado no bootstrap (id {})", admin.id);
        Ok(())
    }
}

// --- MAPEAMENTO PAYLOAD -> ESTRUTURAS INTERNAS ---

fn new_person(
    payload: CreatePersonPayload,
    password_hash: String,
) -> (NewCustomerCommon, NewPersonProfile) {
    let common = NewCustomerCommon {
        name: payload.name,
        email: payload.email,
        password_hash,
        birth_date: payload.birth_date,
        phone: payload.phone,
        street: payload.street,
        number: payload.number,
        district: payload.district,
        city: payload.city,
        state: payload.state,
        zip_code: payload.zip_code,
    };
    let profile = NewPersonProfile {
        cpf: payload.cpf,
        monthly_income: payload.monthly_income,
    };
    (common, profile)
}

fn new_business(
    payload: CreateBusinessPayload,
    password_hash: String,
) -> (NewCustomerCommon, NewBusinessProfile) {
    let common = NewCustomerCommon {
        name: payload.name,
        email: payload.email,
        password_hash,
        birth_date: payload.birth_date,
        phone: payload.phone,
        street: payload.street,
        number: payload.number,
        district: payload.district,
        city: payload.city,
        state: payload.state,
        zip_code: payload.zip_code,
    };
    let profile = NewBusinessProfile {
        cnpj: payload.cnpj,
        is_icms_exempt: payload.is_icms_exempt,
        state_registration: payload.state_registration,
    };
    (common, profile)
}

fn person_patch(
    payload: UpdatePersonPayload,
    password_hash: Option<String>,
) -> (CustomerCommonPatch, PersonProfilePatch) {
    let common = CustomerCommonPatch {
        name: payload.name,
        email: payload.email,
        password_hash,
        birth_date: payload.birth_date,
        phone: payload.phone,
        street: payload.street,
        number: payload.number,
        district: payload.district,
        city: payload.city,
        state: payload.state,
        zip_code: payload.zip_code,
    };
    let profile = PersonProfilePatch {
        cpf: payload.cpf,
        monthly_income: payload.monthly_income,
    };
    (common, profile)
}

fn business_patch(
    payload: UpdateBusinessPayload,
    password_hash: Option<String>,
) -> (CustomerCommonPatch, BusinessProfilePatch) {
    let common = CustomerCommonPatch {
        name: payload.name,
        email: payload.email,
        password_hash,
        birth_date: payload.birth_date,
        phone: payload.phone,
        street: payload.street,
        number: payload.number,
        district: payload.district,
        city: payload.city,
        state: payload.state,
        zip_code: payload.zip_code,
    };
    let profile = BusinessProfilePatch {
        cnpj: payload.cnpj,
        is_icms_exempt: payload.is_icms_exempt,
        state_registration: payload.state_registration,
    };
    (common, profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_patch_keeps_null_vs_absent_distinction() {
        let payload: UpdatePersonPayload = serde_json::from_value(serde_json::json!({
            "name": "Novo Nome",
            "phone": null
        }))
        .unwrap();

        let (common, profile) = person_patch(payload, None);
        assert_eq!(common.name.as_deref(), Some("Novo Nome"));
        assert_eq!(common.phone, Some(None)); // null explícito limpa
        assert!(common.street.is_none()); // ausente não toca
        assert!(common.password_hash.is_none());
        assert!(profile.is_empty());
    }

    #[test]
    fn person_patch_carries_hash_not_password() {
        let payload: UpdatePersonPayload = serde_json::from_value(serde_json::json!({
            "password": "novasenha123"
        }))
        .unwrap();

        let (common, _) = person_patch(payload, Some("$2b$10$hash".into()));
        assert_eq!(common.password_hash.as_deref(), Some("$2b$10$hash"));
    }

    #[test]
    fn business_patch_maps_profile_fields() {
        let payload: UpdateBusinessPayload = serde_json::from_value(serde_json::json!({
            "isIcmsExempt": false,
            "stateRegistration": "123456"
        }))
        .unwrap();

        let (common, profile) = business_patch(payload, None);
        assert!(common.is_empty());
        assert_eq!(profile.is_icms_exempt, Some(false));
        assert_eq!(profile.state_registration, Some(Some("123456".into())));
        assert!(profile.cnpj.is_none());
    }
}

// src/models/customer.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::documents::{is_valid_cnpj, is_valid_cpf, only_digits};

// --- ENUMS ---

// Mapeia o CREATE TYPE customer_type do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "customer_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CustomerType {
    Person,
    Business,
    Admin,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Person => "PERSON",
            CustomerType::Business => "BUSINESS",
            CustomerType::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CustomerType {
    type Err = String;

    // Usado onde o tipo chega como texto não confiável (claim `role` do JWT)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PERSON" => Ok(CustomerType::Person),
            "BUSINESS" => Ok(CustomerType::Business),
            "ADMIN" => Ok(CustomerType::Admin),
            other => Err(other.to_string()),
        }
    }
}

// --- LINHAS DO BANCO ---

// Linha da tabela customers. Nunca é serializada diretamente:
// as respostas saem pelos DTOs abaixo, sem o hash de senha.
#[derive(Debug, Clone, FromRow)]
pub struct Customer {
    pub id: i64,
    #[sqlx(rename = "type")]
    pub customer_type: CustomerType,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonProfile {
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub customer_id: i64,
    pub cpf: String,
    pub monthly_income: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub customer_id: i64,
    pub cnpj: String,
    pub is_icms_exempt: bool,
    pub state_registration: Option<String>,
}

// --- DTOS DE LEITURA ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub number: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl From<&Customer> for Address {
    fn from(c: &Customer) -> Self {
        Self {
            street: c.street.clone(),
            number: c.number.clone(),
            district: c.district.clone(),
            city: c.city.clone(),
            state: c.state.clone(),
            zip_code: c.zip_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    pub name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub address: Address,
    pub person: Option<PersonProfile>,
}

impl PersonResponse {
    pub fn new(customer: Customer, person: Option<PersonProfile>) -> Self {
        Self {
            id: customer.id,
            customer_type: customer.customer_type,
            name: customer.name.clone(),
            email: customer.email.clone(),
            birth_date: customer.birth_date,
            phone: customer.phone.clone(),
            address: Address::from(&customer),
            person,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    pub name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub address: Address,
    pub business: Option<BusinessProfile>,
}

impl BusinessResponse {
    pub fn new(customer: Customer, business: Option<BusinessProfile>) -> Self {
        Self {
            id: customer.id,
            customer_type: customer.customer_type,
            name: customer.name.clone(),
            email: customer.email.clone(),
            birth_date: customer.birth_date,
            phone: customer.phone.clone(),
            address: Address::from(&customer),
            business,
        }
    }
}

// --- PAYLOADS ---

fn validate_cpf_digits(cpf: &str) -> Result<(), ValidationError> {
    let digits = only_digits(cpf);
    if digits.len() != 11 {
        return Err(ValidationError::new("cpf_length").with_message("cpf must have 11 digits".into()));
    }
    if !is_valid_cpf(&digits) {
        return Err(ValidationError::new("cpf_check").with_message("Invalid cpf".into()));
    }
    Ok(())
}

fn validate_cnpj_digits(cnpj: &str) -> Result<(), ValidationError> {
    let digits = only_digits(cnpj);
    if digits.len() != 14 {
        return Err(ValidationError::new("cnpj_length").with_message("cnpj must have 14 digits".into()));
    }
    if !is_valid_cnpj(&digits) {
        return Err(ValidationError::new("cnpj_check").with_message("Invalid cnpj".into()));
    }
    Ok(())
}

fn validate_positive_income(income: &Decimal) -> Result<(), ValidationError> {
    if income.is_sign_negative() || income.is_zero() {
        return Err(
            ValidationError::new("monthly_income_positive")
                .with_message("monthlyIncome must be positive".into()),
        );
    }
    Ok(())
}

fn trim_opt(v: &mut Option<String>) {
    if let Some(s) = v {
        *s = s.trim().to_string();
    }
}

fn trim_double_opt(v: &mut Option<Option<String>>) {
    if let Some(Some(s)) = v {
        *s = s.trim().to_string();
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePersonPayload {
    #[validate(length(min = 3, message = "name must have at least 3 characters"))]
    #[schema(example = "Maria da Silva")]
    pub name: String,

    #[validate(email(message = "email must be valid"))]
    #[schema(example = "maria@email.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must have at least 8 characters"))]
    pub password: String,

    #[schema(value_type = Option<String>, format = Date, example = "1990-05-20")]
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,

    pub street: Option<String>,
    pub number: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    #[validate(length(max = 2, message = "state must have max 2 chars"))]
    #[schema(example = "SP")]
    pub state: Option<String>,
    pub zip_code: Option<String>,

    #[validate(custom(function = validate_cpf_digits))]
    #[schema(example = "52998224725")]
    pub cpf: String,

    #[validate(custom(function = validate_positive_income))]
    pub monthly_income: Option<Decimal>,
}

impl CreatePersonPayload {
    // Normalizações equivalentes às transformações da camada de schema:
    // trim nos textos, e-mail minúsculo, UF maiúscula, CPF só dígitos.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.cpf = only_digits(&self.cpf);
        trim_opt(&mut self.phone);
        trim_opt(&mut self.street);
        trim_opt(&mut self.number);
        trim_opt(&mut self.district);
        trim_opt(&mut self.city);
        trim_opt(&mut self.zip_code);
        if let Some(state) = &mut self.state {
            *state = state.trim().to_uppercase();
        }
    }
}

fn validate_business_registration(payload: &CreateBusinessPayload) -> Result<(), ValidationError> {
    if !payload.is_icms_exempt
        && payload
            .state_registration
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .is_empty()
    {
        return Err(
            ValidationError::new("state_registration_required")
                .with_message("stateRegistration is required when not ICMS exempt".into()),
        );
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = validate_business_registration))]
pub struct CreateBusinessPayload {
    #[validate(length(min = 3, message = "name must have at least 3 characters"))]
    #[schema(example = "Padaria Estrela Ltda")]
    pub name: String,

    #[validate(email(message = "email must be valid"))]
    #[schema(example = "contato@estrela.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must have at least 8 characters"))]
    pub password: String,

    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,

    pub street: Option<String>,
    pub number: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    #[validate(length(max = 2, message = "state must have max 2 chars"))]
    pub state: Option<String>,
    pub zip_code: Option<String>,

    #[validate(custom(function = validate_cnpj_digits))]
    #[schema(example = "11222333000181")]
    pub cnpj: String,

    pub is_icms_exempt: bool,
    pub state_registration: Option<String>,
}

impl CreateBusinessPayload {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.cnpj = only_digits(&self.cnpj);
        trim_opt(&mut self.phone);
        trim_opt(&mut self.street);
        trim_opt(&mut self.number);
        trim_opt(&mut self.district);
        trim_opt(&mut self.city);
        trim_opt(&mut self.zip_code);
        trim_opt(&mut self.state_registration);
        if let Some(state) = &mut self.state {
            *state = state.trim().to_uppercase();
        }
    }
}

// Nos payloads de atualização, `Option<Option<T>>` distingue campo ausente
// (ignorado) de `null` explícito (limpa o valor no banco).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = validate_person_update))]
pub struct UpdatePersonPayload {
    #[validate(length(min = 3, message = "name must have at least 3 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "email must be valid"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must have at least 8 characters"))]
    pub password: Option<String>,

    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub phone: Option<Option<String>>,

    #[serde(default)]
    pub street: Option<Option<String>>,
    #[serde(default)]
    pub number: Option<Option<String>>,
    #[serde(default)]
    pub district: Option<Option<String>>,
    #[serde(default)]
    pub city: Option<Option<String>>,
    #[serde(default)]
    pub state: Option<Option<String>>,
    #[serde(default)]
    pub zip_code: Option<Option<String>>,

    #[validate(custom(function = validate_cpf_digits))]
    pub cpf: Option<String>,

    #[serde(default)]
    pub monthly_income: Option<Option<Decimal>>,
}

fn validate_person_update(payload: &UpdatePersonPayload) -> Result<(), ValidationError> {
    let empty = payload.name.is_none()
        && payload.email.is_none()
        && payload.password.is_none()
        && payload.birth_date.is_none()
        && payload.phone.is_none()
        && payload.street.is_none()
        && payload.number.is_none()
        && payload.district.is_none()
        && payload.city.is_none()
        && payload.state.is_none()
        && payload.zip_code.is_none()
        && payload.cpf.is_none()
        && payload.monthly_income.is_none();
    if empty {
        return Err(
            ValidationError::new("at_least_one")
                .with_message("at least one field must be provided".into()),
        );
    }

    if let Some(Some(state)) = &payload.state {
        if state.trim().len() > 2 {
            return Err(
                ValidationError::new("state_length")
                    .with_message("state must have max 2 chars".into()),
            );
        }
    }

    if let Some(Some(income)) = &payload.monthly_income {
        validate_positive_income(income)?;
    }

    Ok(())
}

impl UpdatePersonPayload {
    pub fn normalize(&mut self) {
        if let Some(name) = &mut self.name {
            *name = name.trim().to_string();
        }
        if let Some(email) = &mut self.email {
            *email = email.trim().to_lowercase();
        }
        if let Some(cpf) = &mut self.cpf {
            *cpf = only_digits(cpf);
        }
        trim_double_opt(&mut self.phone);
        trim_double_opt(&mut self.street);
        trim_double_opt(&mut self.number);
        trim_double_opt(&mut self.district);
        trim_double_opt(&mut self.city);
        trim_double_opt(&mut self.zip_code);
        if let Some(Some(state)) = &mut self.state {
            *state = state.trim().to_uppercase();
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = validate_business_update))]
pub struct UpdateBusinessPayload {
    #[validate(length(min = 3, message = "name must have at least 3 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "email must be valid"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must have at least 8 characters"))]
    pub password: Option<String>,

    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub phone: Option<Option<String>>,

    #[serde(default)]
    pub street: Option<Option<String>>,
    #[serde(default)]
    pub number: Option<Option<String>>,
    #[serde(default)]
    pub district: Option<Option<String>>,
    #[serde(default)]
    pub city: Option<Option<String>>,
    #[serde(default)]
    pub state: Option<Option<String>>,
    #[serde(default)]
    pub zip_code: Option<Option<String>>,

    #[validate(custom(function = validate_cnpj_digits))]
    pub cnpj: Option<String>,

    pub is_icms_exempt: Option<bool>,
    #[serde(default)]
    pub state_registration: Option<Option<String>>,
}

fn validate_business_update(payload: &UpdateBusinessPayload) -> Result<(), ValidationError> {
    let empty = payload.name.is_none()
        && payload.email.is_none()
        && payload.password.is_none()
        && payload.birth_date.is_none()
        && payload.phone.is_none()
        && payload.street.is_none()
        && payload.number.is_none()
        && payload.district.is_none()
        && payload.city.is_none()
        && payload.state.is_none()
        && payload.zip_code.is_none()
        && payload.cnpj.is_none()
        && payload.is_icms_exempt.is_none()
        && payload.state_registration.is_none();
    if empty {
        return Err(
            ValidationError::new("at_least_one")
                .with_message("at least one field must be provided".into()),
        );
    }

    if let Some(Some(state)) = &payload.state {
        if state.trim().len() > 2 {
            return Err(
                ValidationError::new("state_length")
                    .with_message("state must have max 2 chars".into()),
            );
        }
    }

    // Quem declara não ser isento de ICMS precisa informar a inscrição estadual.
    if payload.is_icms_exempt == Some(false) {
        let missing = !matches!(
            &payload.state_registration,
            Some(Some(s)) if !s.trim().is_empty()
        );
        if missing {
            return Err(
                ValidationError::new("state_registration_required")
                    .with_message("stateRegistration is required when not ICMS exempt".into()),
            );
        }
    }

    Ok(())
}

impl UpdateBusinessPayload {
    pub fn normalize(&mut self) {
        if let Some(name) = &mut self.name {
            *name = name.trim().to_string();
        }
        if let Some(email) = &mut self.email {
            *email = email.trim().to_lowercase();
        }
        if let Some(cnpj) = &mut self.cnpj {
            *cnpj = only_digits(cnpj);
        }
        trim_double_opt(&mut self.phone);
        trim_double_opt(&mut self.street);
        trim_double_opt(&mut self.number);
        trim_double_opt(&mut self.district);
        trim_double_opt(&mut self.city);
        trim_double_opt(&mut self.zip_code);
        trim_double_opt(&mut self.state_registration);
        if let Some(Some(state)) = &mut self.state {
            *state = state.trim().to_uppercase();
        }
    }
}

// --- ESTRUTURAS INTERNAS (serviço -> repositório) ---

// Campos comuns de Customer já normalizados e com a senha trocada pelo hash.
#[derive(Debug, Clone)]
pub struct NewCustomerCommon {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPersonProfile {
    pub cpf: String,
    pub monthly_income: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewBusinessProfile {
    pub cnpj: String,
    pub is_icms_exempt: bool,
    pub state_registration: Option<String>,
}

// Patch parcial: `None` = não tocar; `Some(None)` = limpar a coluna.
#[derive(Debug, Clone, Default)]
pub struct CustomerCommonPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub phone: Option<Option<String>>,
    pub street: Option<Option<String>>,
    pub number: Option<Option<String>>,
    pub district: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub zip_code: Option<Option<String>>,
}

impl CustomerCommonPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.birth_date.is_none()
            && self.phone.is_none()
            && self.street.is_none()
            && self.number.is_none()
            && self.district.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PersonProfilePatch {
    pub cpf: Option<String>,
    pub monthly_income: Option<Option<Decimal>>,
}

impl PersonProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.cpf.is_none() && self.monthly_income.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BusinessProfilePatch {
    pub cnpj: Option<String>,
    pub is_icms_exempt: Option<bool>,
    pub state_registration: Option<Option<String>>,
}

impl BusinessProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.cnpj.is_none() && self.is_icms_exempt.is_none() && self.state_registration.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_person_payload() -> CreatePersonPayload {
        serde_json::from_value(serde_json::json!({
            "name": "Maria da Silva",
            "email": "Maria@Email.com",
            "password": "supersecret",
            "cpf": "529.982.247-25"
        }))
        .unwrap()
    }

    #[test]
    fn person_create_normalizes_email_and_cpf() {
        let mut payload = valid_person_payload();
        payload.normalize();
        assert_eq!(payload.email, "maria@email.com");
        assert_eq!(payload.cpf, "52998224725");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn person_create_rejects_bad_cpf() {
        let mut payload = valid_person_payload();
        payload.cpf = "52998224726".into();
        payload.normalize();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn person_create_rejects_repeated_cpf_sequence() {
        let mut payload = valid_person_payload();
        payload.cpf = "11111111111".into();
        payload.normalize();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn person_create_rejects_negative_income() {
        let mut payload = valid_person_payload();
        payload.monthly_income = Some(dec!(-10.00));
        payload.normalize();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn business_requires_state_registration_when_not_exempt() {
        let mut payload: CreateBusinessPayload = serde_json::from_value(serde_json::json!({
            "name": "Padaria Estrela Ltda",
            "email": "contato@estrela.com",
            "password": "supersecret",
            "cnpj": "11222333000181",
            "isIcmsExempt": false
        }))
        .unwrap();
        payload.normalize();
        let err = payload.validate().unwrap_err();
        let messages = format!("{err:?}");
        assert!(messages.contains("stateRegistration is required"));

        payload.state_registration = Some("ISENTO123".into());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn business_exempt_allows_missing_state_registration() {
        let mut payload: CreateBusinessPayload = serde_json::from_value(serde_json::json!({
            "name": "Padaria Estrela Ltda",
            "email": "contato@estrela.com",
            "password": "supersecret",
            "cnpj": "11222333000181",
            "isIcmsExempt": true
        }))
        .unwrap();
        payload.normalize();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let payload: UpdatePersonPayload = serde_json::from_value(serde_json::json!({
            "phone": null,
            "name": "Novo Nome"
        }))
        .unwrap();

        // phone veio como null explícito: limpar; street ausente: não tocar
        assert_eq!(payload.phone, Some(None));
        assert!(payload.street.is_none());
        assert_eq!(payload.name.as_deref(), Some("Novo Nome"));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn update_requires_at_least_one_field() {
        let payload: UpdatePersonPayload = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn update_rejects_unknown_fields() {
        let result: Result<UpdatePersonPayload, _> = serde_json::from_value(serde_json::json!({
            "role": "ADMIN"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn business_update_turning_off_exemption_needs_registration() {
        let payload: UpdateBusinessPayload = serde_json::from_value(serde_json::json!({
            "isIcmsExempt": false
        }))
        .unwrap();
        assert!(payload.validate().is_err());

        let payload: UpdateBusinessPayload = serde_json::from_value(serde_json::json!({
            "isIcmsExempt": false,
            "stateRegistration": "123456"
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn person_response_never_serializes_password_hash() {
        let customer = Customer {
            id: 1,
            customer_type: CustomerType::Person,
            name: "Maria".into(),
            email: "maria@email.com".into(),
            password_hash: "$2b$10$segredo".into(),
            birth_date: None,
            phone: None,
            street: None,
            number: None,
            district: None,
            city: None,
            state: None,
            zip_code: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let profile = PersonProfile {
            customer_id: 1,
            cpf: "52998224725".into(),
            monthly_income: Some(dec!(2500.00)),
        };

        let body = serde_json::to_value(PersonResponse::new(customer, Some(profile))).unwrap();
        let raw = body.to_string();
        assert!(!raw.contains("passwordHash"));
        assert!(!raw.contains("password_hash"));
        assert!(!raw.contains("segredo"));
        assert_eq!(body["type"], "PERSON");
        assert_eq!(body["person"]["cpf"], "52998224725");
    }
}

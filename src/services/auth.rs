// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    common::error::AppError,
    db::CustomerRepository,
    models::{
        auth::{AuthUser, Claims, LoginPayload, LoginResponse, LoginUser},
        customer::{Customer, CustomerType},
    },
};

#[derive(Clone)]
pub struct AuthService {
    customer_repo: CustomerRepository,
    jwt_secret: String,
    expires_secs: u64,
    issuer: String,
}

impl AuthService {
    pub fn new(
        customer_repo: CustomerRepository,
        jwt_secret: String,
        expires_secs: u64,
        issuer: String,
    ) -> Self {
        Self {
            customer_repo,
            jwt_secret,
            expires_secs,
            issuer,
        }
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<LoginResponse, AppError> {
        // E-mail inexistente e senha errada respondem igual, sem vazar qual foi.
        let customer = self
            .customer_repo
            .find_by_email(&payload.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = payload.password;
        let password_hash = customer.password_hash.clone();
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password, &password_hash))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.create_token(&customer)?;
        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.expires_secs,
            user: LoginUser {
                id: customer.id,
                customer_type: customer.customer_type,
                name: customer.name,
                email: customer.email,
            },
        })
    }

    pub fn create_token(&self, customer: &Customer) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.expires_secs as i64);

        let claims = Claims {
            sub: customer.id.to_string(),
            email: customer.email.clone(),
            role: customer.customer_type.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    /// Valida assinatura, expiração e emissor, e traduz as claims
    /// na identidade usada pelos guards.
    pub fn decode_token(&self, token: &str) -> Result<AuthUser, AppError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::Unauthenticated)?;

        let claims = token_data.claims;
        let id: i64 = claims.sub.parse().map_err(|_| AppError::Unauthenticated)?;
        // Uma role fora do enum é rejeitada explicitamente, não ignorada.
        let customer_type: CustomerType = claims
            .role
            .parse()
            .map_err(AppError::UnsupportedCustomerType)?;

        Ok(AuthUser {
            id,
            customer_type,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn service(secret: &str) -> AuthService {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        AuthService::new(
            CustomerRepository::new(pool),
            secret.to_string(),
            900,
            "contas-backend".to_string(),
        )
    }

    fn sample_customer(customer_type: CustomerType) -> Customer {
        Customer {
            id: 42,
            customer_type,
            name: "Maria".into(),
            email: "maria@email.com".into(),
            password_hash: "$2b$10$hash".into(),
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
        }
    }

    #[tokio::test]
    async fn token_round_trip_restores_identity() {
        let svc = service("segredo-de-teste");
        let token = svc
            .create_token(&sample_customer(CustomerType::Person))
            .unwrap();

        let user = svc.decode_token(&token).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.customer_type, CustomerType::Person);
        assert_eq!(user.email, "maria@email.com");
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let token = service("segredo-a")
            .create_token(&sample_customer(CustomerType::Admin))
            .unwrap();

        assert!(matches!(
            service("segredo-b").decode_token(&token),
            Err(AppError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let svc = service("segredo-de-teste");
        let now = Utc::now();
        let claims = Claims {
            sub: "42".into(),
            email: "maria@email.com".into(),
            role: "PERSON".into(),
            iss: "contas-backend".into(),
            iat: (now.timestamp() - 3600) as usize,
            exp: (now.timestamp() - 600) as usize, // além do leeway padrão
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("segredo-de-teste".as_ref()),
        )
        .unwrap();

        assert!(matches!(
            svc.decode_token(&token),
            Err(AppError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn unknown_role_claim_is_rejected() {
        let svc = service("segredo-de-teste");
        let now = Utc::now();
        let claims = Claims {
            sub: "42".into(),
            email: "maria@email.com".into(),
            role: "SUPERUSER".into(),
            iss: "contas-backend".into(),
            iat: now.timestamp() as usize,
            exp: (now.timestamp() + 900) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("segredo-de-teste".as_ref()),
        )
        .unwrap();

        match svc.decode_token(&token) {
            Err(AppError::UnsupportedCustomerType(role)) => assert_eq!(role, "SUPERUSER"),
            other => panic!("esperava UnsupportedCustomerType, veio {other:?}"),
        }
    }
}

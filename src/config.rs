// src/config.rs

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{AccountRepository, CustomerRepository},
    services::{AccountService, AuthService, CustomerService},
};

const DEFAULT_JWT_EXPIRES_SECS: u64 = 900;
const DEFAULT_JWT_ISS: &str = "contas-backend";

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub customer_service: CustomerService,
    pub account_service: AccountService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let expires_secs = match env::var("JWT_EXPIRES_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("JWT_EXPIRES_SECS deve ser um número de segundos")?,
            Err(_) => DEFAULT_JWT_EXPIRES_SECS,
        };
        let issuer = env::var("JWT_ISS").unwrap_or_else(|_| DEFAULT_JWT_ISS.to_string());

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let account_repo = AccountRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            customer_repo.clone(),
            jwt_secret,
            expires_secs,
            issuer,
        );
        let customer_service = CustomerService::new(customer_repo.clone());
        let account_service = AccountService::new(account_repo, customer_repo);

        Ok(Self {
            db_pool,
            auth_service,
            customer_service,
            account_service,
        })
    }
}

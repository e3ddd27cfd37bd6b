// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Persons ---
        handlers::persons::create_person,
        handlers::persons::list_persons,
        handlers::persons::get_person,
        handlers::persons::update_person,
        handlers::persons::delete_person,

        // --- Businesses ---
        handlers::businesses::create_business,
        handlers::businesses::list_businesses,
        handlers::businesses::get_business,
        handlers::businesses::update_business,
        handlers::businesses::delete_business,

        // --- Accounts ---
        handlers::accounts::create_account,
        handlers::accounts::list_accounts,
        handlers::accounts::get_account,
        handlers::accounts::update_account,
        handlers::accounts::delete_account,
        handlers::accounts::get_account_by_number,
        handlers::accounts::update_balance,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::LoginUser,
            models::auth::LoginResponse,

            // --- Customers ---
            models::customer::CustomerType,
            models::customer::Address,
            models::customer::PersonProfile,
            models::customer::BusinessProfile,
            models::customer::PersonResponse,
            models::customer::BusinessResponse,
            models::customer::CreatePersonPayload,
            models::customer::UpdatePersonPayload,
            models::customer::CreateBusinessPayload,
            models::customer::UpdateBusinessPayload,

            // --- Accounts ---
            models::account::AccountType,
            models::account::AccountResponse,
            models::account::CreateAccountPayload,
            models::account::UpdateAccountPayload,
            models::account::BalancePayload,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login e emissão de token"),
        (name = "Persons", description = "Clientes pessoa física"),
        (name = "Businesses", description = "Clientes pessoa jurídica"),
        (name = "Accounts", description = "Contas bancárias")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

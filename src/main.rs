//src/main.rs

use axum::{
    Router,
    handler::Handler,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::middleware::auth::auth_guard;
use crate::middleware::authorize::{admin_only_guard, self_or_admin_guard};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    bootstrap_admin(&app_state).await;

    let app = router(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}

// Garante o ADMIN inicial quando as variáveis de bootstrap estão presentes.
// Falha aqui não derruba o servidor: fica no log e o login de ADMIN não existe.
async fn bootstrap_admin(app_state: &AppState) {
    let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        return;
    };
    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());

    if let Err(e) = app_state
        .customer_service
        .ensure_admin(&name, &email, &password)
        .await
    {
        tracing::error!("🔥 Falha ao garantir o ADMIN de bootstrap: {:?}", e);
    }
}

fn router(app_state: AppState) -> Router {
    // Todas as rotas de contas do dono são self-or-admin. A camada de
    // autorização roda antes do corpo ser lido; a de autenticação, antes dela.
    let my_accounts_routes = Router::new()
        .route(
            "/{my_id}/accounts",
            post(handlers::accounts::create_account).get(handlers::accounts::list_accounts),
        )
        .route(
            "/{my_id}/accounts/{account_id}",
            get(handlers::accounts::get_account)
                .put(handlers::accounts::update_account)
                .delete(handlers::accounts::delete_account),
        )
        .layer(axum_middleware::from_fn(self_or_admin_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let admin_account_routes = Router::new()
        .route("/number/{number}", get(handlers::accounts::get_account_by_number))
        .route("/{account_id}/balance", put(handlers::accounts::update_balance))
        .layer(axum_middleware::from_fn(admin_only_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Nas rotas de clientes os guards variam por método, então a camada vai
    // no handler: cadastro é público, listagem e remoção são de ADMIN.
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/persons",
            post(handlers::persons::create_person).get(
                handlers::persons::list_persons
                    .layer(axum_middleware::from_fn(admin_only_guard))
                    .layer(axum_middleware::from_fn_with_state(
                        app_state.clone(),
                        auth_guard,
                    )),
            ),
        )
        .route(
            "/persons/{id}",
            get(handlers::persons::get_person
                .layer(axum_middleware::from_fn(self_or_admin_guard))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )))
            .put(handlers::persons::update_person
                .layer(axum_middleware::from_fn(self_or_admin_guard))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )))
            .delete(handlers::persons::delete_person
                .layer(axum_middleware::from_fn(admin_only_guard))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                ))),
        )
        .route(
            "/businesses",
            post(handlers::businesses::create_business).get(
                handlers::businesses::list_businesses
                    .layer(axum_middleware::from_fn(admin_only_guard))
                    .layer(axum_middleware::from_fn_with_state(
                        app_state.clone(),
                        auth_guard,
                    )),
            ),
        )
        .route(
            "/businesses/{id}",
            get(handlers::businesses::get_business
                .layer(axum_middleware::from_fn(self_or_admin_guard))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )))
            .put(handlers::businesses::update_business
                .layer(axum_middleware::from_fn(self_or_admin_guard))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )))
            .delete(handlers::businesses::delete_business
                .layer(axum_middleware::from_fn(admin_only_guard))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                ))),
        )
        .nest("/myAccounts", my_accounts_routes)
        .nest("/accounts", admin_account_routes)
        .merge(
            SwaggerUi::new("/api/docs")
                .url("/api/docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state)
}

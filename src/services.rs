pub mod account_policy;
pub mod accounts;
pub use accounts::AccountService;
pub mod auth;
pub use auth::AuthService;
pub mod customers;
pub use customers::CustomerService;

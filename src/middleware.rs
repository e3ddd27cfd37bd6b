pub mod auth;
pub mod authorize;

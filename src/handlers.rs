pub mod accounts;
pub mod auth;
pub mod businesses;
pub mod persons;

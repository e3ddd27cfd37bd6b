pub mod account_repo;
pub use account_repo::AccountRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;

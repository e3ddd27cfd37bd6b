pub mod documents;
pub mod error;

pub use error::AppError;

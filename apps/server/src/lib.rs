pub mod config;
pub mod domain;
pub mod error;
pub mod health;
pub mod state;
pub mod ws;

pub use error::AppError;

mod error;
pub use error::{AppError, Result};
pub mod config;
pub mod gateway;
pub mod models;
pub mod reconciler;
pub mod router;
pub mod shell;
pub mod utils;
pub mod views;

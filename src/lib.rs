pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod matching;
pub mod middleware;
pub mod models;
pub mod services;

pub use error::{AppError, AppResult};

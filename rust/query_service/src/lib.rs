// src/lib.rs

pub mod loader;
pub mod models;

pub use loader::{LoaderError, PriceLoader, DEFAULT_BASE_URL};

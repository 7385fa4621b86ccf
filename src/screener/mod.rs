// src/screener/mod.rs
pub mod client;
pub mod discovery;
pub mod fetcher;
pub mod models;

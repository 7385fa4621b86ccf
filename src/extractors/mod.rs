// src/extractors/mod.rs
pub mod company;
pub mod dom;
pub mod page;
pub mod record;
pub mod sheets;
pub mod tables;

// Re-export the batch entry point for convenience
pub use page::collect_pages;

// src/pivot/mod.rs
pub mod organizer;
pub mod table;
pub mod year;

pub use organizer::organize_sheets;

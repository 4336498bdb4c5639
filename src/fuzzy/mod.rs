// src/fuzzy/mod.rs
pub mod align;

// src/core/mod.rs
pub mod cast;
pub mod graph;
pub mod resolver;
pub mod types;

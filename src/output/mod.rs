// src/output/mod.rs
pub mod json;

pub use json::{write_report, Report};

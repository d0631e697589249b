//! Report output formats

pub mod json;
pub mod table;
pub mod text;

//! SQL layer: statement parsing, condition evaluation, and execution

pub mod condition;
pub mod engine;
pub mod parser;
pub mod types;

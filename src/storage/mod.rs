//! Storage layer: tables, databases, and the on-disk root managing them

pub mod database;
pub mod manager;
pub mod table;

pub use database::Database;
pub use manager::DatabaseManager;
pub use table::Table;

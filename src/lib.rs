//! tabdb - A minimal relational data store in Rust
//!
//! This crate provides a small SQL-like database with:
//! - Line-oriented text protocol (one statement in, one `[OK]`/`[ERROR]` result out)
//! - A recursive condition engine (AND/OR trees over comparison nodes)
//! - Untyped text tables persisted as tab-separated files
//! - A multi-database registry backed by one directory per database

pub mod error;
pub mod server;
pub mod sql;
pub mod storage;

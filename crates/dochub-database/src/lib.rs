//! # dochub-database
//!
//! PostgreSQL database connection management, trait seams for the
//! mapping/template/system-of-record repositories, their concrete
//! Postgres implementations, and in-memory implementations for
//! single-node development and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;

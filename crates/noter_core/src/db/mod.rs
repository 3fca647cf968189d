//! SQLite bootstrap for the note store.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing `SqliteNoteStore`.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Note documents are not read or written before migrations succeed.
//! - Failures surface as `StoreError`, the same type the store reports.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

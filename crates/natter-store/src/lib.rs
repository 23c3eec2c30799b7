//! # natter-store
//!
//! Relational persistence for the natter backend, backed by SQLite through an
//! async `sqlx` connection pool.
//!
//! The crate exposes a cloneable [`Store`] handle that owns the pool and
//! provides typed query helpers for every domain entity.  Migrations run
//! before a handle is handed out, so a constructed `Store` always sees the
//! current schema.

pub mod chats;
pub mod contacts;
pub mod database;
pub mod demo;
pub mod members;
pub mod migrations;
pub mod models;

mod error;

pub use database::Store;
pub use error::StoreError;
pub use models::*;

//! # Database module: PostgreSQL persistence
//!
//! Entirely gated behind `#[cfg(feature = "server")]` so builds without a database
//! never pull in SQLx.
//!
//! - [`connect`] opens a pool (up to 5 connections) and runs the embedded
//!   migrations from `packages/api/migrations`.
//! - [`PgStore`] implements [`store::CredentialStore`] and [`store::NoteStore`] over
//!   that pool. Unique-constraint violations surface as
//!   [`store::StoreError::Conflict`].

mod pool;
mod postgres;

pub use pool::connect;
pub use postgres::PgStore;

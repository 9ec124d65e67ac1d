//! Shopkeep: profile stores.
//!
//! Document-store adapters behind `ProfileRepository`: a PostgreSQL JSONB
//! table for deployments and an in-memory map for local runs and tests.

pub mod memory;
pub mod pg_profile_repository;
pub mod schema;

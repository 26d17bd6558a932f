//! `permsync-catalog-client` — blocking REST client for the catalog API.
//!
//! Implements the engine's `CatalogSource` seam over the catalog's v3
//! REST endpoints. No async runtime required.

pub mod auth;
pub mod client;
pub mod config;

pub use client::{normalize_segment, CatalogClient};
pub use config::ClientConfig;

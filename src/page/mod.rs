//! The page side: document collaborator, persistent store, and the
//! in-memory simulated page with its scraper-backed selector queries.

pub mod dom;
mod mirror;
pub mod sim;
pub mod store;

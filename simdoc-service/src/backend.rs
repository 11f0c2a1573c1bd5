//! Search backend integration.
//!
//! Typed client for the external snippet index's REST API. The index does
//! the matching and ranking; this module only moves requests and responses
//! across the wire and translates failures.

mod client;
mod responses;
#[cfg(test)]
pub(crate) mod testing;

pub use client::BackendClient;

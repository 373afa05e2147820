//! HTTP access layer for the Oura API.
//!
//! All outbound traffic goes through `OuraClient::fetch`, which handles
//! authentication, timeouts and error normalisation.

mod client;

// Re-export client's public API
pub use client::OuraClient;

//! Oura ring Model Context Protocol implementation.
//!
//! The implementation is organized into:
//!
//! - `config`: Environment based configuration
//! - `error`: Error types and conversions
//! - `http`: The single gateway to the Oura v2 API
//! - `tools`: One text formatting tool per Oura data category
//! - `oura`: The MCP server registering those tools
//! - `auth`: Optional GitHub OAuth protection for the MCP endpoint

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod oura;
pub mod tools;

//! HTTP client adapter for the dashboard API
//!
//! Every request goes through [`ApiTransport`], so the query and mutation
//! layers can be driven by the real HTTP client or by an in-memory fake.

mod transport;

pub use transport::{get_json, post_json, ApiTransport, HttpTransport};

#[cfg(test)]
pub(crate) mod fake;

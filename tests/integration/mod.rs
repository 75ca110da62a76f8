//! Integration Tests Module
//!
//! End-to-end tests that drive the inspector through complete resolution
//! flows, and the HTTP fetchers against a local server.

pub mod http_fetchers;
pub mod inspector_flows;

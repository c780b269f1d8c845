//! clicktag - click tracking redirect service
//!
//! Every click on a tracked link is answered with a redirect to its target URL.
//! When the click carries enterprise and customer identifiers, the service also
//! resolves the customer's latest conversation turn through the GraphQL backend
//! and records a `DATA_POINT` label against that interaction.
//!
//! # Architecture
//! - `services`: click parsing and the tagging pipeline (profile → session → conversation → label)
//! - `backend`: GraphQL backend abstraction and the AppSync client
//! - `api`: HTTP handlers and middleware
//! - `config`: static configuration (TOML + environment)
//! - `runtime`: startup, server mode and graceful shutdown
//! - `system`: logging

pub mod api;
pub mod backend;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod system;

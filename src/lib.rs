//! Short-lived verification codes keyed by login, with an attempt counter.
//!
//! [`domain_port::VerificationStore`] is the contract. [`infra_redis`] implements
//! it over Redis and [`infra_memory`] in process.

pub mod logger;
pub mod settings;

pub mod context;

pub mod domain_model;
pub mod domain_port;
pub mod infra_memory;
pub mod infra_redis;

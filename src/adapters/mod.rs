//! Adapters - implementations of the ports plus the HTTP entry shims.

pub mod assistant;
pub mod http;
pub mod notify;
pub mod platform;

//! Conversations platform REST adapter.

mod rest_client;
mod wire;

pub use rest_client::{PlatformRestClient, PlatformRestConfig};

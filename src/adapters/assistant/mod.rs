//! Assistant service REST adapter.

mod rest_client;

pub use rest_client::{AssistantRestClient, AssistantRestConfig};

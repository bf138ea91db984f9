//! Assistant Relay - conversation handoff control plane.
//!
//! This crate bridges a hosted multi-party conversation channel with an
//! external conversational-AI assistant and, conditionally, a human-staffed
//! workflow engine. It routes new messages to the assistant, authenticates
//! the assistant's asynchronous callbacks, and arbitrates which of the two
//! consumers owns message delivery for a conversation at any instant.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod security;

//! Request authentication primitives.

pub mod signature;

pub use signature::{hex_encode, CallbackSigner, DEFAULT_TOKEN_TTL_SECS};

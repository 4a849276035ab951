//! Security primitives.

pub mod credentials;

pub use credentials::{LlmCredentials, SecretString};

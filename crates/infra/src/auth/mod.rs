//! Credential storage adapters

pub mod store;

pub use store::{CriticalFailureCallback, InMemoryCredentialStore};

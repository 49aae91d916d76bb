//! Credential ports consumed by the transport

pub mod ports;

//! # larkexport Common
//!
//! Generic building blocks shared by the larkexport crates.
//!
//! Nothing in this crate knows about chats, messages or credentials; it only
//! provides reusable runtime primitives that the domain-aware crates compose.
//!
//! ## Modules
//! - [`resilience`]: request pacing (the rate-limited FIFO task queue)

pub mod resilience;

//! Resilience patterns for pacing outbound work
//!
//! This module provides **generic, reusable** pacing primitives. The
//! implementations are generic over the task's success and error types and
//! have no knowledge of the API they protect.
//!
//! - **Rate-limited task queue**: serialises asynchronous units of work in
//!   FIFO order and enforces a minimum spacing between task starts.

pub mod task_queue;

pub use task_queue::{QueueError, RateLimitedQueue, TaskHandle};

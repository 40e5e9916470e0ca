//! Bounded Ring Buffer
//!
//! Fixed-capacity FIFO windows used to smooth per-frame signals.
//! Pushing into a full window evicts the oldest sample.

mod buffer;

pub use buffer::{RingBuffer, DEFAULT_CAPACITY};

//! Session Desk
//!
//! Re-exports the core library for benchmarks and cross-crate tests.

pub use desk_core::*;

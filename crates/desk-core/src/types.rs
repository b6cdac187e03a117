//! Core domain types for the trading session desk.

pub mod order;
pub mod pair;
pub mod session;
pub mod session_request;

pub use order::*;
pub use pair::*;
pub use session::*;
pub use session_request::*;

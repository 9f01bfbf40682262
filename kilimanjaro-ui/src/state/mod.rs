//! State Management
//!
//! Global application state and the shared realtime connection.

pub mod global;
pub mod realtime;

pub use global::{provide_global_state, GlobalState};
pub use realtime::init_realtime;

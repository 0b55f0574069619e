//! epa-admin: Event processor admin coordinator
//!
//! The admin daemon tracks which connected clients run which event
//! processors and turns operator requests (pause, start, split, merge,
//! move) into commands for exactly the clients running the targeted
//! processor. It also aggregates the processor state clients report into
//! per-component views.

pub mod connection;
pub mod coordinator;
pub mod grouping;
pub mod ipc;
pub mod state;

pub use coordinator::EventProcessorAdminService;
pub use state::AdminState;

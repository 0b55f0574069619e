//! epa-core: Core abstractions and configuration for the event processor
//! admin coordinator
//!
//! This crate provides the shared identifier types, collaborator traits,
//! errors and configuration used by the admin daemon and its tests.

pub mod access;
pub mod config;
pub mod error;
pub mod ipc;
pub mod traits;
pub mod types;

pub use error::{AdminError, DispatchError};
pub use types::{ClientId, EventProcessorIdentifier, EventProcessorInfo, Principal, SegmentId};

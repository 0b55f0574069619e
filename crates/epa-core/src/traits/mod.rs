//! Core trait definitions

mod access;
mod client;
mod publisher;

pub use access::AccessController;
pub use client::{ClientProcessor, ClientRegistry};
pub use publisher::CommandPublisher;

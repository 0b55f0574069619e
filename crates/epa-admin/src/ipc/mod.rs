//! IPC server for operator tools
//!
//! Provides the localhost TCP server that operator tools use to query
//! and control event processors through the running admin daemon.

mod server;

pub use server::IpcServer;

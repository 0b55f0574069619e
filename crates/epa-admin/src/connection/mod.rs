//! Connected clients and command delivery

mod command;
mod publisher;
mod registry;

pub use command::{ClientCommand, Instruction};
pub use publisher::ChannelPublisher;
pub use registry::{ClientRegistration, ClientSession, ConnectedClients};

//! Wire-level packet structures for the MySQL client/server protocol.

pub(crate) mod auth;
pub(crate) mod capabilities;
pub(crate) mod column;
pub(crate) mod command;
pub(crate) mod err;
pub(crate) mod handshake;
pub(crate) mod ok;
pub(crate) mod packet;
pub(crate) mod row;
pub(crate) mod status;
#[allow(clippy::module_inception)]
pub(crate) mod r#type;

pub(crate) use auth::{AuthPlugin, AuthSwitch};
pub(crate) use capabilities::Capabilities;
pub(crate) use column::ColumnDefinition;
pub(crate) use err::ErrPacket;
pub(crate) use handshake::{Handshake, HandshakeResponse};
pub(crate) use ok::OkPacket;
pub(crate) use r#type::TypeId;
pub(crate) use status::Status;

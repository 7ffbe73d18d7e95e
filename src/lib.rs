//! MQTT v3.1.1 protocol codec

#![deny(unsafe_code)]

#[macro_use]
mod utils;

mod codec;
mod decode;
mod encode;
mod packet;

pub mod error;
pub mod types;

pub use self::codec::Codec;
pub use self::packet::{
    Connect, ConnectAck, ConnectAckReason, LastWill, Packet, Publish, SubscribeReturnCode,
};
pub use self::types::{ConnectAckFlags, ConnectFlags, QoS};

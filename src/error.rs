use std::io;

use bytestring::ByteString;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, thiserror::Error, Deserialize, Serialize)]
pub enum DecodeError {
    #[error("Invalid protocol name")]
    InvalidProtocol,
    #[error("Unsupported protocol level")]
    UnsupportedProtocolLevel,
    #[error("Connect frame's reserved flag is set")]
    ConnectReservedFlagSet,
    #[error("ConnectAck frame's reserved flag is set")]
    ConnAckReservedFlagSet,
    #[error("Reserved fixed header flags are set")]
    ReservedHeaderFlagSet,
    #[error("Session present flag is set on a refused connect acknowledgement")]
    UnexpectedSessionPresent,
    #[error("Invalid return code")]
    InvalidReturnCode,
    #[error("Invalid qos level")]
    InvalidQos,
    #[error("Password flag is set without the username flag")]
    PasswordWithoutUsername,
    #[error("Invalid client id")]
    InvalidClientId,
    #[error("Topic filter list is empty")]
    EmptyTopicFilters,
    #[error("Invalid length")]
    InvalidLength,
    #[error("Frame body was not consumed to its declared remaining length")]
    RemainingLengthMismatch,
    #[error("Malformed packet")]
    MalformedPacket,
    #[error("Unsupported packet type")]
    UnsupportedPacketType,
    #[error("Max size exceeded")]
    MaxSizeExceeded,
    #[error("utf8 error")]
    Utf8Error,
    #[error("io error, {:?}", _0)]
    Io(ByteString),
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> DecodeError {
        DecodeError::Io(e.to_string().into())
    }
}

#[derive(Debug, Clone, thiserror::Error, Deserialize, Serialize)]
pub enum EncodeError {
    #[error("Packet is bigger than the maximum remaining length")]
    OverMaxPacketSize,
    #[error("Invalid length")]
    InvalidLength,
    #[error("Malformed packet")]
    MalformedPacket,
    #[error("Packet id is required")]
    PacketIdRequired,
    #[error("io error, {:?}", _0)]
    Io(ByteString),
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> EncodeError {
        EncodeError::Io(e.to_string().into())
    }
}

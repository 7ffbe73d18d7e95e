use std::cell::Cell;

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{DecodeError, EncodeError};
use crate::packet::Packet;
use crate::types::{FixedHeader, MAX_PACKET_SIZE};
use crate::utils::decode_variable_length;
use crate::{decode, encode};

#[derive(Debug, Clone)]
/// Mqtt v3.1.1 protocol codec
pub struct Codec {
    state: Cell<DecodeState>,
    max_size: Cell<u32>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum DecodeState {
    FrameHeader,
    Frame(FixedHeader),
}

impl Codec {
    /// Create `Codec` instance
    pub fn new(max_packet_size: u32) -> Self {
        Codec { state: Cell::new(DecodeState::FrameHeader), max_size: Cell::new(max_packet_size) }
    }

    /// Set max inbound frame size.
    ///
    /// If max size is set to `0`, size is unlimited.
    /// By default max size is set to `0`
    pub fn set_max_size(&mut self, size: u32) {
        self.max_size.set(size);
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Decoder for Codec {
    type Item = (Packet, u32);
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, DecodeError> {
        loop {
            match self.state.get() {
                DecodeState::FrameHeader => {
                    if src.len() < 2 {
                        return Ok(None);
                    }
                    let first_byte = src.as_ref()[0];
                    match decode_variable_length(&src.as_ref()[1..])? {
                        Some((remaining_length, consumed)) => {
                            let max_size = self.max_size.get();
                            if max_size != 0 && max_size < remaining_length {
                                return Err(DecodeError::MaxSizeExceeded);
                            }
                            src.advance(consumed + 1);
                            self.state
                                .set(DecodeState::Frame(FixedHeader { first_byte, remaining_length }));
                            if src.len() < remaining_length as usize {
                                // extend the receive buffer to fit the whole frame
                                src.reserve(remaining_length as usize);
                                return Ok(None);
                            }
                        }
                        None => {
                            return Ok(None);
                        }
                    }
                }
                DecodeState::Frame(fixed) => {
                    if src.len() < fixed.remaining_length as usize {
                        return Ok(None);
                    }
                    let packet_buf = src.split_to(fixed.remaining_length as usize);
                    let packet = decode::decode_packet(packet_buf.freeze(), fixed.first_byte)?;
                    self.state.set(DecodeState::FrameHeader);
                    src.reserve(2);
                    return Ok(Some((packet, fixed.remaining_length)));
                }
            }
        }
    }
}

impl Encoder<Packet> for Codec {
    type Error = EncodeError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let content_size = encode::get_encoded_size(&item);
        ensure!(content_size <= MAX_PACKET_SIZE as usize, EncodeError::OverMaxPacketSize);
        dst.reserve(content_size + 5);
        encode::encode(&item, dst, content_size as u32)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use bytestring::ByteString;

    use super::*;
    use crate::packet::{
        Connect, ConnectAck, ConnectAckReason, LastWill, Publish, SubscribeReturnCode,
    };
    use crate::types::QoS;

    #[test]
    fn test_max_size() {
        let mut codec = Codec::default();
        codec.set_max_size(5);

        let mut buf = BytesMut::new();
        buf.extend_from_slice(b"\0\x09");
        assert_eq!(codec.decode(&mut buf).map_err(|e| matches!(e, DecodeError::MaxSizeExceeded)), Err(true));
    }

    #[test]
    fn test_partial_frame() {
        let mut codec = Codec::default();
        let mut buf = BytesMut::new();

        let frame = b"\x10\x0D\x00\x04MQTT\x04\x02\x00\x3C\x00\x01a";

        buf.extend_from_slice(&frame[..1]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&frame[1..5]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&frame[5..]);
        let (packet, remaining_length) = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(remaining_length, 13);
        assert_eq!(
            packet,
            Packet::Connect(Box::new(Connect {
                clean_session: true,
                keep_alive: 60,
                client_id: ByteString::from_static("a"),
                last_will: None,
                username: None,
                password: None,
            }))
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_packet() {
        let mut codec = Codec::default();
        let mut buf = BytesMut::new();

        let pkt = Publish {
            dup: false,
            retain: false,
            qos: QoS::AtMostOnce,
            topic: ByteString::from_static("/test"),
            packet_id: None,
            payload: Bytes::from(Vec::from("a".repeat(260 * 1024))),
        };
        codec.encode(Packet::Publish(pkt.clone()), &mut buf).unwrap();

        let pkt2 =
            if let (Packet::Publish(v), _) = codec.decode(&mut buf).unwrap().unwrap() { v } else { panic!() };
        assert_eq!(pkt, pkt2);
    }

    #[test]
    fn test_round_trip() {
        let packets = vec![
            Packet::Connect(Box::new(Connect {
                clean_session: true,
                keep_alive: 30,
                client_id: ByteString::from_static("device-1"),
                last_will: Some(LastWill {
                    qos: QoS::AtLeastOnce,
                    retain: true,
                    topic: ByteString::from_static("status/device-1"),
                    message: Bytes::from_static(b"offline"),
                }),
                username: Some(ByteString::from_static("user")),
                password: Some(Bytes::from_static(b"pass")),
            })),
            Packet::ConnectAck(ConnectAck {
                session_present: false,
                return_code: ConnectAckReason::ServerUnavailable,
            }),
            Packet::Publish(Publish {
                dup: false,
                retain: false,
                qos: QoS::AtMostOnce,
                topic: ByteString::from_static("a/b"),
                packet_id: None,
                payload: Bytes::from_static(b"data"),
            }),
            Packet::Publish(Publish {
                dup: true,
                retain: false,
                qos: QoS::ExactlyOnce,
                topic: ByteString::from_static("a/b"),
                packet_id: Some(42),
                payload: Bytes::from_static(b"data"),
            }),
            Packet::PublishAck { packet_id: 1 },
            Packet::PublishReceived { packet_id: 2 },
            Packet::PublishRelease { packet_id: 3 },
            Packet::PublishComplete { packet_id: 4 },
            Packet::Subscribe {
                packet_id: 5,
                topic_filters: vec![
                    (ByteString::from_static("a/+"), QoS::AtMostOnce),
                    (ByteString::from_static("b/#"), QoS::AtLeastOnce),
                ],
            },
            Packet::SubscribeAck {
                packet_id: 5,
                status: vec![
                    SubscribeReturnCode::Success(QoS::AtMostOnce),
                    SubscribeReturnCode::Failure,
                ],
            },
            Packet::Unsubscribe { packet_id: 6, topic_filters: vec![ByteString::from_static("a/+")] },
            Packet::UnsubscribeAck { packet_id: 6 },
            Packet::PingRequest,
            Packet::PingResponse,
            Packet::Disconnect,
        ];

        let mut codec = Codec::default();
        let mut buf = BytesMut::new();
        for pkt in &packets {
            codec.encode(pkt.clone(), &mut buf).unwrap();
        }
        for pkt in &packets {
            let (decoded, _) = codec.decode(&mut buf).unwrap().unwrap();
            assert_eq!(&decoded, pkt);
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn test_byte_round_trip() {
        // decoding an accepted frame and re-encoding it reproduces the input
        let frames: &[&[u8]] = &[
            b"\xc0\x00",
            b"\x10\x0D\x00\x04MQTT\x04\x02\x00\x3C\x00\x01a",
            b"\x32\x07\x00\x01t\x00\x07Hi",
            b"\x82\x08\x00\x0A\x00\x03a/b\x02",
            b"\x20\x02\x00\x04",
            b"\x62\x02\x00\x01",
            b"\x90\x05\x12\x34\x01\x80\x02",
            b"\xa2\x10\x12\x34\x00\x04test\x00\x06filter",
        ];

        for frame in frames {
            let mut codec = Codec::default();
            let mut buf = BytesMut::from(*frame);
            let (packet, _) = codec.decode(&mut buf).unwrap().unwrap();
            let mut out = BytesMut::new();
            codec.encode(packet, &mut out).unwrap();
            assert_eq!(&out[..], *frame);
        }
    }
}

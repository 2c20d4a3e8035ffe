use ntex_bytes::{Bytes, BytesMut};

use crate::error::{AmqpEncodeError, AmqpParseError};

/// Marker byte closing every frame.
pub const FRAME_END: u8 = 0xCE;

/// Frame type, channel and payload size.
pub const FRAME_HEADER_LEN: usize = 7;

/// Smallest frame-max a peer may negotiate.
pub const FRAME_MIN_SIZE: u32 = 4096;

/// Preamble sent by a client before the first frame.
pub const PROTOCOL_HEADER: &[u8; 8] = b"AMQP\x00\x00\x09\x01";

pub mod class {
    pub const CONNECTION: u16 = 10;
    pub const CHANNEL: u16 = 20;
    pub const EXCHANGE: u16 = 40;
    pub const QUEUE: u16 = 50;
    pub const BASIC: u16 = 60;
    pub const CONFIRM: u16 = 85;
    pub const TX: u16 = 90;
}

/// Protocol version announced in the protocol header.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
}

impl ProtocolVersion {
    pub const AMQP_0_9_1: ProtocolVersion = ProtocolVersion {
        major: 0,
        minor: 9,
        revision: 1,
    };
}

/// Argument codec of a single AMQP method.
///
/// Frame codec treats method arguments as opaque bytes, implementations of
/// this trait give them a schema.
pub trait MethodArgs: Sized {
    const CLASS_ID: u16;
    const METHOD_ID: u16;

    fn encoded_size(&self) -> usize;

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError>;

    /// Decodes arguments from the argument bytes of a method frame.
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError>;
}

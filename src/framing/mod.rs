use byteorder::{BigEndian, ByteOrder};
use derive_more::{Display, From};
use ntex_bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{decode_bounded, read_u8, Decode, Encode};
use crate::error::{AmqpEncodeError, AmqpParseError};
use crate::message::MessageProperties;
use crate::protocol::{MethodArgs, FRAME_END, FRAME_HEADER_LEN};

/// Frame type octet
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameKind {
    #[display("method")]
    Method = 1,
    #[display("header")]
    Header = 2,
    #[display("body")]
    Body = 3,
    #[display("heartbeat")]
    Heartbeat = 8,
}

impl TryFrom<u8> for FrameKind {
    type Error = AmqpParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FrameKind::Method),
            2 => Ok(FrameKind::Header),
            3 => Ok(FrameKind::Body),
            8 => Ok(FrameKind::Heartbeat),
            _ => Err(AmqpParseError::UnknownFrameType(value)),
        }
    }
}

/// Method frame payload, arguments are kept undecoded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodFrame {
    class_id: u16,
    method_id: u16,
    args: Bytes,
}

impl MethodFrame {
    pub fn new(class_id: u16, method_id: u16, args: Bytes) -> MethodFrame {
        MethodFrame {
            class_id,
            method_id,
            args,
        }
    }

    /// Serializes method arguments into a method payload.
    pub fn from_args<M: MethodArgs>(args: &M) -> Result<MethodFrame, AmqpEncodeError> {
        let mut buf = BytesMut::with_capacity(args.encoded_size());
        args.encode(&mut buf)?;
        Ok(MethodFrame::new(M::CLASS_ID, M::METHOD_ID, buf.freeze()))
    }

    #[inline]
    pub fn class_id(&self) -> u16 {
        self.class_id
    }

    #[inline]
    pub fn method_id(&self) -> u16 {
        self.method_id
    }

    #[inline]
    pub fn arguments(&self) -> &Bytes {
        &self.args
    }

    /// Checks whether the payload carries method `M`.
    pub fn is<M: MethodArgs>(&self) -> bool {
        self.class_id == M::CLASS_ID && self.method_id == M::METHOD_ID
    }

    /// Attempts to decode arguments as method `M`.
    ///
    /// All argument bytes must be consumed.
    pub fn args<M: MethodArgs>(&self) -> Result<M, AmqpParseError> {
        if !self.is::<M>() {
            return Err(AmqpParseError::UnknownMethod {
                class_id: self.class_id,
                method_id: self.method_id,
            });
        }
        let mut input = self.args.clone();
        decode_bounded(&mut input, self.args.len(), M::decode)
    }
}

impl Encode for MethodFrame {
    fn encoded_size(&self) -> usize {
        4 + self.args.len()
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        buf.put_u16(self.class_id);
        buf.put_u16(self.method_id);
        buf.put_slice(&self.args);
        Ok(())
    }
}

impl Decode for MethodFrame {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        let class_id = u16::decode(input)?;
        let method_id = u16::decode(input)?;
        let args = input.split_to(input.len());
        Ok(MethodFrame::new(class_id, method_id, args))
    }
}

/// Content header payload, announces the body that follows.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentHeader {
    pub class_id: u16,
    /// Unused by the protocol, always sent as zero.
    pub weight: u16,
    pub body_size: u64,
    pub properties: MessageProperties,
}

impl ContentHeader {
    pub fn new(class_id: u16, body_size: u64, properties: MessageProperties) -> ContentHeader {
        ContentHeader {
            class_id,
            weight: 0,
            body_size,
            properties,
        }
    }
}

impl Encode for ContentHeader {
    fn encoded_size(&self) -> usize {
        12 + self.properties.encoded_size()
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        buf.put_u16(self.class_id);
        buf.put_u16(self.weight);
        buf.put_u64(self.body_size);
        self.properties.encode(buf)
    }
}

impl Decode for ContentHeader {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        Ok(ContentHeader {
            class_id: u16::decode(input)?,
            weight: u16::decode(input)?,
            body_size: u64::decode(input)?,
            properties: MessageProperties::decode(input)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, From)]
pub enum Payload {
    Method(MethodFrame),
    Header(ContentHeader),
    Body(Bytes),
    #[from(skip)]
    Heartbeat,
}

impl Payload {
    pub fn kind(&self) -> FrameKind {
        match self {
            Payload::Method(_) => FrameKind::Method,
            Payload::Header(_) => FrameKind::Header,
            Payload::Body(_) => FrameKind::Body,
            Payload::Heartbeat => FrameKind::Heartbeat,
        }
    }

    /// Parses payload of a frame of type `kind`, `input` holds exactly the payload bytes.
    fn decode_as(kind: FrameKind, input: &mut Bytes) -> Result<Payload, AmqpParseError> {
        let len = input.len();
        match kind {
            FrameKind::Method => decode_bounded(input, len, MethodFrame::decode).map(Payload::Method),
            FrameKind::Header => {
                decode_bounded(input, len, ContentHeader::decode).map(Payload::Header)
            }
            FrameKind::Body => Ok(Payload::Body(input.split_to(len))),
            FrameKind::Heartbeat => Ok(Payload::Heartbeat),
        }
    }
}

impl Encode for Payload {
    fn encoded_size(&self) -> usize {
        match self {
            Payload::Method(m) => m.encoded_size(),
            Payload::Header(h) => h.encoded_size(),
            Payload::Body(b) => b.len(),
            Payload::Heartbeat => 0,
        }
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        match self {
            Payload::Method(m) => m.encode(buf),
            Payload::Header(h) => h.encode(buf),
            Payload::Body(b) => {
                buf.put_slice(b);
                Ok(())
            }
            Payload::Heartbeat => Ok(()),
        }
    }
}

/// Represents an AMQP 0-9-1 Frame
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Frame {
    channel: u16,
    payload: Payload,
}

impl Frame {
    pub fn new(channel: u16, payload: Payload) -> Frame {
        Frame { channel, payload }
    }

    pub fn method(channel: u16, method: MethodFrame) -> Frame {
        Frame::new(channel, Payload::Method(method))
    }

    pub fn header(channel: u16, header: ContentHeader) -> Frame {
        Frame::new(channel, Payload::Header(header))
    }

    pub fn body(channel: u16, data: Bytes) -> Frame {
        Frame::new(channel, Payload::Body(data))
    }

    /// Heartbeats always travel on channel 0.
    pub fn heartbeat() -> Frame {
        Frame::new(0, Payload::Heartbeat)
    }

    #[inline]
    pub fn kind(&self) -> FrameKind {
        self.payload.kind()
    }

    #[inline]
    pub fn channel(&self) -> u16 {
        self.channel
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_parts(self) -> (u16, Payload) {
        (self.channel, self.payload)
    }
}

/// Fixed part in front of every frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameHeader {
    pub(crate) kind: FrameKind,
    pub(crate) channel: u16,
    pub(crate) size: u32,
}

impl FrameHeader {
    /// Parses the first `FRAME_HEADER_LEN` bytes of `src`.
    pub(crate) fn parse(src: &[u8]) -> Result<FrameHeader, AmqpParseError> {
        if src.len() < FRAME_HEADER_LEN {
            return Err(AmqpParseError::UnexpectedEof(FRAME_HEADER_LEN));
        }
        let kind = FrameKind::try_from(src[0])?;
        let channel = BigEndian::read_u16(&src[1..3]);
        let size = BigEndian::read_u32(&src[3..7]);
        if kind == FrameKind::Heartbeat && size != 0 {
            return Err(AmqpParseError::MalformedHeartbeat(size));
        }
        Ok(FrameHeader {
            kind,
            channel,
            size,
        })
    }

    /// Bytes following the header: payload and frame end.
    pub(crate) fn remaining(&self) -> usize {
        self.size as usize + 1
    }

    /// Decodes payload and frame end, `input` starts right after the header.
    pub(crate) fn decode_frame(&self, input: &mut Bytes) -> Result<Frame, AmqpParseError> {
        let size = self.size as usize;
        decode_check_len!(input, size + 1);
        let mut payload = input.split_to(size);
        let frame_end = read_u8(input)?;
        if frame_end != FRAME_END {
            return Err(AmqpParseError::BadFrameEnd(frame_end));
        }
        let payload = Payload::decode_as(self.kind, &mut payload)?;
        Ok(Frame::new(self.channel, payload))
    }
}

impl Encode for Frame {
    fn encoded_size(&self) -> usize {
        FRAME_HEADER_LEN + self.payload.encoded_size() + 1
    }

    /// Nothing is left in `buf` when encoding fails.
    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        let start = buf.len();
        let result = encode_frame(self, buf);
        if result.is_err() {
            buf.truncate(start);
        }
        result
    }
}

fn encode_frame(frame: &Frame, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
    let size = frame.payload.encoded_size();
    let size_field = u32::try_from(size).map_err(|_| AmqpEncodeError::LengthOverflow(size))?;

    buf.put_u8(frame.kind() as u8);
    buf.put_u16(frame.channel);
    buf.put_u32(size_field);
    let payload_start = buf.len();
    frame.payload.encode(buf)?;
    debug_assert_eq!(buf.len() - payload_start, size);
    buf.put_u8(FRAME_END);
    Ok(())
}

impl Decode for Frame {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        let header = FrameHeader::parse(input)?;
        input.split_to(FRAME_HEADER_LEN);
        header.decode_frame(input)
    }
}

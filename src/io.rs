use std::cell::Cell;

use ntex_bytes::{Buf, BufMut, BytesMut};
use ntex_codec::{Decoder, Encoder};

use crate::codec::Encode;
use crate::error::{AmqpCodecError, ProtocolHeaderError};
use crate::framing::{Frame, FrameHeader};
use crate::protocol::{ProtocolVersion, FRAME_HEADER_LEN, PROTOCOL_HEADER};

/// Frame codec for an AMQP 0-9-1 connection.
///
/// Body frames are yielded one by one, content is not reassembled.
#[derive(Debug)]
pub struct AmqpCodec {
    state: Cell<DecodeState>,
    max_size: usize,
}

#[derive(Debug, Clone, Copy)]
enum DecodeState {
    FrameHeader,
    Frame(FrameHeader),
}

impl Default for AmqpCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl AmqpCodec {
    pub fn new() -> AmqpCodec {
        AmqpCodec {
            state: Cell::new(DecodeState::FrameHeader),
            max_size: 0,
        }
    }

    /// Set max inbound frame payload size.
    ///
    /// If max size is set to `0`, size is unlimited.
    /// By default max size is set to `0`
    pub fn max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Set max inbound frame payload size.
    ///
    /// If max size is set to `0`, size is unlimited.
    /// By default max size is set to `0`
    pub fn set_max_size(&mut self, size: usize) {
        self.max_size = size;
    }
}

impl Decoder for AmqpCodec {
    type Item = Frame;
    type Error = AmqpCodecError;

    fn decode(&self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state.get() {
                DecodeState::FrameHeader => {
                    if src.len() < FRAME_HEADER_LEN {
                        return Ok(None);
                    }

                    let header = FrameHeader::parse(src).map_err(|err| {
                        log::trace!("Rejected frame header {:?}: {}", &src[..FRAME_HEADER_LEN], err);
                        err
                    })?;
                    if self.max_size != 0 && header.size as usize > self.max_size {
                        log::trace!(
                            "Frame payload of {} bytes exceeds max size {}",
                            header.size,
                            self.max_size
                        );
                        return Err(AmqpCodecError::MaxSizeExceeded);
                    }
                    src.advance(FRAME_HEADER_LEN);
                    self.state.set(DecodeState::Frame(header));
                }
                DecodeState::Frame(header) => {
                    if src.len() < header.remaining() {
                        return Ok(None);
                    }

                    self.state.set(DecodeState::FrameHeader);
                    let mut frame_buf = src.split_to(header.remaining()).freeze();
                    let frame = header.decode_frame(&mut frame_buf).map_err(|err| {
                        log::trace!("Rejected {} frame on channel {}: {}", header.kind, header.channel, err);
                        err
                    })?;

                    #[cfg(feature = "frame-trace")]
                    log::trace!("incoming: {:#?}", frame);

                    return Ok(Some(frame));
                }
            }
        }
    }
}

impl Encoder for AmqpCodec {
    type Item = Frame;
    type Error = AmqpCodecError;

    fn encode(&self, item: Self::Item, dst: &mut BytesMut) -> Result<(), Self::Error> {
        #[cfg(feature = "frame-trace")]
        log::trace!("outgoing: {:#?}", item);

        let size = item.encoded_size();
        if dst.remaining_mut() < size {
            dst.reserve(size);
        }

        let len = dst.len();
        item.encode(dst)?;
        debug_assert!(dst.len() - len == size);

        Ok(())
    }
}

const PROTOCOL_HEADER_LEN: usize = 8;
const PROTOCOL_HEADER_PREFIX: &[u8] = b"AMQP\x00";

/// Codec for the protocol header opening a connection.
#[derive(Default, Debug)]
pub struct ProtocolHeaderCodec;

impl Decoder for ProtocolHeaderCodec {
    type Item = ProtocolVersion;
    type Error = ProtocolHeaderError;

    fn decode(&self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < PROTOCOL_HEADER_LEN {
            Ok(None)
        } else {
            let src = src.split_to(PROTOCOL_HEADER_LEN);
            if &src[0..5] != PROTOCOL_HEADER_PREFIX {
                Err(ProtocolHeaderError::InvalidHeader)
            } else if src[..] != PROTOCOL_HEADER[..] {
                Err(ProtocolHeaderError::Incompatible {
                    major: src[5],
                    minor: src[6],
                    revision: src[7],
                })
            } else {
                Ok(Some(ProtocolVersion::AMQP_0_9_1))
            }
        }
    }
}

impl Encoder for ProtocolHeaderCodec {
    type Item = ProtocolVersion;
    type Error = ProtocolHeaderError;

    fn encode(&self, item: Self::Item, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(PROTOCOL_HEADER_LEN);
        dst.put_slice(PROTOCOL_HEADER_PREFIX);
        dst.put_u8(item.major);
        dst.put_u8(item.minor);
        dst.put_u8(item.revision);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ntex_bytes::Bytes;

    use super::*;
    use crate::error::AmqpParseError;
    use crate::framing::FrameKind;
    use crate::protocol::{FRAME_END, FRAME_MIN_SIZE};

    #[test]
    fn test_decode_partial() -> Result<(), AmqpCodecError> {
        let codec = AmqpCodec::new();
        let mut data = BytesMut::new();
        let frame = b"\x03\x00\x05\x00\x00\x00\x03abc\xce\x08\x00\x00";

        // feed one byte at a time
        for byte in &frame[..10] {
            assert!(codec.decode(&mut data)?.is_none());
            data.put_u8(*byte);
        }
        let res = codec.decode(&mut data)?;
        assert!(res.is_none());
        data.put_u8(frame[10]);
        let res = codec.decode(&mut data)?.unwrap();
        assert_eq!(res, Frame::body(5, Bytes::from_static(b"abc")));

        data.put_slice(&frame[11..]);
        assert!(codec.decode(&mut data)?.is_none());
        data.put_slice(b"\x00\x00\x00\x00\xce");
        let res = codec.decode(&mut data)?.unwrap();
        assert_eq!(res.kind(), FrameKind::Heartbeat);
        assert!(data.is_empty());

        Ok(())
    }

    #[test]
    fn test_decode_errors() {
        let codec = AmqpCodec::new();
        let mut data = BytesMut::from(&b"\x07\x00\x00\x00\x00\x00\x00\xce"[..]);
        assert!(matches!(
            codec.decode(&mut data),
            Err(AmqpCodecError::Parse(AmqpParseError::UnknownFrameType(7)))
        ));

        let codec = AmqpCodec::new();
        let mut data = BytesMut::from(&b"\x08\x00\x00\x00\x00\x00\x04"[..]);
        assert!(matches!(
            codec.decode(&mut data),
            Err(AmqpCodecError::Parse(AmqpParseError::MalformedHeartbeat(4)))
        ));

        let codec = AmqpCodec::new();
        let mut data = BytesMut::from(&b"\x03\x00\x01\x00\x00\x00\x01x\x00"[..]);
        assert!(matches!(
            codec.decode(&mut data),
            Err(AmqpCodecError::Parse(AmqpParseError::BadFrameEnd(0)))
        ));
    }

    #[test]
    fn test_max_size() {
        let codec = AmqpCodec::new().max_size(4);
        let mut data = BytesMut::from(&b"\x03\x00\x01\x00\x00\x00\x04abcd\xce"[..]);
        assert!(codec.decode(&mut data).unwrap().is_some());

        // rejected as soon as the header is buffered
        let mut data = BytesMut::from(&b"\x03\x00\x01\x00\x00\x00\x05"[..]);
        assert!(matches!(
            codec.decode(&mut data),
            Err(AmqpCodecError::MaxSizeExceeded)
        ));

        // negotiated frame-max never goes below the protocol minimum
        let codec = AmqpCodec::new().max_size(FRAME_MIN_SIZE as usize);
        let mut data = BytesMut::new();
        data.put_slice(b"\x03\x00\x01");
        data.put_u32(FRAME_MIN_SIZE);
        data.put_slice(&vec![0x61; FRAME_MIN_SIZE as usize]);
        data.put_u8(FRAME_END);
        assert!(codec.decode(&mut data).unwrap().is_some());
        let mut data = BytesMut::new();
        data.put_slice(b"\x03\x00\x01");
        data.put_u32(FRAME_MIN_SIZE + 1);
        assert!(matches!(
            codec.decode(&mut data),
            Err(AmqpCodecError::MaxSizeExceeded)
        ));

        let mut codec = AmqpCodec::default();
        codec.set_max_size(0);
        let mut data = BytesMut::from(&b"\x03\x00\x01\x00\x00\x00\x05abcde\xce"[..]);
        assert!(codec.decode(&mut data).unwrap().is_some());
    }

    #[test]
    fn test_encode() {
        let codec = AmqpCodec::new();
        let mut data = BytesMut::new();
        codec.encode(Frame::heartbeat(), &mut data).unwrap();
        codec
            .encode(Frame::body(1, Bytes::from_static(b"ab")), &mut data)
            .unwrap();
        assert_eq!(
            &data[..],
            b"\x08\x00\x00\x00\x00\x00\x00\xce\x03\x00\x01\x00\x00\x00\x02ab\xce"
        );

        assert_eq!(codec.decode(&mut data).unwrap(), Some(Frame::heartbeat()));
        assert_eq!(
            codec.decode(&mut data).unwrap(),
            Some(Frame::body(1, Bytes::from_static(b"ab")))
        );
    }

    #[test]
    fn test_protocol_header() {
        let codec = ProtocolHeaderCodec;
        let mut data = BytesMut::new();
        codec.encode(ProtocolVersion::AMQP_0_9_1, &mut data).unwrap();
        assert_eq!(&data[..], &PROTOCOL_HEADER[..]);
        assert_eq!(
            codec.decode(&mut data).unwrap(),
            Some(ProtocolVersion::AMQP_0_9_1)
        );

        let mut data = BytesMut::from(&b"AMQP\x00\x00"[..]);
        assert_eq!(codec.decode(&mut data), Ok(None));

        let mut data = BytesMut::from(&b"AMQP\x00\x00\x08\x00"[..]);
        assert_eq!(
            codec.decode(&mut data),
            Err(ProtocolHeaderError::Incompatible {
                major: 0,
                minor: 8,
                revision: 0
            })
        );

        let mut data = BytesMut::from(&b"HTTP/1.1"[..]);
        assert_eq!(codec.decode(&mut data), Err(ProtocolHeaderError::InvalidHeader));

        let mut data = BytesMut::from(&b"AMQP\x03\x01\x00\x00"[..]);
        assert_eq!(codec.decode(&mut data), Err(ProtocolHeaderError::InvalidHeader));
    }
}

#![deny(rust_2018_idioms)]
#![allow(clippy::len_without_is_empty)]

#[macro_use]
mod codec;
mod error;
mod framing;
mod io;
mod message;
pub mod protocol;
pub mod types;

pub use self::codec::{pack_bits, unpack_bits, Decode, DecodeTagged, Encode};
pub use self::error::{AmqpCodecError, AmqpEncodeError, AmqpParseError, ProtocolHeaderError};
pub use self::framing::{ContentHeader, Frame, FrameKind, MethodFrame, Payload};
pub use self::io::{AmqpCodec, ProtocolHeaderCodec};
pub use self::message::{MessageProperties, PropertyFlags, PropertyMask, FLAGS_PER_WORD, PROPERTY_COUNT};

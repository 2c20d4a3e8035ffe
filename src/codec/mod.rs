use ntex_bytes::{Bytes, BytesMut};

use crate::error::{AmqpEncodeError, AmqpParseError};
use crate::types::TypeTag;

macro_rules! decode_check_len {
    ($buf:ident, $size:expr) => {
        if $buf.len() < $size {
            return Err(AmqpParseError::UnexpectedEof($size));
        }
    };
}

mod bits;
pub(crate) mod decode;
mod encode;

pub use self::bits::{pack_bits, unpack_bits};
pub(crate) use self::decode::{decode_bounded, read_u16, read_u32, read_u8};

pub trait Encode {
    /// Exact number of bytes `encode` appends to the buffer.
    fn encoded_size(&self) -> usize;

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError>;
}

/// Decoding of a value whose wire type is fixed by context.
pub trait Decode
where
    Self: Sized,
{
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError>;
}

/// Decoding of a value whose wire type was announced by a tag byte.
pub trait DecodeTagged
where
    Self: Sized,
{
    fn decode_with_tag(input: &mut Bytes, tag: TypeTag) -> Result<Self, AmqpParseError>;
}

use byteorder::{BigEndian, ByteOrder};
use ntex_bytes::{ByteString, Bytes};

use crate::codec::Decode;
use crate::error::AmqpParseError;
use crate::types::ShortStr;

macro_rules! be_read {
    ($input:ident, $fn:ident, $size:expr) => {{
        decode_check_len!($input, $size);
        Ok(BigEndian::$fn(&$input.split_to($size)))
    }};
}

pub(crate) fn read_u8(input: &mut Bytes) -> Result<u8, AmqpParseError> {
    decode_check_len!(input, 1);
    let code = input[0];
    input.split_to(1);
    Ok(code)
}

fn read_i8(input: &mut Bytes) -> Result<i8, AmqpParseError> {
    decode_check_len!(input, 1);
    let code = input[0] as i8;
    input.split_to(1);
    Ok(code)
}

pub(crate) fn read_u16(input: &mut Bytes) -> Result<u16, AmqpParseError> {
    be_read!(input, read_u16, 2)
}

pub(crate) fn read_u32(input: &mut Bytes) -> Result<u32, AmqpParseError> {
    be_read!(input, read_u32, 4)
}

fn read_bytes_u8(input: &mut Bytes) -> Result<Bytes, AmqpParseError> {
    let len = read_u8(input)? as usize;
    decode_check_len!(input, len);
    Ok(input.split_to(len))
}

fn read_bytes_u32(input: &mut Bytes) -> Result<Bytes, AmqpParseError> {
    let len = read_u32(input)? as usize;
    decode_check_len!(input, len);
    Ok(input.split_to(len))
}

/// Decodes a value from exactly `len` bytes of `input`.
///
/// Running out of bytes inside the window, or leaving some unconsumed,
/// means the declared length was wrong.
pub(crate) fn decode_bounded<T, F>(
    input: &mut Bytes,
    len: usize,
    f: F,
) -> Result<T, AmqpParseError>
where
    F: FnOnce(&mut Bytes) -> Result<T, AmqpParseError>,
{
    decode_check_len!(input, len);
    let mut window = input.split_to(len);
    let value = f(&mut window).map_err(|err| match err {
        AmqpParseError::UnexpectedEof(_) => AmqpParseError::LengthMismatch,
        err => err,
    })?;
    if !window.is_empty() {
        return Err(AmqpParseError::LengthMismatch);
    }
    Ok(value)
}

impl Decode for bool {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        read_u8(input).map(|o| o != 0)
    }
}

impl Decode for u8 {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        read_u8(input)
    }
}

impl Decode for i8 {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        read_i8(input)
    }
}

impl Decode for u16 {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        be_read!(input, read_u16, 2)
    }
}

impl Decode for i16 {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        be_read!(input, read_i16, 2)
    }
}

impl Decode for u32 {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        be_read!(input, read_u32, 4)
    }
}

impl Decode for i32 {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        be_read!(input, read_i32, 4)
    }
}

impl Decode for u64 {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        be_read!(input, read_u64, 8)
    }
}

impl Decode for i64 {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        be_read!(input, read_i64, 8)
    }
}

impl Decode for f32 {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        be_read!(input, read_f32, 4)
    }
}

impl Decode for f64 {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        be_read!(input, read_f64, 8)
    }
}

impl Decode for ShortStr {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        let bytes = read_bytes_u8(input)?;
        Ok(ShortStr::from(
            ByteString::try_from(bytes).map_err(|_| AmqpParseError::InvalidText)?,
        ))
    }
}

/// Long string.
impl Decode for ByteString {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        let bytes = read_bytes_u32(input)?;
        ByteString::try_from(bytes).map_err(|_| AmqpParseError::InvalidText)
    }
}

use ntex_bytes::{BufMut, ByteString, BytesMut};

use crate::codec::Encode;
use crate::error::AmqpEncodeError;
use crate::types::ShortStr;

macro_rules! fixed_encode {
    ($ty:ty, $size:expr, $fn:ident) => {
        impl Encode for $ty {
            #[inline]
            fn encoded_size(&self) -> usize {
                $size
            }

            #[inline]
            fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
                buf.$fn(*self);
                Ok(())
            }
        }
    };
}

fixed_encode!(u8, 1, put_u8);
fixed_encode!(i8, 1, put_i8);
fixed_encode!(u16, 2, put_u16);
fixed_encode!(i16, 2, put_i16);
fixed_encode!(u32, 4, put_u32);
fixed_encode!(i32, 4, put_i32);
fixed_encode!(u64, 8, put_u64);
fixed_encode!(i64, 8, put_i64);
fixed_encode!(f32, 4, put_f32);
fixed_encode!(f64, 8, put_f64);

impl Encode for bool {
    fn encoded_size(&self) -> usize {
        1
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        buf.put_u8(if *self { 1 } else { 0 });
        Ok(())
    }
}

impl Encode for ShortStr {
    fn encoded_size(&self) -> usize {
        1 + self.len()
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        let length = self.len();
        if length > u8::MAX as usize {
            return Err(AmqpEncodeError::LengthOverflow(length));
        }
        buf.put_u8(length as u8);
        buf.put_slice(self.as_bytes());
        Ok(())
    }
}

/// Long string.
impl Encode for ByteString {
    fn encoded_size(&self) -> usize {
        4 + self.len()
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        let length = self.len();
        let prefix = u32::try_from(length).map_err(|_| AmqpEncodeError::LengthOverflow(length))?;
        buf.put_u32(prefix);
        buf.put_slice(self.as_bytes());
        Ok(())
    }
}

use std::{fmt, str::FromStr};

use ntex_bytes::{Bytes, BytesMut};

use crate::codec::{Decode, Encode};
use crate::error::{AmqpEncodeError, AmqpParseError};

/// Decimal value in wire form, `value * 10^-scale`.
///
/// Wire representation is kept as is, so `1.5` and `1.50` built with
/// `Decimal::new` stay distinct. Use `from_parts` or `parse` to get the
/// normalized form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Decimal {
    scale: u8,
    value: i32,
}

impl Decimal {
    pub const fn new(scale: u8, value: i32) -> Decimal {
        Decimal { scale, value }
    }

    /// Builds the minimal representation of `mantissa * 10^exponent`.
    pub fn from_parts(mantissa: i128, exponent: i32) -> Result<Decimal, AmqpEncodeError> {
        if mantissa == 0 {
            return Ok(Decimal::default());
        }

        let (mut mantissa, mut exponent) = (mantissa, exponent);
        while mantissa % 10 == 0 {
            mantissa /= 10;
            exponent += 1;
        }

        if exponent < 0 {
            let scale =
                u8::try_from(exponent.unsigned_abs()).map_err(|_| AmqpEncodeError::Overflow)?;
            let value = i32::try_from(mantissa).map_err(|_| AmqpEncodeError::Overflow)?;
            Ok(Decimal { scale, value })
        } else {
            let value = u32::try_from(exponent)
                .ok()
                .and_then(|exp| 10_i128.checked_pow(exp))
                .and_then(|factor| mantissa.checked_mul(factor))
                .and_then(|v| i32::try_from(v).ok())
                .ok_or(AmqpEncodeError::Overflow)?;
            Ok(Decimal { scale: 0, value })
        }
    }

    /// Count of digits after the decimal point.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Unscaled integer value.
    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn to_f64(&self) -> f64 {
        f64::from(self.value) / 10_f64.powi(i32::from(self.scale))
    }
}

impl FromStr for Decimal {
    type Err = AmqpEncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmqpEncodeError::InvalidDecimal);
        }

        if !int_part.bytes().chain(frac_part.bytes()).all(|ch| ch.is_ascii_digit()) {
            return Err(AmqpEncodeError::InvalidDecimal);
        }

        // trailing zeros are dropped before accumulating digits
        let frac_part = frac_part.trim_end_matches('0');
        let (int_part, int_zeros) = if frac_part.is_empty() {
            let trimmed = int_part.trim_end_matches('0');
            (trimmed, int_part.len() - trimmed.len())
        } else {
            (int_part, 0)
        };

        let mut mantissa: i128 = 0;
        for ch in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(ch - b'0')))
                .ok_or(AmqpEncodeError::Overflow)?;
        }
        if negative {
            mantissa = -mantissa;
        }
        let int_zeros = i32::try_from(int_zeros).map_err(|_| AmqpEncodeError::Overflow)?;
        let frac_len = i32::try_from(frac_part.len()).map_err(|_| AmqpEncodeError::Overflow)?;
        Decimal::from_parts(mantissa, int_zeros - frac_len)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.value < 0 { "-" } else { "" };
        let digits = self.value.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            write!(f, "{sign}{digits}")
        } else if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{int_part}.{frac_part}")
        } else {
            write!(f, "{sign}0.{digits:0>scale$}")
        }
    }
}

impl Encode for Decimal {
    fn encoded_size(&self) -> usize {
        5
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), AmqpEncodeError> {
        self.scale.encode(buf)?;
        self.value.encode(buf)
    }
}

impl Decode for Decimal {
    fn decode(input: &mut Bytes) -> Result<Self, AmqpParseError> {
        let scale = u8::decode(input)?;
        let value = i32::decode(input)?;
        Ok(Decimal { scale, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn normalization() {
        assert_eq!(parse("1.5"), Decimal::new(1, 15));
        assert_eq!(parse("1.50"), Decimal::new(1, 15));
        assert_eq!(parse("0.001"), Decimal::new(3, 1));
        assert_eq!(parse("100"), Decimal::new(0, 100));
        assert_eq!(parse("100.000"), Decimal::new(0, 100));
        assert_eq!(parse("0"), Decimal::new(0, 0));
        assert_eq!(parse("-0.00"), Decimal::new(0, 0));
        assert_eq!(parse("-2.25"), Decimal::new(2, -225));
        assert_eq!(parse(".5"), Decimal::new(1, 5));
        assert_eq!(Decimal::from_parts(15, 2).unwrap(), Decimal::new(0, 1500));

        let long_tail = format!("1.{}", "0".repeat(40));
        assert_eq!(parse(&long_tail), Decimal::new(0, 1));
        let wide_int = format!("2{}", "0".repeat(5));
        assert_eq!(parse(&wide_int), Decimal::new(0, 200_000));
        let wide_frac = format!("0.{}5", "0".repeat(40));
        assert_eq!(parse(&wide_frac), Decimal::new(41, 5));
        assert_eq!(parse("-12.3400"), Decimal::new(2, -1234));
    }

    #[test]
    fn overflow() {
        assert_eq!(
            "2147483648".parse::<Decimal>(),
            Err(AmqpEncodeError::Overflow)
        );
        assert_eq!(
            "0.2147483648".parse::<Decimal>(),
            Err(AmqpEncodeError::Overflow)
        );
        assert_eq!(
            "-2147483648".parse::<Decimal>(),
            Ok(Decimal::new(0, i32::MIN))
        );
        assert_eq!(Decimal::from_parts(1, 10), Err(AmqpEncodeError::Overflow));
        assert_eq!(Decimal::from_parts(1, -256), Err(AmqpEncodeError::Overflow));
        assert_eq!(Decimal::from_parts(1, -255), Ok(Decimal::new(255, 1)));
        assert_eq!(
            format!("1{}", "0".repeat(40)).parse::<Decimal>(),
            Err(AmqpEncodeError::Overflow)
        );
    }

    #[test]
    fn invalid() {
        for s in ["", "-", ".", "1.2.3", "abc", "1e5"] {
            assert_eq!(s.parse::<Decimal>(), Err(AmqpEncodeError::InvalidDecimal));
        }
    }

    #[test]
    fn wire_layout() {
        let mut buf = BytesMut::new();
        parse("1.5").encode(&mut buf).unwrap();
        assert_eq!(&buf[..], b"\x01\x00\x00\x00\x0f");

        let decoded = Decimal::decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, Decimal::new(1, 15));
    }

    #[test]
    fn representative_recoding() {
        for s in ["1.5", "0.001", "100", "0"] {
            let value = parse(s);
            let mut buf = BytesMut::new();
            value.encode(&mut buf).unwrap();
            assert_eq!(buf.len(), value.encoded_size());
            assert_eq!(Decimal::decode(&mut buf.freeze()).unwrap(), value);
            assert_eq!(value.to_string(), s);
        }
    }

    #[test]
    fn decode_keeps_scale() {
        let mut input = Bytes::from_static(b"\x02\x00\x00\x00\x96");
        let value = Decimal::decode(&mut input).unwrap();
        assert_eq!((value.scale(), value.value()), (2, 150));
        assert_eq!(value.to_string(), "1.50");
        assert_eq!(value.to_f64(), 1.5);
    }

    #[test]
    fn display_small_and_negative() {
        assert_eq!(Decimal::new(3, -5).to_string(), "-0.005");
        assert_eq!(Decimal::new(1, -15).to_string(), "-1.5");
    }
}
